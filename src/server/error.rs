//! Maps graph errors to HTTP responses.

use crate::graph::GraphError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub struct ApiError(pub GraphError);

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            GraphError::NotFound { .. } => StatusCode::NOT_FOUND,
            GraphError::InvalidUpdate(_) => StatusCode::BAD_REQUEST,
            GraphError::Conflict { .. } => StatusCode::CONFLICT,
            GraphError::Connectivity(_) | GraphError::Authentication(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GraphError::Transient(_) | GraphError::Constraint(_) | GraphError::Query(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
