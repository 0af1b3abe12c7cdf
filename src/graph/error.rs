//! Errors reported by graph store backends.

use thiserror::Error;

/// Error returned by any [`GraphStore`](super::GraphStore) operation.
///
/// The variants encode how the ingestion pipeline should react: see
/// [`GraphError::is_retryable`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    /// The backing service could not be reached or dropped the connection.
    #[error("Graph service unreachable: {0}")]
    Connectivity(String),

    #[error("Graph service rejected credentials: {0}")]
    Authentication(String),

    /// Timeouts, deadlocks, resource exhaustion and other conditions that
    /// may succeed on a later attempt.
    #[error("Transient graph error: {0}")]
    Transient(String),

    /// A uniqueness constraint rejected a write.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// The statement itself was rejected (syntax, type or schema error).
    #[error("Query rejected: {0}")]
    Query(String),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    /// A create named a key that is already taken.
    #[error("{entity} already exists: {key}")]
    Conflict { entity: &'static str, key: String },
}

impl GraphError {
    /// Returns true if repeating the same idempotent write may succeed.
    ///
    /// Constraint violations count as retryable: two writers merging the same
    /// key converge once one of them has committed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GraphError::Connectivity(_) | GraphError::Transient(_) | GraphError::Constraint(_)
        )
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            GraphError::Connectivity(_) | GraphError::Authentication(_)
        )
    }

    /// Returns true if a schema statement failed only because the rule exists.
    pub fn is_already_exists(&self) -> bool {
        let message = match self {
            GraphError::Query(m) | GraphError::Constraint(m) => m,
            _ => return false,
        };
        let lower = message.to_lowercase();
        lower.contains("already exists") || lower.contains("equivalentschemarulealreadyexists")
    }

    /// Classifies a server-side error message by its Neo4j status code.
    pub fn from_status_message(message: String) -> Self {
        if message.contains("Neo.TransientError") {
            GraphError::Transient(message)
        } else if message.contains("Neo.ClientError.Security") {
            GraphError::Authentication(message)
        } else if message.contains("ConstraintValidationFailed") {
            GraphError::Constraint(message)
        } else if message.contains("Neo.DatabaseError")
            || message.to_lowercase().contains("timed out")
        {
            GraphError::Transient(message)
        } else {
            GraphError::Query(message)
        }
    }
}
