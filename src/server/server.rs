use anyhow::{Context, Result};
use std::time::Duration;

use tracing::info;

use crate::catalog::{CatalogGraph, NewTrack};
use crate::graph::{AlbumKey, TrackUpdate};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{log_requests, state::*, ApiError, RequestsLoggingLevel, ServerConfig};

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug, Default)]
struct PageParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Deserialize, Debug)]
struct SearchParams {
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Deserialize, Debug)]
struct CreateArtistBody {
    pub name: String,
    pub followers: Option<i64>,
}

#[derive(Deserialize, Debug)]
struct UpdateArtistBody {
    pub followers: Option<i64>,
}

#[derive(Deserialize, Debug)]
struct CreateAlbumBody {
    pub name: String,
    pub artist: String,
    pub release_date: Option<String>,
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    };
    Json(stats)
}

// =============================================================================
// Tracks
// =============================================================================

async fn list_tracks(
    State(catalog): State<GuardedCatalog>,
    Query(params): Query<PageParams>,
) -> ApiResult<Response> {
    let tracks = catalog
        .list_tracks(params.limit, params.offset.unwrap_or(0))
        .await?;
    Ok(Json(tracks).into_response())
}

async fn search_tracks(
    State(catalog): State<GuardedCatalog>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Response> {
    let tracks = catalog.search_tracks(&params.q, params.limit).await?;
    Ok(Json(tracks).into_response())
}

async fn popular_tracks(
    State(catalog): State<GuardedCatalog>,
    Query(params): Query<PageParams>,
) -> ApiResult<Response> {
    Ok(Json(catalog.popular_tracks(params.limit).await?).into_response())
}

async fn get_track(
    State(catalog): State<GuardedCatalog>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    Ok(Json(catalog.get_track(&id).await?).into_response())
}

async fn post_track(
    State(catalog): State<GuardedCatalog>,
    Json(body): Json<NewTrack>,
) -> ApiResult<Response> {
    let track = catalog.create_track(body).await?;
    Ok((StatusCode::CREATED, Json(track)).into_response())
}

async fn patch_track(
    State(catalog): State<GuardedCatalog>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<Response> {
    let update = TrackUpdate::from_json(&body)?;
    Ok(Json(catalog.update_track(&id, &update).await?).into_response())
}

async fn delete_track(
    State(catalog): State<GuardedCatalog>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    catalog.delete_track(&id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

// =============================================================================
// Genres, Artists and Albums
// =============================================================================

async fn list_genres(State(catalog): State<GuardedCatalog>) -> ApiResult<Response> {
    Ok(Json(catalog.list_genres().await?).into_response())
}

async fn genre_tracks(
    State(catalog): State<GuardedCatalog>,
    Path(name): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<Response> {
    Ok(Json(catalog.tracks_by_genre(&name, params.limit).await?).into_response())
}

async fn list_artists(
    State(catalog): State<GuardedCatalog>,
    Query(params): Query<PageParams>,
) -> ApiResult<Response> {
    Ok(Json(catalog.list_artists(params.limit).await?).into_response())
}

async fn post_artist(
    State(catalog): State<GuardedCatalog>,
    Json(body): Json<CreateArtistBody>,
) -> ApiResult<Response> {
    let artist = catalog.create_artist(&body.name, body.followers).await?;
    Ok((StatusCode::CREATED, Json(artist)).into_response())
}

async fn patch_artist(
    State(catalog): State<GuardedCatalog>,
    Path(name): Path<String>,
    Json(body): Json<UpdateArtistBody>,
) -> ApiResult<Response> {
    Ok(Json(catalog.update_artist(&name, body.followers).await?).into_response())
}

async fn delete_artist(
    State(catalog): State<GuardedCatalog>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    catalog.delete_artist(&name).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn artist_tracks(
    State(catalog): State<GuardedCatalog>,
    Path(name): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<Response> {
    Ok(Json(catalog.tracks_by_artist(&name, params.limit).await?).into_response())
}

async fn post_album(
    State(catalog): State<GuardedCatalog>,
    Json(body): Json<CreateAlbumBody>,
) -> ApiResult<Response> {
    let album = catalog
        .create_album(&body.name, &body.artist, body.release_date)
        .await?;
    Ok((StatusCode::CREATED, Json(album)).into_response())
}

async fn delete_album(
    State(catalog): State<GuardedCatalog>,
    Path((artist, name)): Path<(String, String)>,
) -> ApiResult<Response> {
    catalog.delete_album(AlbumKey::new(name, artist)).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

// =============================================================================
// Statistics
// =============================================================================

async fn genre_stats(State(catalog): State<GuardedCatalog>) -> ApiResult<Response> {
    Ok(Json(catalog.genre_statistics().await?).into_response())
}

async fn artist_stats(State(catalog): State<GuardedCatalog>) -> ApiResult<Response> {
    Ok(Json(catalog.artist_statistics().await?).into_response())
}

async fn quick_stats(State(catalog): State<GuardedCatalog>) -> ApiResult<Response> {
    Ok(Json(catalog.quick_stats().await?).into_response())
}

async fn collaborations(
    State(catalog): State<GuardedCatalog>,
    Query(params): Query<PageParams>,
) -> ApiResult<Response> {
    Ok(Json(catalog.collaborations(params.limit).await?).into_response())
}

async fn versatile_artists(
    State(catalog): State<GuardedCatalog>,
    Query(params): Query<PageParams>,
) -> ApiResult<Response> {
    Ok(Json(catalog.versatile_artists(params.limit).await?).into_response())
}

pub fn make_app(config: ServerConfig, catalog: CatalogGraph) -> Router {
    let state = ServerState::new(config, catalog);

    let track_routes: Router = Router::new()
        .route("/", get(list_tracks).post(post_track))
        .route("/search", get(search_tracks))
        .route("/popular", get(popular_tracks))
        .route(
            "/{id}",
            get(get_track).patch(patch_track).delete(delete_track),
        )
        .with_state(state.clone());

    let catalog_routes: Router = Router::new()
        .route("/v1/genres", get(list_genres))
        .route("/v1/genres/{name}/tracks", get(genre_tracks))
        .route("/v1/artists", get(list_artists).post(post_artist))
        .route(
            "/v1/artists/{name}",
            patch(patch_artist).delete(delete_artist),
        )
        .route("/v1/artists/{name}/tracks", get(artist_tracks))
        .route("/v1/albums", post(post_album))
        .route("/v1/albums/{artist}/{name}", delete(delete_album))
        .with_state(state.clone());

    let stats_routes: Router = Router::new()
        .route("/genres", get(genre_stats))
        .route("/artists", get(artist_stats))
        .route("/quick", get(quick_stats))
        .route("/collaborations", get(collaborations))
        .route("/versatile-artists", get(versatile_artists))
        .with_state(state.clone());

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    home_router
        .nest("/v1/tracks", track_routes)
        .nest("/v1/stats", stats_routes)
        .merge(catalog_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(
    catalog: CatalogGraph,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
    };
    let app = make_app(config, catalog);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutting down");
            }
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MemoryGraphStore;
    use axum::{body::Body, http::Request};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            ..Default::default()
        };
        make_app(config, CatalogGraph::new(Arc::new(MemoryGraphStore::new())))
    }

    #[test]
    fn uptime_format() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(
            format_uptime(Duration::from_secs(86_400 + 3600 + 61)),
            "1d 01:01:01"
        );
    }

    #[tokio::test]
    async fn responds_not_found_on_missing_entities() {
        let missing_routes = vec!["/v1/tracks/nope"];
        for route in missing_routes {
            let request = Request::builder().uri(route).body(Body::empty()).unwrap();
            let response = app().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }

        let request = Request::builder()
            .method("DELETE")
            .uri("/v1/artists/nobody")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn static_routes_win_over_track_id() {
        for route in ["/v1/tracks/popular", "/v1/tracks/search?q=x", "/v1/stats/quick", "/"] {
            let request = Request::builder().uri(route).body(Body::empty()).unwrap();
            let response = app().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "route {}", route);
        }
    }

    #[tokio::test]
    async fn rejects_protected_field_update() {
        let request = Request::builder()
            .method("PATCH")
            .uri("/v1/tracks/t1")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"track_id":"other"}"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
