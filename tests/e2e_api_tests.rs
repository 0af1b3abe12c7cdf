//! End-to-end tests for the HTTP API
//!
//! Every test spawns a real server over a seeded in-memory graph and talks
//! to it through [`TestClient`].

mod common;

use catalog_graph::graph::{AlbumKey, GraphStore};
use common::*;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn body(response: reqwest::Response) -> Value {
    response.json().await.expect("Response is not JSON")
}

fn names(tracks: &Value, field: &str) -> Vec<String> {
    tracks
        .as_array()
        .expect("Expected a JSON array")
        .iter()
        .map(|t| t[field].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Server
// =============================================================================

#[tokio::test]
async fn test_home_reports_uptime_and_version() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_home().await;
    assert_eq!(response.status(), StatusCode::OK);

    let stats = body(response).await;
    assert!(stats["uptime"].as_str().unwrap().starts_with("0d 00:00:"));
    assert_eq!(stats["version"], env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// Tracks
// =============================================================================

#[tokio::test]
async fn test_list_tracks_is_ordered_by_popularity() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let tracks = body(client.list_tracks(None, None).await).await;
    assert_eq!(
        names(&tracks, "track_id"),
        vec![TRACK_3_ID, TRACK_1_ID, TRACK_2_ID]
    );

    let page = body(client.list_tracks(Some(1), Some(1)).await).await;
    assert_eq!(names(&page, "track_id"), vec![TRACK_1_ID]);
}

#[tokio::test]
async fn test_get_track_returns_details() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_track(TRACK_1_ID).await;
    assert_eq!(response.status(), StatusCode::OK);

    let track = body(response).await;
    assert_eq!(track["track_id"], TRACK_1_ID);
    assert_eq!(track["name"], TRACK_1_TITLE);
    assert_eq!(track["popularity"], 80);
    assert_eq!(track["genre"], GENRE_POP);
    assert_eq!(track["genre_node"], GENRE_POP);
    assert_eq!(track["album"]["name"], ALBUM_1_NAME);
    assert_eq!(track["album"]["artist"], ARTIST_1_NAME);

    let artists = track["artists"].as_array().unwrap();
    assert_eq!(artists.len(), 2);
}

#[tokio::test]
async fn test_get_missing_track_is_not_found() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_track("no-such-track").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body(response).await["error"].as_str().is_some());
}

#[tokio::test]
async fn test_search_matches_name_artist_and_genre() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let by_name = body(client.search_tracks("smooth").await).await;
    assert_eq!(names(&by_name, "track_id"), vec![TRACK_3_ID]);

    let by_artist = body(client.search_tracks("test band").await).await;
    assert_eq!(names(&by_artist, "track_id"), vec![TRACK_1_ID, TRACK_2_ID]);

    let by_genre = body(client.search_tracks("ROCK").await).await;
    assert_eq!(names(&by_genre, "track_id"), vec![TRACK_2_ID]);

    let blank = body(client.search_tracks("   ").await).await;
    assert_eq!(blank, json!([]));
}

#[tokio::test]
async fn test_popular_tracks_respects_limit() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let tracks = body(client.popular_tracks(2).await).await;
    assert_eq!(names(&tracks, "track_id"), vec![TRACK_3_ID, TRACK_1_ID]);
}

#[tokio::test]
async fn test_create_track_builds_its_neighbourhood() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .create_track(json!({
            "track_id": "new-1",
            "name": "Fresh",
            "artists": "Newcomer;The Test Band",
            "album_name": "Debut",
            "genre": "Funk",
            "popularity": 42
        }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let track = body(response).await;
    assert_eq!(track["track_id"], "new-1");
    assert_eq!(track["album"]["artist"], "Newcomer");
    assert_eq!(track["genre_node"], "Funk");

    let album = server
        .store
        .get_album(&AlbumKey::new("Debut", "Newcomer"))
        .await
        .unwrap();
    assert!(album.is_some());

    let genres = body(client.list_genres().await).await;
    assert!(genres.as_array().unwrap().contains(&json!("Funk")));
}

#[tokio::test]
async fn test_create_track_without_id_gets_generated_id() {
    let server = TestServer::spawn_empty().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .create_track(json!({
            "name": "Anonymous",
            "artists": ["Someone"],
            "genre": "Ambient"
        }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let track = body(response).await;
    let id = track["track_id"].as_str().unwrap();
    assert!(!id.is_empty());
    assert_eq!(track["duration_ms"], 0);
    assert_eq!(client.get_track(id).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_track_with_taken_id_conflicts() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .create_track(json!({
            "track_id": TRACK_1_ID,
            "name": "Impostor",
            "artists": ["Someone Else"],
            "album_name": "Elsewhere",
            "genre": GENRE_JAZZ
        }))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let track = body(client.get_track(TRACK_1_ID).await).await;
    assert_eq!(track["name"], TRACK_1_TITLE);
    assert_eq!(track["genre"], GENRE_POP);
    assert_eq!(track["genre_node"], GENRE_POP);
    assert_eq!(track["album"]["name"], ALBUM_1_NAME);
    assert_eq!(server.store.edges().has_genre.len(), 3);
    assert!(!server.store.artist_names().contains(&"Someone Else".to_string()));
}

#[tokio::test]
async fn test_create_track_without_genre_is_rejected() {
    let server = TestServer::spawn_empty().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .create_track(json!({ "name": "No Genre", "artists": ["Someone"] }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_track_properties() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .update_track(TRACK_2_ID, json!({ "popularity": 99, "name": "Renamed" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = body(response).await;
    assert_eq!(updated["popularity"], 99);
    assert_eq!(updated["name"], "Renamed");

    let tracks = body(client.popular_tracks(1).await).await;
    assert_eq!(names(&tracks, "track_id"), vec![TRACK_2_ID]);
}

#[tokio::test]
async fn test_update_track_rejects_bad_input() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let empty = client.update_track(TRACK_1_ID, json!({})).await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let wrong_type = client
        .update_track(TRACK_1_ID, json!({ "popularity": "high" }))
        .await;
    assert_eq!(wrong_type.status(), StatusCode::BAD_REQUEST);

    let missing = client
        .update_track("no-such-track", json!({ "popularity": 1 }))
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_track() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.delete_track(TRACK_3_ID).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        client.get_track(TRACK_3_ID).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        client.delete_track(TRACK_3_ID).await.status(),
        StatusCode::NOT_FOUND
    );

    // Other nodes survive a track delete.
    let genres = body(client.list_genres().await).await;
    assert!(genres.as_array().unwrap().contains(&json!(GENRE_JAZZ)));
}

// =============================================================================
// Genres, Artists and Albums
// =============================================================================

#[tokio::test]
async fn test_list_genres_and_genre_tracks() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let genres = body(client.list_genres().await).await;
    assert_eq!(genres, json!([GENRE_JAZZ, GENRE_POP, GENRE_ROCK]));

    let pop = body(client.genre_tracks(GENRE_POP).await).await;
    assert_eq!(names(&pop, "track_id"), vec![TRACK_1_ID]);
}

#[tokio::test]
async fn test_list_artists_by_track_count() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let artists = body(client.list_artists().await).await;
    let list = artists.as_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0]["name"], ARTIST_1_NAME);
    assert_eq!(list[0]["track_count"], 2);
}

#[tokio::test]
async fn test_artist_tracks() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let tracks = body(client.artist_tracks(ARTIST_1_NAME).await).await;
    assert_eq!(names(&tracks, "track_id"), vec![TRACK_1_ID, TRACK_2_ID]);
}

#[tokio::test]
async fn test_create_and_update_artist() {
    let server = TestServer::spawn_empty().await;
    let client = TestClient::new(server.base_url.clone());

    let created = client.create_artist("Solo Act", Some(10)).await;
    assert_eq!(created.status(), StatusCode::CREATED);
    assert_eq!(body(created).await["followers"], 10);

    let updated = client.update_artist("Solo Act", 2500).await;
    assert_eq!(updated.status(), StatusCode::OK);
    assert_eq!(body(updated).await["followers"], 2500);

    let negative = client.update_artist("Solo Act", -1).await;
    assert_eq!(negative.status(), StatusCode::BAD_REQUEST);

    let missing = client.update_artist("Nobody", 1).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_artist_with_empty_name_is_rejected() {
    let server = TestServer::spawn_empty().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.create_artist("  ", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_artist_keeps_tracks() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.delete_artist(ARTIST_2_NAME).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let track = body(client.get_track(TRACK_1_ID).await).await;
    assert_eq!(track["artists"], json!([ARTIST_1_NAME]));

    assert_eq!(
        client.delete_artist(ARTIST_2_NAME).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_create_album() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .create_album(ALBUM_1_NAME, ARTIST_1_NAME, "2020-01-01")
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let album = body(response).await;
    assert_eq!(album["name"], ALBUM_1_NAME);
    assert_eq!(album["artist"], ARTIST_1_NAME);
    assert_eq!(album["release_date"], "2020-01-01");

    // Merged into the existing album, not duplicated.
    assert_eq!(
        server
            .store
            .album_keys()
            .iter()
            .filter(|k| k.name == ALBUM_1_NAME)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_delete_album() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let path = format!(
        "{}/v1/albums/{}/{}",
        server.base_url,
        ARTIST_3_NAME.replace(' ', "%20"),
        ALBUM_2_NAME.replace(' ', "%20")
    );
    let response = client.client.delete(&path).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let track = body(client.get_track(TRACK_3_ID).await).await;
    assert_eq!(track["album"], Value::Null);
}

// =============================================================================
// Statistics
// =============================================================================

#[tokio::test]
async fn test_quick_stats() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let stats = body(client.quick_stats().await).await;
    assert_eq!(
        stats,
        json!({ "total_tracks": 3, "total_genres": 3, "total_artists": 3 })
    );
}

#[tokio::test]
async fn test_genre_stats() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let stats = body(client.genre_stats().await).await;
    let list = stats.as_array().unwrap();
    assert_eq!(list.len(), 3);
    for entry in list {
        assert_eq!(entry["track_count"], 1);
    }
    let jazz = list.iter().find(|s| s["genre"] == GENRE_JAZZ).unwrap();
    assert_eq!(jazz["avg_popularity"], 90.0);
}

#[tokio::test]
async fn test_artist_stats_require_two_tracks() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let stats = body(client.artist_stats().await).await;
    assert_eq!(
        stats,
        json!([{ "artist": ARTIST_1_NAME, "track_count": 2, "avg_popularity": 70.0 }])
    );
}

#[tokio::test]
async fn test_collaborations() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let stats = body(client.collaborations().await).await;
    assert_eq!(
        stats,
        json!([{
            "artist1": ARTIST_2_NAME,
            "artist2": ARTIST_1_NAME,
            "collaborations": 1,
            "sample_tracks": [TRACK_1_TITLE]
        }])
    );
}

#[tokio::test]
async fn test_versatile_artists() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let stats = body(client.versatile_artists().await).await;
    let first = &stats.as_array().unwrap()[0];
    assert_eq!(first["artist"], ARTIST_1_NAME);
    assert_eq!(first["genre_count"], 2);
    assert_eq!(first["genres"], json!([GENRE_POP, GENRE_ROCK]));
}
