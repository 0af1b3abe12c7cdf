//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per API endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE request failed")
    }

    async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST request failed")
    }

    async fn patch_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .expect("PATCH request failed")
    }

    // ========================================================================
    // Server
    // ========================================================================

    pub async fn get_home(&self) -> Response {
        self.get("/").await
    }

    // ========================================================================
    // Tracks
    // ========================================================================

    pub async fn list_tracks(&self, limit: Option<usize>, offset: Option<usize>) -> Response {
        let mut path = "/v1/tracks?".to_string();
        if let Some(limit) = limit {
            path.push_str(&format!("limit={}&", limit));
        }
        if let Some(offset) = offset {
            path.push_str(&format!("offset={}", offset));
        }
        self.get(&path).await
    }

    pub async fn search_tracks(&self, term: &str) -> Response {
        self.client
            .get(self.url("/v1/tracks/search"))
            .query(&[("q", term)])
            .send()
            .await
            .expect("Search request failed")
    }

    pub async fn popular_tracks(&self, limit: usize) -> Response {
        self.get(&format!("/v1/tracks/popular?limit={}", limit)).await
    }

    pub async fn get_track(&self, id: &str) -> Response {
        self.get(&format!("/v1/tracks/{}", id)).await
    }

    pub async fn create_track(&self, body: Value) -> Response {
        self.post_json("/v1/tracks", &body).await
    }

    pub async fn update_track(&self, id: &str, body: Value) -> Response {
        self.patch_json(&format!("/v1/tracks/{}", id), &body).await
    }

    pub async fn delete_track(&self, id: &str) -> Response {
        self.delete(&format!("/v1/tracks/{}", id)).await
    }

    // ========================================================================
    // Genres, Artists and Albums
    // ========================================================================

    pub async fn list_genres(&self) -> Response {
        self.get("/v1/genres").await
    }

    pub async fn genre_tracks(&self, genre: &str) -> Response {
        self.get(&format!("/v1/genres/{}/tracks", genre)).await
    }

    pub async fn list_artists(&self) -> Response {
        self.get("/v1/artists").await
    }

    pub async fn artist_tracks(&self, name: &str) -> Response {
        self.client
            .get(self.url(&format!("/v1/artists/{}/tracks", encode(name))))
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn create_artist(&self, name: &str, followers: Option<i64>) -> Response {
        self.post_json("/v1/artists", &json!({ "name": name, "followers": followers }))
            .await
    }

    pub async fn update_artist(&self, name: &str, followers: i64) -> Response {
        self.patch_json(
            &format!("/v1/artists/{}", encode(name)),
            &json!({ "followers": followers }),
        )
        .await
    }

    pub async fn delete_artist(&self, name: &str) -> Response {
        self.delete(&format!("/v1/artists/{}", encode(name))).await
    }

    pub async fn create_album(&self, name: &str, artist: &str, release_date: &str) -> Response {
        self.post_json(
            "/v1/albums",
            &json!({ "name": name, "artist": artist, "release_date": release_date }),
        )
        .await
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    pub async fn genre_stats(&self) -> Response {
        self.get("/v1/stats/genres").await
    }

    pub async fn artist_stats(&self) -> Response {
        self.get("/v1/stats/artists").await
    }

    pub async fn quick_stats(&self) -> Response {
        self.get("/v1/stats/quick").await
    }

    pub async fn collaborations(&self) -> Response {
        self.get("/v1/stats/collaborations").await
    }

    pub async fn versatile_artists(&self) -> Response {
        self.get("/v1/stats/versatile-artists").await
    }
}

/// Percent-encodes spaces, the only reserved character in seeded names.
fn encode(segment: &str) -> String {
    segment.replace(' ', "%20")
}
