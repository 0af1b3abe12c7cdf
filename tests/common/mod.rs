//! Common test infrastructure
//!
//! This module provides the infrastructure shared by the end-to-end tests:
//! CSV fixtures, a failure-injecting graph store and a real HTTP server.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_quick_stats() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.quick_stats().await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

#![allow(unused)]

mod client;
mod constants;
mod fixtures;
mod flaky_store;
mod server;

// Public API - this is what tests import
pub use client::TestClient;
pub use constants::*;
pub use fixtures::{import_settings, seed_catalog, write_csv, write_csv_with_columns, TrackRow};
pub use flaky_store::{FailureRule, FlakyGraphStore};
pub use server::TestServer;
