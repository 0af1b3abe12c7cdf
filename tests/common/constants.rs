//! Shared constants for end-to-end tests
//!
//! When the seeded catalog changes, update only this file and
//! `fixtures::seed_catalog`.

// ============================================================================
// Seeded Catalog
// ============================================================================

/// "Opening" by The Test Band featuring Guest Singer, Pop, popularity 80
pub const TRACK_1_ID: &str = "track-1";

/// "Second" by The Test Band, Rock, popularity 60
pub const TRACK_2_ID: &str = "track-2";

/// "Smooth" by Jazz Ensemble, Jazz, popularity 90
pub const TRACK_3_ID: &str = "track-3";

pub const TRACK_1_TITLE: &str = "Opening";

pub const ARTIST_1_NAME: &str = "The Test Band";
pub const ARTIST_2_NAME: &str = "Guest Singer";
pub const ARTIST_3_NAME: &str = "Jazz Ensemble";

pub const ALBUM_1_NAME: &str = "First Album";
pub const ALBUM_2_NAME: &str = "Jazz Collection";

pub const GENRE_POP: &str = "Pop";
pub const GENRE_ROCK: &str = "Rock";
pub const GENRE_JAZZ: &str = "Jazz";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the test server to answer
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Per-request timeout
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
