//! GraphStore trait definition.
//!
//! This trait abstracts the graph service so the ingestion pipeline and the
//! catalog facade run against Neo4j in production and against an in-process
//! store in tests and dry runs.

use super::error::GraphError;
use super::models::{
    Album, AlbumKey, Artist, ArtistStatistics, ArtistSummary, Collaboration, DeleteTarget,
    GenreStatistics, GraphCounts, TrackDetails, TrackNode, TrackQuery, TrackSummary,
    VersatileArtist,
};
use super::ops::{BatchReport, WriteBatch};
use super::schema::{SchemaOutcome, SchemaStatement};
use super::update::TrackUpdate;
use async_trait::async_trait;

/// Number of artist names kept on a track summary.
pub const SUMMARY_ARTISTS: usize = 2;

/// Number of track names kept on a collaboration sample.
pub const COLLABORATION_SAMPLES: usize = 5;

/// Trait for graph storage backends.
///
/// Implementations own their connection resources and are shared as
/// `Arc<dyn GraphStore>`.
#[async_trait]
pub trait GraphStore: Send + Sync {
    // =========================================================================
    // Connection and Schema
    // =========================================================================

    /// Round-trips a trivial statement.
    async fn verify_connectivity(&self) -> Result<(), GraphError>;

    /// Applies each statement independently and reports one outcome each.
    async fn apply_schema(&self, statements: &[SchemaStatement]) -> Vec<SchemaOutcome>;

    // =========================================================================
    // Batched Writes
    // =========================================================================

    /// Executes all statements of `batch` in one transaction.
    ///
    /// Either every statement commits or none does.
    async fn execute(&self, batch: &WriteBatch) -> Result<BatchReport, GraphError>;

    // =========================================================================
    // Counts
    // =========================================================================

    async fn counts(&self) -> Result<GraphCounts, GraphError>;

    // =========================================================================
    // Entity Retrieval
    // =========================================================================

    async fn get_track(&self, track_id: &str) -> Result<Option<TrackDetails>, GraphError>;

    /// Tracks matching `query`, by popularity descending.
    async fn find_tracks(&self, query: &TrackQuery) -> Result<Vec<TrackSummary>, GraphError>;

    async fn get_artist(&self, name: &str) -> Result<Option<Artist>, GraphError>;

    async fn get_album(&self, key: &AlbumKey) -> Result<Option<Album>, GraphError>;

    /// Artists by performed track count descending, then name.
    async fn list_artists(&self, limit: usize) -> Result<Vec<ArtistSummary>, GraphError>;

    /// Genre names in alphabetical order.
    async fn list_genres(&self) -> Result<Vec<String>, GraphError>;

    // =========================================================================
    // Analytics
    // =========================================================================

    async fn genre_statistics(&self, limit: usize) -> Result<Vec<GenreStatistics>, GraphError>;

    /// Artists performing at least `min_tracks` tracks.
    async fn artist_statistics(
        &self,
        min_tracks: u64,
        limit: usize,
    ) -> Result<Vec<ArtistStatistics>, GraphError>;

    /// Pairs of artists performing on the same tracks.
    async fn collaborations(&self, limit: usize) -> Result<Vec<Collaboration>, GraphError>;

    /// Artists by number of distinct genres played.
    async fn versatile_artists(&self, limit: usize) -> Result<Vec<VersatileArtist>, GraphError>;

    // =========================================================================
    // Updates and Deletes
    // =========================================================================

    /// Returns the updated track, or None if no track has this id.
    async fn update_track(
        &self,
        track_id: &str,
        update: &TrackUpdate,
    ) -> Result<Option<TrackNode>, GraphError>;

    /// Replaces the follower count when one is given.
    async fn update_artist(
        &self,
        name: &str,
        followers: Option<i64>,
    ) -> Result<Option<Artist>, GraphError>;

    /// Removes the node and all incident relationships. Returns the number
    /// of deleted nodes.
    async fn delete(&self, target: &DeleteTarget) -> Result<u64, GraphError>;
}
