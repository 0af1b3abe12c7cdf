//! Graph store wrapper that injects write failures.

use async_trait::async_trait;
use catalog_graph::graph::{
    Album, AlbumKey, Artist, ArtistStatistics, ArtistSummary, BatchReport, Collaboration,
    DeleteTarget, GenreStatistics, GraphCounts, GraphError, GraphStore, MemoryGraphStore,
    SchemaOutcome, SchemaStatement, TrackDetails, TrackNode, TrackQuery, TrackSummary,
    TrackUpdate, VersatileArtist, WriteBatch, WriteOp,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Fails batches that upsert a given track.
#[derive(Clone, Debug)]
pub struct FailureRule {
    pub track_id: String,
    pub error: GraphError,
    /// How many matching batches fail before they start succeeding;
    /// None fails forever.
    pub times: Option<usize>,
}

impl FailureRule {
    pub fn always(track_id: &str, error: GraphError) -> Self {
        Self {
            track_id: track_id.to_string(),
            error,
            times: None,
        }
    }

    pub fn times(track_id: &str, error: GraphError, times: usize) -> Self {
        Self {
            track_id: track_id.to_string(),
            error,
            times: Some(times),
        }
    }
}

/// Delegates to a [`MemoryGraphStore`] unless a rule matches.
#[derive(Default)]
pub struct FlakyGraphStore {
    pub inner: MemoryGraphStore,
    rules: Mutex<Vec<FailureRule>>,
    unreachable: bool,
    attempts: AtomicUsize,
    failures: AtomicUsize,
}

impl FlakyGraphStore {
    pub fn new(rules: Vec<FailureRule>) -> Self {
        Self {
            rules: Mutex::new(rules),
            ..Default::default()
        }
    }

    /// A store whose connectivity check always fails.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    /// Number of `execute` calls so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Number of `execute` calls that were failed on purpose.
    pub fn injected_failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    fn injected_error(&self, batch: &WriteBatch) -> Option<GraphError> {
        let upserted: Vec<&str> = batch
            .ops()
            .iter()
            .filter_map(|op| match op {
                WriteOp::UpsertTracks(tracks) => Some(tracks),
                _ => None,
            })
            .flatten()
            .map(|t| t.track_id.as_str())
            .collect();

        let mut rules = self.rules.lock().unwrap();
        for rule in rules.iter_mut() {
            if !upserted.contains(&rule.track_id.as_str()) {
                continue;
            }
            match rule.times {
                Some(0) => continue,
                Some(ref mut remaining) => *remaining -= 1,
                None => {}
            }
            return Some(rule.error.clone());
        }
        None
    }
}

#[async_trait]
impl GraphStore for FlakyGraphStore {
    async fn verify_connectivity(&self) -> Result<(), GraphError> {
        if self.unreachable {
            return Err(GraphError::Connectivity("connection refused".to_string()));
        }
        self.inner.verify_connectivity().await
    }

    async fn apply_schema(&self, statements: &[SchemaStatement]) -> Vec<SchemaOutcome> {
        self.inner.apply_schema(statements).await
    }

    async fn execute(&self, batch: &WriteBatch) -> Result<BatchReport, GraphError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.injected_error(batch) {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(err);
        }
        self.inner.execute(batch).await
    }

    async fn counts(&self) -> Result<GraphCounts, GraphError> {
        self.inner.counts().await
    }

    async fn get_track(&self, track_id: &str) -> Result<Option<TrackDetails>, GraphError> {
        self.inner.get_track(track_id).await
    }

    async fn find_tracks(&self, query: &TrackQuery) -> Result<Vec<TrackSummary>, GraphError> {
        self.inner.find_tracks(query).await
    }

    async fn get_artist(&self, name: &str) -> Result<Option<Artist>, GraphError> {
        self.inner.get_artist(name).await
    }

    async fn get_album(&self, key: &AlbumKey) -> Result<Option<Album>, GraphError> {
        self.inner.get_album(key).await
    }

    async fn list_artists(&self, limit: usize) -> Result<Vec<ArtistSummary>, GraphError> {
        self.inner.list_artists(limit).await
    }

    async fn list_genres(&self) -> Result<Vec<String>, GraphError> {
        self.inner.list_genres().await
    }

    async fn genre_statistics(&self, limit: usize) -> Result<Vec<GenreStatistics>, GraphError> {
        self.inner.genre_statistics(limit).await
    }

    async fn artist_statistics(
        &self,
        min_tracks: u64,
        limit: usize,
    ) -> Result<Vec<ArtistStatistics>, GraphError> {
        self.inner.artist_statistics(min_tracks, limit).await
    }

    async fn collaborations(&self, limit: usize) -> Result<Vec<Collaboration>, GraphError> {
        self.inner.collaborations(limit).await
    }

    async fn versatile_artists(&self, limit: usize) -> Result<Vec<VersatileArtist>, GraphError> {
        self.inner.versatile_artists(limit).await
    }

    async fn update_track(
        &self,
        track_id: &str,
        update: &TrackUpdate,
    ) -> Result<Option<TrackNode>, GraphError> {
        self.inner.update_track(track_id, update).await
    }

    async fn update_artist(
        &self,
        name: &str,
        followers: Option<i64>,
    ) -> Result<Option<Artist>, GraphError> {
        self.inner.update_artist(name, followers).await
    }

    async fn delete(&self, target: &DeleteTarget) -> Result<u64, GraphError> {
        self.inner.delete(target).await
    }
}
