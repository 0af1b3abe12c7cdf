//! Chunk writer: schema setup plus the two-phase write of one chunk.

use super::collector::ChunkBatch;
use crate::graph::{BatchReport, GraphError, GraphStore, SchemaOutcome, GRAPH_SCHEMA};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a committed chunk wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkWriteReport {
    pub nodes: BatchReport,
    pub edges: BatchReport,
}

impl ChunkWriteReport {
    /// Relationship rows whose endpoints did not exist.
    pub fn skipped_edges(&self) -> usize {
        self.edges.skipped()
    }
}

/// Outcome of one write attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum ChunkWriteResult {
    Committed(ChunkWriteReport),
    /// The attempt failed but repeating it may succeed.
    Retryable(GraphError),
    /// Repeating the attempt would fail the same way.
    Fatal(GraphError),
}

impl ChunkWriteResult {
    fn failed(error: GraphError) -> Self {
        if error.is_retryable() {
            ChunkWriteResult::Retryable(error)
        } else {
            ChunkWriteResult::Fatal(error)
        }
    }
}

pub struct BatchWriter {
    store: Arc<dyn GraphStore>,
}

impl BatchWriter {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Ensures constraints and indexes exist. Failures are logged and
    /// returned, never raised.
    pub async fn setup_schema(&self) -> Vec<SchemaOutcome> {
        let outcomes = self.store.apply_schema(GRAPH_SCHEMA).await;
        for outcome in &outcomes {
            match outcome {
                SchemaOutcome::Created(name) => info!("Schema rule ready: {}", name),
                SchemaOutcome::AlreadyPresent(name) => {
                    debug!("Schema rule already present: {}", name)
                }
                SchemaOutcome::Failed { name, error } => {
                    warn!("Failed to apply schema rule {}: {}", name, error)
                }
            }
        }
        outcomes
    }

    /// Writes nodes, then edges, each phase in its own transaction.
    ///
    /// The edge phase is only issued after the node phase committed. A retry
    /// re-applies both phases; every statement is an idempotent merge.
    pub async fn write_chunk(&self, batch: &ChunkBatch) -> ChunkWriteResult {
        let nodes = match self.store.execute(&batch.node_batch()).await {
            Ok(report) => report,
            Err(err) => return ChunkWriteResult::failed(err),
        };
        let edges = match self.store.execute(&batch.edge_batch()).await {
            Ok(report) => report,
            Err(err) => return ChunkWriteResult::failed(err),
        };
        ChunkWriteResult::Committed(ChunkWriteReport { nodes, edges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MemoryGraphStore;
    use crate::ingest::collector::AttributionMode;
    use crate::ingest::normalizer::normalize;
    use crate::ingest::reader::RawRow;

    fn scenario_batch() -> ChunkBatch {
        let row = RawRow::from_pairs(
            2,
            [
                ("track_id", "t1"),
                ("artists", "X;Y"),
                ("album_name", "Alb"),
                ("track_name", "Song"),
                ("popularity", "80"),
                ("duration_ms", "200000"),
                ("explicit", "false"),
                ("danceability", "0.5"),
                ("energy", "0.5"),
                ("key", "0"),
                ("loudness", "-4.0"),
                ("mode", "1"),
                ("speechiness", "0.1"),
                ("acousticness", "0.1"),
                ("instrumentalness", "0.0"),
                ("liveness", "0.1"),
                ("valence", "0.5"),
                ("tempo", "100"),
                ("time_signature", "4"),
                ("track_genre", "Pop"),
            ],
        );
        let record = normalize(&row).unwrap();
        ChunkBatch::collect([&record], AttributionMode::AllListed)
    }

    #[tokio::test]
    async fn test_write_chunk_commits_nodes_and_edges() {
        let store = Arc::new(MemoryGraphStore::new());
        let writer = BatchWriter::new(store.clone());

        match writer.write_chunk(&scenario_batch()).await {
            ChunkWriteResult::Committed(report) => {
                assert_eq!(report.skipped_edges(), 0);
                assert_eq!(report.edges.applied(), 7);
            }
            other => panic!("expected commit, got {:?}", other),
        }
        let counts = store.counts().await.unwrap();
        assert_eq!(counts.nodes(), 5);
        assert_eq!(counts.relationships(), 7);
    }

    #[tokio::test]
    async fn test_setup_schema_is_repeatable() {
        let store = Arc::new(MemoryGraphStore::new());
        let writer = BatchWriter::new(store);

        let first = writer.setup_schema().await;
        assert!(first
            .iter()
            .all(|o| matches!(o, SchemaOutcome::Created(_))));
        let second = writer.setup_schema().await;
        assert!(second
            .iter()
            .all(|o| matches!(o, SchemaOutcome::AlreadyPresent(_))));
    }

    #[test]
    fn test_failed_classification() {
        assert!(matches!(
            ChunkWriteResult::failed(GraphError::Transient("timeout".into())),
            ChunkWriteResult::Retryable(_)
        ));
        assert!(matches!(
            ChunkWriteResult::failed(GraphError::Query("bad".into())),
            ChunkWriteResult::Fatal(_)
        ));
    }
}
