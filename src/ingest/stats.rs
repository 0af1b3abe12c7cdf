//! Run statistics and the operator-facing summary.

use crate::graph::GraphCounts;
use std::ops::Range;
use std::time::Duration;
use tracing::{info, warn};

/// A chunk that was given up on.
#[derive(Clone, Debug, PartialEq)]
pub struct FailedChunk {
    /// 1-based chunk index.
    pub index: usize,
    /// Half-open range of 0-based data row indices.
    pub rows: Range<usize>,
    pub attempts: u32,
    pub error: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportSummary {
    pub rows_read: usize,
    pub rows_imported: usize,
    pub rows_rejected: usize,
    pub chunks_total: usize,
    pub chunks_committed: usize,
    pub chunks_retried: usize,
    pub failed_chunks: Vec<FailedChunk>,
    /// Relationship rows that did not apply because an endpoint was missing.
    pub edges_skipped: usize,
    pub schema_failures: usize,
    /// Set when the run stopped before reaching the end of the input.
    pub aborted: Option<String>,
    pub elapsed: Duration,
    /// Graph totals after the run, when they could be read.
    pub counts: Option<GraphCounts>,
}

impl ImportSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed_chunks.is_empty() || self.aborted.is_some()
    }

    pub fn rows_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.rows_imported as f64 / secs
        } else {
            0.0
        }
    }

    pub fn log(&self) {
        info!("");
        info!("Import Summary");
        info!("==============");
        info!("Rows read: {}", self.rows_read);
        info!("Rows imported: {}", self.rows_imported);
        if self.rows_rejected > 0 {
            warn!("Rows rejected (malformed): {}", self.rows_rejected);
        }
        info!(
            "Chunks committed: {}/{}",
            self.chunks_committed, self.chunks_total
        );
        if self.chunks_retried > 0 {
            info!("Chunks needing retries: {}", self.chunks_retried);
        }
        if self.edges_skipped > 0 {
            warn!(
                "Relationships skipped (missing endpoint): {}",
                self.edges_skipped
            );
        }
        if self.schema_failures > 0 {
            warn!("Schema statements failed: {}", self.schema_failures);
        }
        for failed in &self.failed_chunks {
            warn!(
                "Failed chunk {} (rows [{}, {})) after {} attempt(s): {}",
                failed.index, failed.rows.start, failed.rows.end, failed.attempts, failed.error
            );
        }
        if let Some(reason) = &self.aborted {
            warn!("Run aborted: {}", reason);
        }
        info!(
            "Elapsed: {:.1}s ({:.0} rows/s)",
            self.elapsed.as_secs_f64(),
            self.rows_per_sec()
        );

        if let Some(counts) = &self.counts {
            info!("");
            info!("Graph contains:");
            for (label, count) in counts.rows() {
                info!("  {}: {}", label, count);
            }
            info!("  Total nodes: {}", counts.nodes());
            info!("  Total relationships: {}", counts.relationships());
        }
    }
}
