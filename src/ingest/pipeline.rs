//! Chunked import orchestration.
//!
//! Rows are read sequentially and grouped into fixed-size chunks. Each
//! chunk is normalised, collected and written with bounded retries before
//! the next chunk is read, so at most one chunk's working set is alive.

use super::collector::ChunkBatch;
use super::error::ImportError;
use super::normalizer::normalize;
use super::reader::{RawRow, TrackCsvReader};
use super::retry_policy::RetryPolicy;
use super::stats::{FailedChunk, ImportSummary};
use super::writer::{BatchWriter, ChunkWriteResult};
use crate::config::ImportSettings;
use crate::graph::GraphStore;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Whether the run should go on after a chunk.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Abort,
}

pub struct ImportPipeline {
    store: Arc<dyn GraphStore>,
    writer: BatchWriter,
    settings: ImportSettings,
    retry: RetryPolicy,
}

impl ImportPipeline {
    pub fn new(store: Arc<dyn GraphStore>, settings: ImportSettings) -> Self {
        Self {
            writer: BatchWriter::new(store.clone()),
            retry: RetryPolicy::new(&settings),
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Imports the CSV file at `path`.
    pub async fn run(&self, path: &Path) -> Result<ImportSummary, ImportError> {
        let reader = TrackCsvReader::open(path)?;
        info!("Importing {}", path.display());
        self.run_reader(reader).await
    }

    /// Imports from an already opened reader.
    ///
    /// Fails without writing anything when the graph service is unreachable.
    /// Chunks that keep failing are recorded and skipped; a connectivity
    /// failure that outlasts the retries stops the run.
    pub async fn run_reader<R: Read>(
        &self,
        mut reader: TrackCsvReader<R>,
    ) -> Result<ImportSummary, ImportError> {
        let started = Instant::now();

        self.store
            .verify_connectivity()
            .await
            .map_err(ImportError::Connectivity)?;

        let mut summary = ImportSummary {
            schema_failures: self
                .writer
                .setup_schema()
                .await
                .iter()
                .filter(|o| o.is_failure())
                .count(),
            ..Default::default()
        };

        info!(
            "Chunk size {}, up to {} attempt(s) per chunk, attribution {}",
            self.settings.chunk_size, self.retry.max_attempts, self.settings.attribution
        );

        let progress = self.progress_bar(reader.total_bytes());
        let mut chunk_index = 0;
        loop {
            let mut rows = Vec::with_capacity(self.settings.chunk_size.min(16_384));
            while rows.len() < self.settings.chunk_size {
                match reader.next_row()? {
                    Some(row) => rows.push(row),
                    None => break,
                }
            }
            if rows.is_empty() {
                break;
            }

            chunk_index += 1;
            let range = summary.rows_read..summary.rows_read + rows.len();
            summary.rows_read = range.end;
            progress.set_message(format!("chunk {}", chunk_index));

            let flow = self
                .process_chunk(chunk_index, range, rows, &mut summary)
                .await?;
            progress.set_position(reader.byte_position());
            if flow == Flow::Abort {
                break;
            }
        }
        progress.finish_and_clear();

        summary.elapsed = started.elapsed();
        summary.counts = match self.store.counts().await {
            Ok(counts) => Some(counts),
            Err(err) => {
                warn!("Could not read graph counts: {}", err);
                None
            }
        };
        Ok(summary)
    }

    async fn process_chunk(
        &self,
        index: usize,
        rows: Range<usize>,
        raw: Vec<RawRow>,
        summary: &mut ImportSummary,
    ) -> Result<Flow, ImportError> {
        let mut records = Vec::with_capacity(raw.len());
        for row in &raw {
            match normalize(row) {
                Ok(record) => records.push(record),
                Err(err) if self.settings.skip_malformed => {
                    warn!("Skipping malformed row: {}", err);
                    summary.rows_rejected += 1;
                }
                Err(err) => return Err(ImportError::Malformed(err)),
            }
        }
        drop(raw);
        if records.is_empty() {
            return Ok(Flow::Continue);
        }

        summary.chunks_total += 1;
        let batch = ChunkBatch::collect(&records, self.settings.attribution);
        debug!(
            "Chunk {}: {} tracks, {} artists, {} albums, {} genres, {} relationships",
            index,
            batch.tracks.len(),
            batch.artists.len(),
            batch.albums.len(),
            batch.genres.len(),
            batch.relationship_count()
        );

        let mut attempt = 1;
        loop {
            match self.writer.write_chunk(&batch).await {
                ChunkWriteResult::Committed(report) => {
                    summary.chunks_committed += 1;
                    summary.rows_imported += records.len();
                    summary.edges_skipped += report.skipped_edges();
                    if attempt > 1 {
                        summary.chunks_retried += 1;
                    }
                    debug!(
                        "Chunk {} (rows [{}, {})) committed on attempt {}",
                        index, rows.start, rows.end, attempt
                    );
                    return Ok(Flow::Continue);
                }
                ChunkWriteResult::Retryable(err) if self.retry.should_retry(&err, attempt) => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        "Chunk {} (rows [{}, {})) attempt {}/{} failed: {}; retrying in {:.1}s",
                        index,
                        rows.start,
                        rows.end,
                        attempt,
                        self.retry.max_attempts,
                        err,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                ChunkWriteResult::Retryable(err) | ChunkWriteResult::Fatal(err) => {
                    error!(
                        "Chunk {} (rows [{}, {})) failed on attempt {}: {}; skipping",
                        index, rows.start, rows.end, attempt, err
                    );
                    let abort = err.is_connectivity();
                    summary.failed_chunks.push(FailedChunk {
                        index,
                        rows: rows.clone(),
                        attempts: attempt,
                        error: err.to_string(),
                    });
                    if abort {
                        error!("Graph service unavailable, stopping the import");
                        summary.aborted = Some(err.to_string());
                        return Ok(Flow::Abort);
                    }
                    return Ok(Flow::Continue);
                }
            }
        }
    }

    fn progress_bar(&self, total_bytes: Option<u64>) -> ProgressBar {
        let Some(len) = total_bytes.filter(|_| self.settings.show_progress) else {
            return ProgressBar::hidden();
        };
        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg} (ETA: {eta})",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}
