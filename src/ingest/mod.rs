mod collector;
mod error;
mod normalizer;
mod pipeline;
mod reader;
mod retry_policy;
mod stats;
mod writer;

pub use collector::{AttributionMode, ChunkBatch};
pub use error::{ImportError, MalformedRowError};
pub use normalizer::{normalize, parse_artists, parse_bool, parse_float, parse_int, TrackRecord};
pub use pipeline::ImportPipeline;
pub use reader::{RawRow, TrackCsvReader, REQUIRED_COLUMNS};
pub use retry_policy::RetryPolicy;
pub use stats::{FailedChunk, ImportSummary};
pub use writer::{BatchWriter, ChunkWriteReport, ChunkWriteResult};
