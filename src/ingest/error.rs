use crate::graph::GraphError;
use std::path::PathBuf;
use thiserror::Error;

/// A single input row whose field could not be coerced to its type.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("line {line}: invalid {field} {value:?}: {reason}")]
pub struct MalformedRowError {
    /// 1-based line in the input file.
    pub line: u64,
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

impl MalformedRowError {
    pub fn new(line: u64, field: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self {
            line,
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors that stop an import run.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Input is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Failed to read CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to open {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Graph service unavailable: {0}")]
    Connectivity(GraphError),

    /// Raised instead of skipping when malformed rows are not tolerated.
    #[error("Malformed row: {0}")]
    Malformed(MalformedRowError),
}
