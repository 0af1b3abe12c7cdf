//! CSV input reader.

use super::error::ImportError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Columns every input file must provide, matched by exact name.
pub const REQUIRED_COLUMNS: [&str; 20] = [
    "track_id",
    "artists",
    "album_name",
    "track_name",
    "popularity",
    "duration_ms",
    "explicit",
    "danceability",
    "energy",
    "key",
    "loudness",
    "mode",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
    "time_signature",
    "track_genre",
];

/// One data row, with values for every required column.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRow {
    /// 1-based line in the input file.
    pub line: u64,
    values: Vec<String>,
}

impl RawRow {
    /// Builds a row from (column, value) pairs. Missing columns read as empty.
    pub fn from_pairs<'a>(line: u64, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut values = vec![String::new(); REQUIRED_COLUMNS.len()];
        for (column, value) in pairs {
            if let Some(idx) = REQUIRED_COLUMNS.iter().position(|c| *c == column) {
                values[idx] = value.to_string();
            }
        }
        Self { line, values }
    }

    /// Raw value of a required column, or "" for unknown columns.
    pub fn get(&self, column: &str) -> &str {
        REQUIRED_COLUMNS
            .iter()
            .position(|c| *c == column)
            .and_then(|idx| self.values.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Streams [`RawRow`]s out of a CSV source after validating its header.
pub struct TrackCsvReader<R: Read> {
    reader: csv::Reader<R>,
    positions: Vec<usize>,
    total_bytes: Option<u64>,
}

impl TrackCsvReader<File> {
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        let file = File::open(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let total_bytes = file.metadata().ok().map(|m| m.len());
        let mut reader = Self::from_reader(file)?;
        reader.total_bytes = total_bytes;
        Ok(reader)
    }
}

impl<R: Read> TrackCsvReader<R> {
    pub fn from_reader(source: R) -> Result<Self, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(source);
        let headers = reader.headers()?.clone();

        let mut positions = Vec::with_capacity(REQUIRED_COLUMNS.len());
        let mut missing = Vec::new();
        for column in REQUIRED_COLUMNS {
            match headers.iter().position(|h| h == column) {
                Some(idx) => positions.push(idx),
                None => missing.push(column.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        Ok(Self {
            reader,
            positions,
            total_bytes: None,
        })
    }

    /// Size of the underlying file, when known.
    pub fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    /// Bytes consumed so far.
    pub fn byte_position(&self) -> u64 {
        self.reader.position().byte()
    }

    /// Reads the next data row, or None at end of input.
    pub fn next_row(&mut self) -> Result<Option<RawRow>, ImportError> {
        let mut record = csv::StringRecord::new();
        if !self.reader.read_record(&mut record)? {
            return Ok(None);
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let values = self
            .positions
            .iter()
            .map(|&idx| record.get(idx).unwrap_or("").to_string())
            .collect();
        Ok(Some(RawRow { line, values }))
    }
}
