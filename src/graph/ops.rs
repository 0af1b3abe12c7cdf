//! Typed write statements.
//!
//! A [`WriteBatch`] is an ordered list of set-based upserts that a store
//! submits as one transaction. Every operation has merge-by-key semantics,
//! so a batch can be re-applied without creating duplicates.

use super::models::{
    Album, Artist, AlbumKey, BelongsToEdge, CreatedEdge, HasGenreEdge, PerformsEdge,
    PlaysGenreEdge, TrackNode,
};

#[derive(Clone, Debug, PartialEq)]
pub enum WriteOp {
    /// Merge tracks by id and replace all of their properties.
    UpsertTracks(Vec<TrackNode>),
    /// Create artists that do not exist yet.
    MergeArtists(Vec<String>),
    /// Create albums that do not exist yet.
    MergeAlbums(Vec<AlbumKey>),
    /// Create genres that do not exist yet.
    MergeGenres(Vec<String>),
    MergePerforms(Vec<PerformsEdge>),
    MergeBelongsTo(Vec<BelongsToEdge>),
    MergeHasGenre(Vec<HasGenreEdge>),
    MergePlaysGenre(Vec<PlaysGenreEdge>),
    MergeCreated(Vec<CreatedEdge>),
    /// Merge one artist; a provided follower count replaces the stored one.
    UpsertArtist(Artist),
    /// Merge one album; a provided release date replaces the stored one.
    UpsertAlbum(Album),
}

impl WriteOp {
    pub fn label(&self) -> &'static str {
        match self {
            WriteOp::UpsertTracks(_) => "tracks",
            WriteOp::MergeArtists(_) => "artists",
            WriteOp::MergeAlbums(_) => "albums",
            WriteOp::MergeGenres(_) => "genres",
            WriteOp::MergePerforms(_) => "PERFORMS",
            WriteOp::MergeBelongsTo(_) => "BELONGS_TO",
            WriteOp::MergeHasGenre(_) => "HAS_GENRE",
            WriteOp::MergePlaysGenre(_) => "PLAYS_GENRE",
            WriteOp::MergeCreated(_) => "CREATED",
            WriteOp::UpsertArtist(_) => "artist",
            WriteOp::UpsertAlbum(_) => "album",
        }
    }

    /// Number of rows this statement unwinds.
    pub fn len(&self) -> usize {
        match self {
            WriteOp::UpsertTracks(rows) => rows.len(),
            WriteOp::MergeArtists(rows) => rows.len(),
            WriteOp::MergeAlbums(rows) => rows.len(),
            WriteOp::MergeGenres(rows) => rows.len(),
            WriteOp::MergePerforms(rows) => rows.len(),
            WriteOp::MergeBelongsTo(rows) => rows.len(),
            WriteOp::MergeHasGenre(rows) => rows.len(),
            WriteOp::MergePlaysGenre(rows) => rows.len(),
            WriteOp::MergeCreated(rows) => rows.len(),
            WriteOp::UpsertArtist(_) | WriteOp::UpsertAlbum(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Edge statements match existing endpoints and never create nodes.
    pub fn is_relationship(&self) -> bool {
        matches!(
            self,
            WriteOp::MergePerforms(_)
                | WriteOp::MergeBelongsTo(_)
                | WriteOp::MergeHasGenre(_)
                | WriteOp::MergePlaysGenre(_)
                | WriteOp::MergeCreated(_)
        )
    }
}

/// An ordered statement list submitted as one unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a statement. Statements without rows are dropped.
    pub fn push(&mut self, op: WriteOp) {
        if !op.is_empty() {
            self.ops.push(op);
        }
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.ops.iter().map(WriteOp::len).sum()
    }
}

/// Outcome of one statement in a committed batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpReport {
    pub label: &'static str,
    pub rows: usize,
    /// Rows that matched and were merged. For relationship statements this is
    /// lower than `rows` when an endpoint did not exist.
    pub applied: usize,
}

impl OpReport {
    pub fn skipped(&self) -> usize {
        self.rows.saturating_sub(self.applied)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub ops: Vec<OpReport>,
}

impl BatchReport {
    pub fn applied(&self) -> usize {
        self.ops.iter().map(|op| op.applied).sum()
    }

    pub fn skipped(&self) -> usize {
        self.ops.iter().map(OpReport::skipped).sum()
    }

    pub fn merge(&mut self, other: BatchReport) {
        self.ops.extend(other.ops);
    }
}
