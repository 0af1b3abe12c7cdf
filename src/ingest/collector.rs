//! Per-chunk entity and relationship collection.
//!
//! A [`ChunkBatch`] holds the distinct nodes and edges implied by one chunk
//! of records. Nothing is carried across chunks: repeated keys in later
//! chunks are resolved by the store's merge semantics.

use super::normalizer::TrackRecord;
use crate::graph::{
    AlbumKey, BelongsToEdge, CreatedEdge, HasGenreEdge, PerformsEdge, PlaysGenreEdge, TrackNode,
    WriteBatch, WriteOp,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which artists of a track receive derived PLAYS_GENRE edges.
///
/// PERFORMS always covers every listed artist, and albums always belong to
/// the primary artist.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum AttributionMode {
    /// Only the first listed artist.
    PrimaryOnly,
    /// Every listed artist.
    #[default]
    AllListed,
}

impl AttributionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributionMode::PrimaryOnly => "primary-only",
            AttributionMode::AllListed => "all-listed",
        }
    }
}

impl std::fmt::Display for AttributionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkBatch {
    pub tracks: BTreeMap<String, TrackNode>,
    pub artists: BTreeSet<String>,
    pub albums: BTreeSet<AlbumKey>,
    pub genres: BTreeSet<String>,
    pub performs: BTreeSet<PerformsEdge>,
    pub belongs_to: BTreeSet<BelongsToEdge>,
    pub has_genre: BTreeSet<HasGenreEdge>,
    pub plays_genre: BTreeSet<PlaysGenreEdge>,
    pub created: BTreeSet<CreatedEdge>,
}

impl ChunkBatch {
    pub fn collect<'a>(
        records: impl IntoIterator<Item = &'a TrackRecord>,
        mode: AttributionMode,
    ) -> Self {
        let mut batch = ChunkBatch::default();
        for record in records {
            batch.add(record, mode);
        }
        batch
    }

    /// Adds the nodes and edges implied by one record.
    pub fn add(&mut self, record: &TrackRecord, mode: AttributionMode) {
        let track_id = &record.track.track_id;
        let genre = record.genre();

        // Later rows with the same id replace earlier properties.
        self.tracks.insert(track_id.clone(), record.track.clone());

        self.genres.insert(genre.to_string());
        self.has_genre.insert(HasGenreEdge {
            track_id: track_id.clone(),
            genre: genre.to_string(),
        });

        for artist in &record.artists {
            self.artists.insert(artist.clone());
            self.performs.insert(PerformsEdge {
                artist: artist.clone(),
                track_id: track_id.clone(),
            });
        }

        let genre_artists: &[String] = match mode {
            AttributionMode::AllListed => &record.artists,
            AttributionMode::PrimaryOnly => &record.artists[..record.artists.len().min(1)],
        };
        for artist in genre_artists {
            self.plays_genre.insert(PlaysGenreEdge {
                artist: artist.clone(),
                genre: genre.to_string(),
            });
        }

        if let Some(album) = record.album_key() {
            self.albums.insert(album.clone());
            self.belongs_to.insert(BelongsToEdge {
                track_id: track_id.clone(),
                album: album.clone(),
            });
            // The placeholder artist has no node, hence no CREATED edge.
            if record.has_artists() {
                self.created.insert(CreatedEdge {
                    artist: record.primary_artist().to_string(),
                    album,
                });
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn relationship_count(&self) -> usize {
        self.performs.len()
            + self.belongs_to.len()
            + self.has_genre.len()
            + self.plays_genre.len()
            + self.created.len()
    }

    /// Node upserts: tracks, artists, albums, genres.
    pub fn node_batch(&self) -> WriteBatch {
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::UpsertTracks(self.tracks.values().cloned().collect()));
        batch.push(WriteOp::MergeArtists(self.artists.iter().cloned().collect()));
        batch.push(WriteOp::MergeAlbums(self.albums.iter().cloned().collect()));
        batch.push(WriteOp::MergeGenres(self.genres.iter().cloned().collect()));
        batch
    }

    /// Edge upserts, issued once the node batch has committed.
    pub fn edge_batch(&self) -> WriteBatch {
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::MergePerforms(self.performs.iter().cloned().collect()));
        batch.push(WriteOp::MergeBelongsTo(
            self.belongs_to.iter().cloned().collect(),
        ));
        batch.push(WriteOp::MergeHasGenre(self.has_genre.iter().cloned().collect()));
        batch.push(WriteOp::MergePlaysGenre(
            self.plays_genre.iter().cloned().collect(),
        ));
        batch.push(WriteOp::MergeCreated(self.created.iter().cloned().collect()));
        batch
    }
}
