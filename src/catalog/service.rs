//! Catalog facade: creation, lookups, analytics, updates and deletes over a
//! [`GraphStore`].

use super::new_track::NewTrack;
use crate::graph::{
    Album, AlbumKey, Artist, ArtistStatistics, ArtistSummary, Collaboration, DeleteTarget,
    GenreStatistics, GraphError, GraphStore, TrackDetails, TrackFilter, TrackNode, TrackQuery,
    TrackSummary, TrackUpdate, VersatileArtist, WriteBatch, WriteOp,
};
use crate::ingest::{AttributionMode, ChunkBatch};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

pub const SEARCH_LIMIT: usize = 25;
pub const LIST_LIMIT: usize = 20;
pub const GENRE_TRACKS_LIMIT: usize = 30;
pub const ARTIST_TRACKS_LIMIT: usize = 30;
pub const POPULAR_LIMIT: usize = 20;
pub const ARTISTS_LIMIT: usize = 100;
pub const GENRE_STATS_LIMIT: usize = 15;
pub const ARTIST_STATS_LIMIT: usize = 20;
pub const ARTIST_STATS_MIN_TRACKS: u64 = 2;
pub const COLLABORATIONS_LIMIT: usize = 20;
pub const VERSATILE_LIMIT: usize = 15;

/// Upper bound for any caller-provided limit.
const MAX_LIMIT: usize = 500;

fn clamp(limit: Option<usize>, default: usize) -> usize {
    limit.unwrap_or(default).clamp(1, MAX_LIMIT)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickStats {
    pub total_tracks: u64,
    pub total_genres: u64,
    pub total_artists: u64,
}

#[derive(Clone)]
pub struct CatalogGraph {
    store: Arc<dyn GraphStore>,
    attribution: AttributionMode,
}

impl CatalogGraph {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            attribution: AttributionMode::default(),
        }
    }

    /// Sets how created tracks attribute genre-play relationships.
    pub fn with_attribution(mut self, attribution: AttributionMode) -> Self {
        self.attribution = attribution;
        self
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates one track with its artists, album and genre.
    ///
    /// An id that is already taken is a conflict; edits go through
    /// [`CatalogGraph::update_track`]. Nodes are committed before the
    /// relationships, as in a bulk import.
    pub async fn create_track(&self, new_track: NewTrack) -> Result<TrackDetails, GraphError> {
        let record = new_track.into_record()?;
        let track_id = record.track.track_id.clone();
        if self.store.get_track(&track_id).await?.is_some() {
            return Err(GraphError::Conflict {
                entity: "Track",
                key: track_id,
            });
        }
        let batch = ChunkBatch::collect([&record], self.attribution);

        self.store.execute(&batch.node_batch()).await?;
        let edges = self.store.execute(&batch.edge_batch()).await?;
        if edges.skipped() > 0 {
            debug!(
                "{} relationship(s) of track {} not applied",
                edges.skipped(),
                track_id
            );
        }
        info!("Created track {}", track_id);

        let created = self.store.get_track(&track_id).await?;
        created.ok_or(GraphError::NotFound {
            entity: "Track",
            key: track_id,
        })
    }

    /// Merges an artist; a provided follower count replaces the stored one.
    pub async fn create_artist(
        &self,
        name: &str,
        followers: Option<i64>,
    ) -> Result<Artist, GraphError> {
        let name = required("name", name)?;
        let artist = Artist {
            name: name.clone(),
            followers,
        };
        self.write_one(WriteOp::UpsertArtist(artist)).await?;
        let merged = self.store.get_artist(&name).await?;
        merged.ok_or(GraphError::NotFound {
            entity: "Artist",
            key: name,
        })
    }

    /// Merges an album keyed by (name, primary artist).
    pub async fn create_album(
        &self,
        name: &str,
        artist: &str,
        release_date: Option<String>,
    ) -> Result<Album, GraphError> {
        let key = AlbumKey::new(required("name", name)?, required("artist", artist)?);
        let album = Album {
            key: key.clone(),
            release_date,
        };
        self.write_one(WriteOp::UpsertAlbum(album)).await?;
        self.store.get_album(&key).await?.ok_or_else(|| GraphError::NotFound {
            entity: "Album",
            key: format!("{} / {}", key.name, key.artist),
        })
    }

    async fn write_one(&self, op: WriteOp) -> Result<(), GraphError> {
        let mut batch = WriteBatch::new();
        batch.push(op);
        self.store.execute(&batch).await.map(|_| ())
    }

    // =========================================================================
    // Read
    // =========================================================================

    pub async fn get_track(&self, track_id: &str) -> Result<TrackDetails, GraphError> {
        self.store
            .get_track(track_id)
            .await?
            .ok_or_else(|| GraphError::NotFound {
                entity: "Track",
                key: track_id.to_string(),
            })
    }

    /// Case-insensitive substring search over track, artist and genre names.
    pub async fn search_tracks(
        &self,
        term: &str,
        limit: Option<usize>,
    ) -> Result<Vec<TrackSummary>, GraphError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        self.find(
            TrackFilter::Search(term.to_string()),
            clamp(limit, SEARCH_LIMIT).min(SEARCH_LIMIT),
            0,
        )
        .await
    }

    pub async fn list_tracks(
        &self,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<TrackSummary>, GraphError> {
        self.find(TrackFilter::All, clamp(limit, LIST_LIMIT), offset)
            .await
    }

    pub async fn tracks_by_genre(
        &self,
        genre: &str,
        limit: Option<usize>,
    ) -> Result<Vec<TrackSummary>, GraphError> {
        self.find(
            TrackFilter::Genre(genre.to_string()),
            clamp(limit, GENRE_TRACKS_LIMIT),
            0,
        )
        .await
    }

    pub async fn tracks_by_artist(
        &self,
        artist: &str,
        limit: Option<usize>,
    ) -> Result<Vec<TrackSummary>, GraphError> {
        self.find(
            TrackFilter::Artist(artist.to_string()),
            clamp(limit, ARTIST_TRACKS_LIMIT),
            0,
        )
        .await
    }

    pub async fn popular_tracks(&self, limit: Option<usize>) -> Result<Vec<TrackSummary>, GraphError> {
        self.find(TrackFilter::All, clamp(limit, POPULAR_LIMIT), 0).await
    }

    async fn find(
        &self,
        filter: TrackFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<TrackSummary>, GraphError> {
        self.store
            .find_tracks(&TrackQuery {
                filter,
                limit,
                offset,
            })
            .await
    }

    pub async fn list_artists(&self, limit: Option<usize>) -> Result<Vec<ArtistSummary>, GraphError> {
        self.store.list_artists(clamp(limit, ARTISTS_LIMIT)).await
    }

    pub async fn list_genres(&self) -> Result<Vec<String>, GraphError> {
        self.store.list_genres().await
    }

    // =========================================================================
    // Analytics
    // =========================================================================

    pub async fn genre_statistics(&self) -> Result<Vec<GenreStatistics>, GraphError> {
        self.store.genre_statistics(GENRE_STATS_LIMIT).await
    }

    pub async fn artist_statistics(&self) -> Result<Vec<ArtistStatistics>, GraphError> {
        self.store
            .artist_statistics(ARTIST_STATS_MIN_TRACKS, ARTIST_STATS_LIMIT)
            .await
    }

    pub async fn quick_stats(&self) -> Result<QuickStats, GraphError> {
        let counts = self.store.counts().await?;
        Ok(QuickStats {
            total_tracks: counts.tracks,
            total_genres: counts.genres,
            total_artists: counts.artists,
        })
    }

    pub async fn collaborations(&self, limit: Option<usize>) -> Result<Vec<Collaboration>, GraphError> {
        self.store
            .collaborations(clamp(limit, COLLABORATIONS_LIMIT))
            .await
    }

    pub async fn versatile_artists(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<VersatileArtist>, GraphError> {
        self.store
            .versatile_artists(clamp(limit, VERSATILE_LIMIT))
            .await
    }

    // =========================================================================
    // Update and Delete
    // =========================================================================

    pub async fn update_track(
        &self,
        track_id: &str,
        update: &TrackUpdate,
    ) -> Result<TrackNode, GraphError> {
        if update.is_empty() {
            return Err(GraphError::InvalidUpdate("no fields to update".to_string()));
        }
        let updated = self
            .store
            .update_track(track_id, update)
            .await?
            .ok_or_else(|| GraphError::NotFound {
                entity: "Track",
                key: track_id.to_string(),
            })?;
        info!("Updated {} field(s) of track {}", update.len(), track_id);
        Ok(updated)
    }

    pub async fn update_artist(
        &self,
        name: &str,
        followers: Option<i64>,
    ) -> Result<Artist, GraphError> {
        if matches!(followers, Some(f) if f < 0) {
            return Err(GraphError::InvalidUpdate(
                "followers: must not be negative".to_string(),
            ));
        }
        self.store
            .update_artist(name, followers)
            .await?
            .ok_or_else(|| GraphError::NotFound {
                entity: "Artist",
                key: name.to_string(),
            })
    }

    pub async fn delete_track(&self, track_id: &str) -> Result<(), GraphError> {
        self.delete(DeleteTarget::Track(track_id.to_string())).await
    }

    pub async fn delete_artist(&self, name: &str) -> Result<(), GraphError> {
        self.delete(DeleteTarget::Artist(name.to_string())).await
    }

    pub async fn delete_album(&self, key: AlbumKey) -> Result<(), GraphError> {
        self.delete(DeleteTarget::Album(key)).await
    }

    async fn delete(&self, target: DeleteTarget) -> Result<(), GraphError> {
        match self.store.delete(&target).await? {
            0 => Err(GraphError::NotFound {
                entity: target.entity(),
                key: target.key(),
            }),
            _ => {
                info!("Deleted {} {}", target.entity(), target.key());
                Ok(())
            }
        }
    }
}

fn required(field: &str, value: &str) -> Result<String, GraphError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(GraphError::InvalidUpdate(format!(
            "{}: must not be empty",
            field
        )));
    }
    Ok(value.to_string())
}
