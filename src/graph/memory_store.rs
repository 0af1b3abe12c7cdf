//! In-process graph store.
//!
//! Mirrors the merge semantics of the Neo4j statements: nodes are unique by
//! natural key, relationship rows only apply when both endpoints exist, and
//! deletes detach every incident relationship. Used by `--dry-run` and tests.

use super::error::GraphError;
use super::models::{
    round2, Album, AlbumKey, Artist, ArtistStatistics, ArtistSummary, BelongsToEdge,
    Collaboration, CreatedEdge, DeleteTarget, GenreStatistics, GraphCounts, HasGenreEdge,
    PerformsEdge, PlaysGenreEdge, TrackDetails, TrackFilter, TrackNode, TrackQuery,
    TrackSummary, VersatileArtist,
};
use super::ops::{BatchReport, OpReport, WriteBatch, WriteOp};
use super::schema::{SchemaOutcome, SchemaStatement};
use super::trait_def::{GraphStore, COLLABORATION_SAMPLES, SUMMARY_ARTISTS};
use super::update::TrackUpdate;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct GraphState {
    tracks: BTreeMap<String, TrackNode>,
    artists: BTreeMap<String, Artist>,
    albums: BTreeMap<AlbumKey, Album>,
    genres: BTreeSet<String>,
    performs: BTreeSet<PerformsEdge>,
    belongs_to: BTreeSet<BelongsToEdge>,
    has_genre: BTreeSet<HasGenreEdge>,
    plays_genre: BTreeSet<PlaysGenreEdge>,
    created: BTreeSet<CreatedEdge>,
    schema: HashSet<&'static str>,
}

impl GraphState {
    /// Applies one statement and returns the number of rows that matched.
    fn apply(&mut self, op: &WriteOp) -> usize {
        match op {
            WriteOp::UpsertTracks(rows) => {
                for track in rows {
                    self.tracks.insert(track.track_id.clone(), track.clone());
                }
                rows.len()
            }
            WriteOp::MergeArtists(rows) => {
                for name in rows {
                    self.artists
                        .entry(name.clone())
                        .or_insert_with(|| Artist {
                            name: name.clone(),
                            followers: None,
                        });
                }
                rows.len()
            }
            WriteOp::MergeAlbums(rows) => {
                for key in rows {
                    self.albums.entry(key.clone()).or_insert_with(|| Album {
                        key: key.clone(),
                        release_date: None,
                    });
                }
                rows.len()
            }
            WriteOp::MergeGenres(rows) => {
                self.genres.extend(rows.iter().cloned());
                rows.len()
            }
            WriteOp::MergePerforms(rows) => {
                let mut applied = 0;
                for edge in rows {
                    if self.artists.contains_key(&edge.artist)
                        && self.tracks.contains_key(&edge.track_id)
                    {
                        self.performs.insert(edge.clone());
                        applied += 1;
                    }
                }
                applied
            }
            WriteOp::MergeBelongsTo(rows) => {
                let mut applied = 0;
                for edge in rows {
                    if self.tracks.contains_key(&edge.track_id)
                        && self.albums.contains_key(&edge.album)
                    {
                        self.belongs_to.insert(edge.clone());
                        applied += 1;
                    }
                }
                applied
            }
            WriteOp::MergeHasGenre(rows) => {
                let mut applied = 0;
                for edge in rows {
                    if self.tracks.contains_key(&edge.track_id) && self.genres.contains(&edge.genre)
                    {
                        self.has_genre.insert(edge.clone());
                        applied += 1;
                    }
                }
                applied
            }
            WriteOp::MergePlaysGenre(rows) => {
                let mut applied = 0;
                for edge in rows {
                    if self.artists.contains_key(&edge.artist) && self.genres.contains(&edge.genre)
                    {
                        self.plays_genre.insert(edge.clone());
                        applied += 1;
                    }
                }
                applied
            }
            WriteOp::MergeCreated(rows) => {
                let mut applied = 0;
                for edge in rows {
                    if self.artists.contains_key(&edge.artist)
                        && self.albums.contains_key(&edge.album)
                    {
                        self.created.insert(edge.clone());
                        applied += 1;
                    }
                }
                applied
            }
            WriteOp::UpsertArtist(artist) => {
                let stored = self
                    .artists
                    .entry(artist.name.clone())
                    .or_insert_with(|| Artist {
                        name: artist.name.clone(),
                        followers: None,
                    });
                if artist.followers.is_some() {
                    stored.followers = artist.followers;
                }
                1
            }
            WriteOp::UpsertAlbum(album) => {
                let stored = self.albums.entry(album.key.clone()).or_insert_with(|| Album {
                    key: album.key.clone(),
                    release_date: None,
                });
                if album.release_date.is_some() {
                    stored.release_date = album.release_date.clone();
                }
                1
            }
        }
    }

    fn performers(&self, track_id: &str) -> Vec<String> {
        self.performs
            .iter()
            .filter(|e| e.track_id == track_id)
            .map(|e| e.artist.clone())
            .collect()
    }

    fn genre_of(&self, track_id: &str) -> Option<String> {
        self.has_genre
            .iter()
            .find(|e| e.track_id == track_id)
            .map(|e| e.genre.clone())
    }

    fn summary(&self, track: &TrackNode) -> TrackSummary {
        let mut artists = self.performers(&track.track_id);
        artists.truncate(SUMMARY_ARTISTS);
        TrackSummary::from_node(track, artists, self.genre_of(&track.track_id))
    }

    fn matches(&self, track: &TrackNode, filter: &TrackFilter) -> bool {
        match filter {
            TrackFilter::All => true,
            TrackFilter::Search(term) => {
                let term = term.to_lowercase();
                track.name.to_lowercase().contains(&term)
                    || self
                        .performers(&track.track_id)
                        .iter()
                        .any(|a| a.to_lowercase().contains(&term))
                    || self
                        .genre_of(&track.track_id)
                        .is_some_and(|g| g.to_lowercase().contains(&term))
            }
            TrackFilter::Genre(genre) => self.has_genre.contains(&HasGenreEdge {
                track_id: track.track_id.clone(),
                genre: genre.clone(),
            }),
            TrackFilter::Artist(artist) => self.performs.contains(&PerformsEdge {
                artist: artist.clone(),
                track_id: track.track_id.clone(),
            }),
        }
    }

    fn track_count(&self, artist: &str) -> u64 {
        self.performs.iter().filter(|e| e.artist == artist).count() as u64
    }

    fn delete(&mut self, target: &DeleteTarget) -> u64 {
        match target {
            DeleteTarget::Track(id) => {
                if self.tracks.remove(id).is_none() {
                    return 0;
                }
                self.performs.retain(|e| &e.track_id != id);
                self.belongs_to.retain(|e| &e.track_id != id);
                self.has_genre.retain(|e| &e.track_id != id);
            }
            DeleteTarget::Artist(name) => {
                if self.artists.remove(name).is_none() {
                    return 0;
                }
                self.performs.retain(|e| &e.artist != name);
                self.plays_genre.retain(|e| &e.artist != name);
                self.created.retain(|e| &e.artist != name);
            }
            DeleteTarget::Album(key) => {
                if self.albums.remove(key).is_none() {
                    return 0;
                }
                self.belongs_to.retain(|e| &e.album != key);
                self.created.retain(|e| &e.album != key);
            }
        }
        1
    }
}

/// Snapshot of every relationship, for assertions in tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeSnapshot {
    pub performs: BTreeSet<PerformsEdge>,
    pub belongs_to: BTreeSet<BelongsToEdge>,
    pub has_genre: BTreeSet<HasGenreEdge>,
    pub plays_genre: BTreeSet<PlaysGenreEdge>,
    pub created: BTreeSet<CreatedEdge>,
}

/// Graph store backed by in-process maps.
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    state: Mutex<GraphState>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, GraphState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn edges(&self) -> EdgeSnapshot {
        let state = self.state();
        EdgeSnapshot {
            performs: state.performs.clone(),
            belongs_to: state.belongs_to.clone(),
            has_genre: state.has_genre.clone(),
            plays_genre: state.plays_genre.clone(),
            created: state.created.clone(),
        }
    }

    pub fn album_keys(&self) -> Vec<AlbumKey> {
        self.state().albums.keys().cloned().collect()
    }

    pub fn artist_names(&self) -> Vec<String> {
        self.state().artists.keys().cloned().collect()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn verify_connectivity(&self) -> Result<(), GraphError> {
        Ok(())
    }

    async fn apply_schema(&self, statements: &[SchemaStatement]) -> Vec<SchemaOutcome> {
        let mut state = self.state();
        statements
            .iter()
            .map(|statement| {
                if state.schema.insert(statement.name) {
                    SchemaOutcome::Created(statement.name)
                } else {
                    SchemaOutcome::AlreadyPresent(statement.name)
                }
            })
            .collect()
    }

    async fn execute(&self, batch: &WriteBatch) -> Result<BatchReport, GraphError> {
        // Ops are infallible; the lock keeps the batch atomic.
        let mut state = self.state();
        let report = BatchReport {
            ops: batch
                .ops()
                .iter()
                .map(|op| OpReport {
                    label: op.label(),
                    rows: op.len(),
                    applied: state.apply(op),
                })
                .collect(),
        };
        Ok(report)
    }

    async fn counts(&self) -> Result<GraphCounts, GraphError> {
        let state = self.state();
        Ok(GraphCounts {
            tracks: state.tracks.len() as u64,
            artists: state.artists.len() as u64,
            albums: state.albums.len() as u64,
            genres: state.genres.len() as u64,
            performs: state.performs.len() as u64,
            belongs_to: state.belongs_to.len() as u64,
            created: state.created.len() as u64,
            has_genre: state.has_genre.len() as u64,
            plays_genre: state.plays_genre.len() as u64,
        })
    }

    async fn get_track(&self, track_id: &str) -> Result<Option<TrackDetails>, GraphError> {
        let state = self.state();
        Ok(state.tracks.get(track_id).map(|track| TrackDetails {
            track: track.clone(),
            artists: state.performers(track_id),
            album: state
                .belongs_to
                .iter()
                .find(|e| e.track_id == track_id)
                .map(|e| e.album.clone()),
            genre_node: state.genre_of(track_id),
        }))
    }

    async fn find_tracks(&self, query: &TrackQuery) -> Result<Vec<TrackSummary>, GraphError> {
        let state = self.state();
        let mut matched: Vec<&TrackNode> = state
            .tracks
            .values()
            .filter(|t| state.matches(t, &query.filter))
            .collect();
        matched.sort_by(|a, b| {
            b.popularity
                .cmp(&a.popularity)
                .then_with(|| a.track_id.cmp(&b.track_id))
        });
        Ok(matched
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(|t| state.summary(t))
            .collect())
    }

    async fn get_artist(&self, name: &str) -> Result<Option<Artist>, GraphError> {
        Ok(self.state().artists.get(name).cloned())
    }

    async fn get_album(&self, key: &AlbumKey) -> Result<Option<Album>, GraphError> {
        Ok(self.state().albums.get(key).cloned())
    }

    async fn list_artists(&self, limit: usize) -> Result<Vec<ArtistSummary>, GraphError> {
        let state = self.state();
        let mut artists: Vec<ArtistSummary> = state
            .artists
            .values()
            .map(|a| ArtistSummary {
                name: a.name.clone(),
                followers: a.followers,
                track_count: state.track_count(&a.name),
            })
            .collect();
        artists.sort_by(|a, b| {
            b.track_count
                .cmp(&a.track_count)
                .then_with(|| a.name.cmp(&b.name))
        });
        artists.truncate(limit);
        Ok(artists)
    }

    async fn list_genres(&self) -> Result<Vec<String>, GraphError> {
        Ok(self.state().genres.iter().cloned().collect())
    }

    async fn genre_statistics(&self, limit: usize) -> Result<Vec<GenreStatistics>, GraphError> {
        let state = self.state();
        let mut by_genre: BTreeMap<&str, Vec<&TrackNode>> = BTreeMap::new();
        for edge in &state.has_genre {
            if let Some(track) = state.tracks.get(&edge.track_id) {
                by_genre.entry(edge.genre.as_str()).or_default().push(track);
            }
        }
        let mut stats: Vec<GenreStatistics> = by_genre
            .into_iter()
            .map(|(genre, tracks)| {
                let n = tracks.len() as f64;
                GenreStatistics {
                    genre: genre.to_string(),
                    track_count: tracks.len() as u64,
                    avg_popularity: round2(
                        tracks.iter().map(|t| t.popularity as f64).sum::<f64>() / n,
                    ),
                    avg_energy: round2(tracks.iter().map(|t| t.energy).sum::<f64>() / n),
                    avg_danceability: round2(
                        tracks.iter().map(|t| t.danceability).sum::<f64>() / n,
                    ),
                }
            })
            .collect();
        stats.sort_by(|a, b| {
            b.track_count
                .cmp(&a.track_count)
                .then_with(|| a.genre.cmp(&b.genre))
        });
        stats.truncate(limit);
        Ok(stats)
    }

    async fn artist_statistics(
        &self,
        min_tracks: u64,
        limit: usize,
    ) -> Result<Vec<ArtistStatistics>, GraphError> {
        let state = self.state();
        let mut by_artist: BTreeMap<&str, Vec<i64>> = BTreeMap::new();
        for edge in &state.performs {
            if let Some(track) = state.tracks.get(&edge.track_id) {
                by_artist
                    .entry(edge.artist.as_str())
                    .or_default()
                    .push(track.popularity);
            }
        }
        let mut stats: Vec<ArtistStatistics> = by_artist
            .into_iter()
            .filter(|(_, pops)| pops.len() as u64 >= min_tracks)
            .map(|(artist, pops)| ArtistStatistics {
                artist: artist.to_string(),
                track_count: pops.len() as u64,
                avg_popularity: round2(pops.iter().sum::<i64>() as f64 / pops.len() as f64),
            })
            .collect();
        stats.sort_by(|a, b| {
            b.track_count
                .cmp(&a.track_count)
                .then_with(|| a.artist.cmp(&b.artist))
        });
        stats.truncate(limit);
        Ok(stats)
    }

    async fn collaborations(&self, limit: usize) -> Result<Vec<Collaboration>, GraphError> {
        let state = self.state();
        let mut by_track: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for edge in &state.performs {
            by_track
                .entry(edge.track_id.as_str())
                .or_default()
                .push(edge.artist.as_str());
        }

        let mut pairs: BTreeMap<(&str, &str), Vec<&str>> = BTreeMap::new();
        for (track_id, artists) in &by_track {
            let Some(track) = state.tracks.get(*track_id) else {
                continue;
            };
            for (i, a1) in artists.iter().enumerate() {
                for a2 in &artists[i + 1..] {
                    let key = if a1 < a2 { (*a1, *a2) } else { (*a2, *a1) };
                    pairs.entry(key).or_default().push(track.name.as_str());
                }
            }
        }

        let mut collaborations: Vec<Collaboration> = pairs
            .into_iter()
            .map(|((artist1, artist2), tracks)| Collaboration {
                artist1: artist1.to_string(),
                artist2: artist2.to_string(),
                collaborations: tracks.len() as u64,
                sample_tracks: tracks
                    .iter()
                    .take(COLLABORATION_SAMPLES)
                    .map(|t| t.to_string())
                    .collect(),
            })
            .collect();
        collaborations.sort_by(|a, b| {
            b.collaborations
                .cmp(&a.collaborations)
                .then_with(|| (&a.artist1, &a.artist2).cmp(&(&b.artist1, &b.artist2)))
        });
        collaborations.truncate(limit);
        Ok(collaborations)
    }

    async fn versatile_artists(&self, limit: usize) -> Result<Vec<VersatileArtist>, GraphError> {
        let state = self.state();
        let mut by_artist: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for edge in &state.plays_genre {
            by_artist
                .entry(edge.artist.as_str())
                .or_default()
                .push(edge.genre.clone());
        }
        let mut artists: Vec<VersatileArtist> = by_artist
            .into_iter()
            .map(|(artist, genres)| VersatileArtist {
                artist: artist.to_string(),
                genre_count: genres.len() as u64,
                genres,
            })
            .collect();
        artists.sort_by(|a, b| {
            b.genre_count
                .cmp(&a.genre_count)
                .then_with(|| a.artist.cmp(&b.artist))
        });
        artists.truncate(limit);
        Ok(artists)
    }

    async fn update_track(
        &self,
        track_id: &str,
        update: &TrackUpdate,
    ) -> Result<Option<TrackNode>, GraphError> {
        if update.is_empty() {
            return Err(GraphError::InvalidUpdate("no fields to update".to_string()));
        }
        let mut state = self.state();
        Ok(state.tracks.get_mut(track_id).map(|track| {
            update.apply_to(track);
            track.clone()
        }))
    }

    async fn update_artist(
        &self,
        name: &str,
        followers: Option<i64>,
    ) -> Result<Option<Artist>, GraphError> {
        let mut state = self.state();
        Ok(state.artists.get_mut(name).map(|artist| {
            if followers.is_some() {
                artist.followers = followers;
            }
            artist.clone()
        }))
    }

    async fn delete(&self, target: &DeleteTarget) -> Result<u64, GraphError> {
        Ok(self.state().delete(target))
    }
}
