//! Graph entity, relationship and read-model types.
//!
//! Node identities follow the catalog's natural keys: tracks by external
//! track id, artists and genres by name, albums by (name, primary artist).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder primary artist for tracks whose artist field is empty.
///
/// Albums of such tracks are keyed with this name, but no Artist node is
/// ever created for it.
pub const UNKNOWN_ARTIST: &str = "Unknown";

// =============================================================================
// Property values
// =============================================================================

/// A scalar property value as stored on a graph node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "boolean",
            PropertyValue::Int(_) => "integer",
            PropertyValue::Float(_) => "float",
            PropertyValue::Text(_) => "string",
        }
    }
}

// =============================================================================
// Nodes
// =============================================================================

/// Properties of a Track node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackNode {
    pub track_id: String,
    pub name: String,
    pub popularity: i64,
    pub duration_ms: i64,
    pub explicit: bool,
    pub danceability: f64,
    pub energy: f64,
    pub key: i64,
    pub loudness: f64,
    pub mode: bool,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub time_signature: i64,
    /// Denormalized genre label, duplicated from the HAS_GENRE edge.
    pub genre: String,
}

impl TrackNode {
    /// All properties as (name, value) pairs, in a stable order.
    pub fn properties(&self) -> BTreeMap<&'static str, PropertyValue> {
        let mut props = BTreeMap::new();
        props.insert("track_id", PropertyValue::Text(self.track_id.clone()));
        props.insert("name", PropertyValue::Text(self.name.clone()));
        props.insert("popularity", PropertyValue::Int(self.popularity));
        props.insert("duration_ms", PropertyValue::Int(self.duration_ms));
        props.insert("explicit", PropertyValue::Bool(self.explicit));
        props.insert("danceability", PropertyValue::Float(self.danceability));
        props.insert("energy", PropertyValue::Float(self.energy));
        props.insert("key", PropertyValue::Int(self.key));
        props.insert("loudness", PropertyValue::Float(self.loudness));
        props.insert("mode", PropertyValue::Bool(self.mode));
        props.insert("speechiness", PropertyValue::Float(self.speechiness));
        props.insert("acousticness", PropertyValue::Float(self.acousticness));
        props.insert(
            "instrumentalness",
            PropertyValue::Float(self.instrumentalness),
        );
        props.insert("liveness", PropertyValue::Float(self.liveness));
        props.insert("valence", PropertyValue::Float(self.valence));
        props.insert("tempo", PropertyValue::Float(self.tempo));
        props.insert("time_signature", PropertyValue::Int(self.time_signature));
        props.insert("genre", PropertyValue::Text(self.genre.clone()));
        props
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    pub followers: Option<i64>,
}

/// Composite identity of an Album node.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AlbumKey {
    pub name: String,
    /// Name of the album's primary artist.
    pub artist: String,
}

impl AlbumKey {
    pub fn new(name: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artist: artist.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    #[serde(flatten)]
    pub key: AlbumKey,
    pub release_date: Option<String>,
}

// =============================================================================
// Relationships
// =============================================================================

/// (Artist)-[:PERFORMS]->(Track)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PerformsEdge {
    pub artist: String,
    pub track_id: String,
}

/// (Track)-[:BELONGS_TO]->(Album)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BelongsToEdge {
    pub track_id: String,
    pub album: AlbumKey,
}

/// (Track)-[:HAS_GENRE]->(Genre)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HasGenreEdge {
    pub track_id: String,
    pub genre: String,
}

/// (Artist)-[:PLAYS_GENRE]->(Genre)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlaysGenreEdge {
    pub artist: String,
    pub genre: String,
}

/// (Artist)-[:CREATED]->(Album)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CreatedEdge {
    pub artist: String,
    pub album: AlbumKey,
}

// =============================================================================
// Read models
// =============================================================================

/// Node and relationship totals, used for post-import verification.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphCounts {
    pub tracks: u64,
    pub artists: u64,
    pub albums: u64,
    pub genres: u64,
    pub performs: u64,
    pub belongs_to: u64,
    pub created: u64,
    pub has_genre: u64,
    pub plays_genre: u64,
}

impl GraphCounts {
    pub fn nodes(&self) -> u64 {
        self.tracks + self.artists + self.albums + self.genres
    }

    pub fn relationships(&self) -> u64 {
        self.performs + self.belongs_to + self.created + self.has_genre + self.plays_genre
    }

    /// Labelled rows in display order.
    pub fn rows(&self) -> [(&'static str, u64); 9] {
        [
            ("Tracks", self.tracks),
            ("Artists", self.artists),
            ("Albums", self.albums),
            ("Genres", self.genres),
            ("Relations PERFORMS", self.performs),
            ("Relations BELONGS_TO", self.belongs_to),
            ("Relations CREATED", self.created),
            ("Relations HAS_GENRE", self.has_genre),
            ("Relations PLAYS_GENRE", self.plays_genre),
        ]
    }
}

/// Compact track view used by listings and search results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub track_id: String,
    pub name: String,
    pub popularity: i64,
    pub energy: f64,
    pub danceability: f64,
    pub valence: f64,
    pub artists: Vec<String>,
    pub genre: Option<String>,
}

impl TrackSummary {
    pub fn from_node(track: &TrackNode, artists: Vec<String>, genre: Option<String>) -> Self {
        Self {
            track_id: track.track_id.clone(),
            name: track.name.clone(),
            popularity: track.popularity,
            energy: track.energy,
            danceability: track.danceability,
            valence: track.valence,
            artists,
            genre,
        }
    }
}

/// A track with every property and its resolved neighbours.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackDetails {
    #[serde(flatten)]
    pub track: TrackNode,
    pub artists: Vec<String>,
    pub album: Option<AlbumKey>,
    pub genre_node: Option<String>,
}

/// Which tracks a listing should return.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackFilter {
    All,
    /// Case-insensitive substring match on track name, artist name or genre.
    Search(String),
    Genre(String),
    Artist(String),
}

/// A paginated track listing, always ordered by popularity descending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackQuery {
    pub filter: TrackFilter,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistSummary {
    pub name: String,
    pub followers: Option<i64>,
    pub track_count: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenreStatistics {
    pub genre: String,
    pub track_count: u64,
    pub avg_popularity: f64,
    pub avg_energy: f64,
    pub avg_danceability: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtistStatistics {
    pub artist: String,
    pub track_count: u64,
    pub avg_popularity: f64,
}

/// Two artists performing on the same tracks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaboration {
    pub artist1: String,
    pub artist2: String,
    pub collaborations: u64,
    pub sample_tracks: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersatileArtist {
    pub artist: String,
    pub genres: Vec<String>,
    pub genre_count: u64,
}

/// Entity targeted by a detach-delete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteTarget {
    Track(String),
    Artist(String),
    Album(AlbumKey),
}

impl DeleteTarget {
    pub fn entity(&self) -> &'static str {
        match self {
            DeleteTarget::Track(_) => "Track",
            DeleteTarget::Artist(_) => "Artist",
            DeleteTarget::Album(_) => "Album",
        }
    }

    pub fn key(&self) -> String {
        match self {
            DeleteTarget::Track(id) => id.clone(),
            DeleteTarget::Artist(name) => name.clone(),
            DeleteTarget::Album(key) => format!("{} / {}", key.name, key.artist),
        }
    }
}

/// Rounds an average the way the analytics views present it.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
