//! Input model for single-track creation.

use crate::graph::{GraphError, TrackNode, TrackUpdate};
use crate::ingest::{parse_artists, TrackRecord};
use serde::{Deserialize, Serialize};

/// Artists given either as a list or as one delimited string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtistsField {
    List(Vec<String>),
    Joined(String),
}

impl Default for ArtistsField {
    fn default() -> Self {
        ArtistsField::List(Vec::new())
    }
}

impl ArtistsField {
    /// Names with the same splitting and trimming rules as the CSV import.
    pub fn names(&self) -> Vec<String> {
        match self {
            ArtistsField::Joined(raw) => parse_artists(raw),
            ArtistsField::List(names) => {
                let mut out: Vec<String> = Vec::with_capacity(names.len());
                for name in names.iter().flat_map(|n| parse_artists(n)) {
                    if !out.contains(&name) {
                        out.push(name);
                    }
                }
                out
            }
        }
    }
}

/// A track to create, as submitted by API clients.
///
/// Omitted numeric fields default to zero, except `time_signature` (4).
/// `duration_ms` is only range-checked when the client provides it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewTrack {
    /// Generated when absent.
    pub track_id: Option<String>,
    #[serde(alias = "track_name")]
    pub name: String,
    pub album_name: Option<String>,
    pub artists: ArtistsField,
    #[serde(alias = "track_genre")]
    pub genre: String,
    pub popularity: i64,
    pub duration_ms: Option<i64>,
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
}

impl Default for NewTrack {
    fn default() -> Self {
        Self {
            track_id: None,
            name: String::new(),
            album_name: None,
            artists: ArtistsField::default(),
            genre: String::new(),
            popularity: 0,
            duration_ms: None,
            explicit: false,
            danceability: 0.0,
            energy: 0.0,
            key: 0,
            loudness: 0.0,
            mode: false,
            speechiness: 0.0,
            acousticness: 0.0,
            instrumentalness: 0.0,
            liveness: 0.0,
            valence: 0.0,
            tempo: 0.0,
            time_signature: 4,
        }
    }
}

impl NewTrack {
    /// Validates the input and turns it into an import record.
    ///
    /// Property values go through the same checks as partial updates.
    pub fn into_record(self) -> Result<TrackRecord, GraphError> {
        let track_id = match self.track_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };
        let genre = self.genre.trim().to_string();
        if genre.is_empty() {
            return Err(GraphError::InvalidUpdate("genre: must not be empty".to_string()));
        }

        let duration_given = self.duration_ms.is_some();
        let track = TrackNode {
            track_id,
            name: self.name.trim().to_string(),
            popularity: self.popularity,
            duration_ms: self.duration_ms.unwrap_or(0),
            explicit: self.explicit,
            danceability: self.danceability,
            energy: self.energy,
            key: self.key,
            loudness: self.loudness,
            mode: self.mode,
            speechiness: self.speechiness,
            acousticness: self.acousticness,
            instrumentalness: self.instrumentalness,
            liveness: self.liveness,
            valence: self.valence,
            tempo: self.tempo,
            time_signature: self.time_signature,
            genre,
        };

        let mut check = TrackUpdate::new();
        for (field, value) in track.properties() {
            if field == "track_id" || (field == "duration_ms" && !duration_given) {
                continue;
            }
            check.set(field, value)?;
        }

        let album_name = self
            .album_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(TrackRecord {
            artists: self.artists.names(),
            album_name,
            track,
        })
    }
}
