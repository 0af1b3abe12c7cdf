//! Row normalization: raw CSV text to typed track records.

use super::error::MalformedRowError;
use super::reader::RawRow;
use crate::graph::{AlbumKey, TrackNode, UNKNOWN_ARTIST};

/// Artist list separators, in order of precedence.
const ARTIST_SEPARATORS: [char; 3] = [';', ',', '|'];

/// Characters trimmed around each artist name.
const ARTIST_TRIM: [char; 3] = ['"', '\'', '`'];

/// A typed, validated input row.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackRecord {
    pub track: TrackNode,
    /// Performing artists, primary first.
    pub artists: Vec<String>,
    pub album_name: Option<String>,
}

impl TrackRecord {
    /// First listed artist, or the placeholder when the list is empty.
    pub fn primary_artist(&self) -> &str {
        self.artists
            .first()
            .map(String::as_str)
            .unwrap_or(UNKNOWN_ARTIST)
    }

    pub fn has_artists(&self) -> bool {
        !self.artists.is_empty()
    }

    pub fn album_key(&self) -> Option<AlbumKey> {
        self.album_name
            .as_ref()
            .map(|name| AlbumKey::new(name.clone(), self.primary_artist()))
    }

    pub fn genre(&self) -> &str {
        &self.track.genre
    }
}

/// Splits a multi-valued artist field.
///
/// Only the first separator present in the field is used: `;`, then `,`,
/// then `|`. Blank entries are dropped.
pub fn parse_artists(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let separator = ARTIST_SEPARATORS.iter().find(|s| raw.contains(**s));
    let parts: Vec<&str> = match separator {
        Some(sep) => raw.split(*sep).collect(),
        None => vec![raw],
    };
    let mut artists: Vec<String> = Vec::with_capacity(parts.len());
    for part in parts {
        let name = part.trim().trim_matches(&ARTIST_TRIM[..]).trim();
        if !name.is_empty() && !artists.iter().any(|a| a == name) {
            artists.push(name.to_string());
        }
    }
    artists
}

/// Accepts true/false, t/f, yes/no, y/n and 1/0 (also "1.0"/"0.0").
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" | "1.0" => Some(true),
        "false" | "f" | "no" | "n" | "0" | "0.0" => Some(false),
        _ => None,
    }
}

/// Parses an integer, truncating finite decimal input such as "80.0".
pub fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() < i64::MAX as f64 => {
            Some(value.trunc() as i64)
        }
        _ => None,
    }
}

pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

struct Fields<'a> {
    row: &'a RawRow,
}

impl<'a> Fields<'a> {
    fn raw(&self, field: &'static str) -> &'a str {
        self.row.get(field)
    }

    fn malformed(&self, field: &'static str, reason: &str) -> MalformedRowError {
        MalformedRowError::new(self.row.line, field, self.raw(field), reason)
    }

    fn text(&self, field: &'static str) -> Result<String, MalformedRowError> {
        let value = self.raw(field).trim();
        if value.is_empty() {
            return Err(self.malformed(field, "value is required"));
        }
        Ok(value.to_string())
    }

    fn int(&self, field: &'static str) -> Result<i64, MalformedRowError> {
        parse_int(self.raw(field)).ok_or_else(|| self.malformed(field, "not an integer"))
    }

    fn float(&self, field: &'static str) -> Result<f64, MalformedRowError> {
        parse_float(self.raw(field)).ok_or_else(|| self.malformed(field, "not a number"))
    }

    /// A normalised audio feature in [0, 1].
    fn unit(&self, field: &'static str) -> Result<f64, MalformedRowError> {
        let value = self.float(field)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(self.malformed(field, "outside [0, 1]"));
        }
        Ok(value)
    }

    fn flag(&self, field: &'static str) -> Result<bool, MalformedRowError> {
        parse_bool(self.raw(field)).ok_or_else(|| self.malformed(field, "not a boolean"))
    }
}

/// Converts one raw row into a [`TrackRecord`].
///
/// `instrumentalness` is the only lenient field: unparseable or
/// out-of-range values become 0.0.
pub fn normalize(row: &RawRow) -> Result<TrackRecord, MalformedRowError> {
    let f = Fields { row };

    let popularity = f.int("popularity")?;
    if !(0..=100).contains(&popularity) {
        return Err(f.malformed("popularity", "outside 0..=100"));
    }
    let duration_ms = f.int("duration_ms")?;
    if duration_ms <= 0 {
        return Err(f.malformed("duration_ms", "must be positive"));
    }

    let instrumentalness = parse_float(f.raw("instrumentalness"))
        .filter(|v| (0.0..=1.0).contains(v))
        .unwrap_or(0.0);

    let track = TrackNode {
        track_id: f.text("track_id")?,
        name: f.raw("track_name").trim().to_string(),
        popularity,
        duration_ms,
        explicit: f.flag("explicit")?,
        danceability: f.unit("danceability")?,
        energy: f.unit("energy")?,
        key: f.int("key")?,
        loudness: f.float("loudness")?,
        mode: f.flag("mode")?,
        speechiness: f.unit("speechiness")?,
        acousticness: f.unit("acousticness")?,
        instrumentalness,
        liveness: f.unit("liveness")?,
        valence: f.unit("valence")?,
        tempo: f.float("tempo")?,
        time_signature: f.int("time_signature")?,
        genre: f.text("track_genre")?,
    };

    let album_name = Some(f.raw("album_name").trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    Ok(TrackRecord {
        track,
        artists: parse_artists(f.raw("artists")),
        album_name,
    })
}
