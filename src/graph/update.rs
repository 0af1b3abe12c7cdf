//! Partial track updates.
//!
//! A [`TrackUpdate`] maps allow-listed track fields to typed values. It is
//! validated when built and compiled to a parameterised `SET` clause, so
//! caller-provided field names never reach the query text.

use super::error::GraphError;
use super::models::{PropertyValue, TrackNode};
use std::collections::BTreeMap;

/// Fields that identify a track or describe its relationships.
const PROTECTED_FIELDS: &[&str] = &["track_id", "artists", "album", "album_name"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FieldKind {
    Text,
    Int,
    Bool,
    Float,
    /// A float constrained to [0, 1].
    Unit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrackField {
    Name,
    Popularity,
    DurationMs,
    Explicit,
    Danceability,
    Energy,
    Key,
    Loudness,
    Mode,
    Speechiness,
    Acousticness,
    Instrumentalness,
    Liveness,
    Valence,
    Tempo,
    TimeSignature,
    Genre,
}

impl TrackField {
    pub const ALL: [TrackField; 17] = [
        TrackField::Name,
        TrackField::Popularity,
        TrackField::DurationMs,
        TrackField::Explicit,
        TrackField::Danceability,
        TrackField::Energy,
        TrackField::Key,
        TrackField::Loudness,
        TrackField::Mode,
        TrackField::Speechiness,
        TrackField::Acousticness,
        TrackField::Instrumentalness,
        TrackField::Liveness,
        TrackField::Valence,
        TrackField::Tempo,
        TrackField::TimeSignature,
        TrackField::Genre,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackField::Name => "name",
            TrackField::Popularity => "popularity",
            TrackField::DurationMs => "duration_ms",
            TrackField::Explicit => "explicit",
            TrackField::Danceability => "danceability",
            TrackField::Energy => "energy",
            TrackField::Key => "key",
            TrackField::Loudness => "loudness",
            TrackField::Mode => "mode",
            TrackField::Speechiness => "speechiness",
            TrackField::Acousticness => "acousticness",
            TrackField::Instrumentalness => "instrumentalness",
            TrackField::Liveness => "liveness",
            TrackField::Valence => "valence",
            TrackField::Tempo => "tempo",
            TrackField::TimeSignature => "time_signature",
            TrackField::Genre => "genre",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        // "track_name" is the column name used by the import file.
        if s == "track_name" {
            return Some(TrackField::Name);
        }
        Self::ALL.iter().copied().find(|f| f.as_str() == s)
    }

    fn kind(&self) -> FieldKind {
        match self {
            TrackField::Name | TrackField::Genre => FieldKind::Text,
            TrackField::Popularity
            | TrackField::DurationMs
            | TrackField::Key
            | TrackField::TimeSignature => FieldKind::Int,
            TrackField::Explicit | TrackField::Mode => FieldKind::Bool,
            TrackField::Loudness | TrackField::Tempo => FieldKind::Float,
            TrackField::Danceability
            | TrackField::Energy
            | TrackField::Speechiness
            | TrackField::Acousticness
            | TrackField::Instrumentalness
            | TrackField::Liveness
            | TrackField::Valence => FieldKind::Unit,
        }
    }

    /// Coerces and range-checks a value for this field.
    fn check(&self, value: PropertyValue) -> Result<PropertyValue, GraphError> {
        let invalid = |reason: String| {
            GraphError::InvalidUpdate(format!("{}: {}", self.as_str(), reason))
        };
        let type_error = |value: &PropertyValue, expected: &str| {
            invalid(format!("expected {}, got {}", expected, value.type_name()))
        };

        let value = match (self.kind(), value) {
            (FieldKind::Text, PropertyValue::Text(s)) => PropertyValue::Text(s),
            (FieldKind::Int, PropertyValue::Int(i)) => PropertyValue::Int(i),
            (FieldKind::Bool, PropertyValue::Bool(b)) => PropertyValue::Bool(b),
            // Tracks store mode as a boolean; 0/1 integers are accepted.
            (FieldKind::Bool, PropertyValue::Int(i @ (0 | 1))) => PropertyValue::Bool(i == 1),
            (FieldKind::Float | FieldKind::Unit, PropertyValue::Float(f)) => {
                PropertyValue::Float(f)
            }
            (FieldKind::Float | FieldKind::Unit, PropertyValue::Int(i)) => {
                PropertyValue::Float(i as f64)
            }
            (FieldKind::Text, other) => return Err(type_error(&other, "string")),
            (FieldKind::Int, other) => return Err(type_error(&other, "integer")),
            (FieldKind::Bool, other) => return Err(type_error(&other, "boolean")),
            (FieldKind::Float | FieldKind::Unit, other) => {
                return Err(type_error(&other, "number"))
            }
        };

        let violation = match (*self, &value) {
            (TrackField::Popularity, PropertyValue::Int(p)) if !(0..=100).contains(p) => {
                Some(format!("{} is outside 0..=100", p))
            }
            (TrackField::DurationMs, PropertyValue::Int(d)) if *d <= 0 => {
                Some(format!("{} is not a positive duration", d))
            }
            (TrackField::Name, PropertyValue::Text(s)) if s.trim().is_empty() => {
                Some("must not be empty".to_string())
            }
            (_, PropertyValue::Float(f)) if !f.is_finite() => {
                Some("must be a finite number".to_string())
            }
            (field, PropertyValue::Float(f))
                if field.kind() == FieldKind::Unit && !(0.0..=1.0).contains(f) =>
            {
                Some(format!("{} is outside [0, 1]", f))
            }
            _ => None,
        };

        match violation {
            Some(reason) => Err(invalid(reason)),
            None => Ok(value),
        }
    }
}

/// A validated set of field changes for one track.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackUpdate {
    fields: BTreeMap<TrackField, PropertyValue>,
}

impl TrackUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one field change, rejecting protected, unknown or out-of-range
    /// fields.
    pub fn set(&mut self, field: &str, value: PropertyValue) -> Result<&mut Self, GraphError> {
        if PROTECTED_FIELDS.contains(&field) {
            return Err(GraphError::InvalidUpdate(format!(
                "{} cannot be changed by an update",
                field
            )));
        }
        let track_field = TrackField::from_str(field)
            .ok_or_else(|| GraphError::InvalidUpdate(format!("unknown track field: {}", field)))?;
        let value = track_field.check(value)?;
        self.fields.insert(track_field, value);
        Ok(self)
    }

    /// Builds an update from a JSON object such as a PATCH request body.
    pub fn from_json(body: &serde_json::Value) -> Result<Self, GraphError> {
        let object = body
            .as_object()
            .ok_or_else(|| GraphError::InvalidUpdate("expected a JSON object".to_string()))?;
        let mut update = TrackUpdate::new();
        for (name, raw) in object {
            let value = serde_json::from_value::<PropertyValue>(raw.clone()).map_err(|_| {
                GraphError::InvalidUpdate(format!("{}: unsupported value {}", name, raw))
            })?;
            update.set(name, value)?;
        }
        if update.is_empty() {
            return Err(GraphError::InvalidUpdate("no fields to update".to_string()));
        }
        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: TrackField) -> Option<&PropertyValue> {
        self.fields.get(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (TrackField, &PropertyValue)> {
        self.fields.iter().map(|(f, v)| (*f, v))
    }

    /// Compiles the set to `SET t.<field> = $<field>, ...` plus parameters.
    ///
    /// Field names come from the allow-list, values only travel as parameters.
    pub fn compile(&self, node: &str) -> Result<(String, Vec<(&'static str, PropertyValue)>), GraphError> {
        if self.is_empty() {
            return Err(GraphError::InvalidUpdate("no fields to update".to_string()));
        }
        let assignments: Vec<String> = self
            .fields
            .keys()
            .map(|f| format!("{node}.{0} = ${0}", f.as_str()))
            .collect();
        let params = self
            .fields
            .iter()
            .map(|(f, v)| (f.as_str(), v.clone()))
            .collect();
        Ok((format!("SET {}", assignments.join(", ")), params))
    }

    /// Applies the set to an in-memory track.
    pub fn apply_to(&self, track: &mut TrackNode) {
        for (field, value) in &self.fields {
            match (field, value) {
                (TrackField::Name, PropertyValue::Text(s)) => track.name = s.clone(),
                (TrackField::Genre, PropertyValue::Text(s)) => track.genre = s.clone(),
                (TrackField::Popularity, PropertyValue::Int(i)) => track.popularity = *i,
                (TrackField::DurationMs, PropertyValue::Int(i)) => track.duration_ms = *i,
                (TrackField::Key, PropertyValue::Int(i)) => track.key = *i,
                (TrackField::TimeSignature, PropertyValue::Int(i)) => track.time_signature = *i,
                (TrackField::Explicit, PropertyValue::Bool(b)) => track.explicit = *b,
                (TrackField::Mode, PropertyValue::Bool(b)) => track.mode = *b,
                (TrackField::Danceability, PropertyValue::Float(f)) => track.danceability = *f,
                (TrackField::Energy, PropertyValue::Float(f)) => track.energy = *f,
                (TrackField::Loudness, PropertyValue::Float(f)) => track.loudness = *f,
                (TrackField::Speechiness, PropertyValue::Float(f)) => track.speechiness = *f,
                (TrackField::Acousticness, PropertyValue::Float(f)) => track.acousticness = *f,
                (TrackField::Instrumentalness, PropertyValue::Float(f)) => {
                    track.instrumentalness = *f
                }
                (TrackField::Liveness, PropertyValue::Float(f)) => track.liveness = *f,
                (TrackField::Valence, PropertyValue::Float(f)) => track.valence = *f,
                (TrackField::Tempo, PropertyValue::Float(f)) => track.tempo = *f,
                // `check` guarantees the value kind matches the field.
                _ => {}
            }
        }
    }
}
