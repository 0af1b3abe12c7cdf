//! Test fixtures: CSV input files and a seeded catalog.

use super::constants::*;
use catalog_graph::catalog::{ArtistsField, CatalogGraph, NewTrack};
use catalog_graph::config::ImportSettings;
use catalog_graph::ingest::{AttributionMode, REQUIRED_COLUMNS};
use tempfile::NamedTempFile;

/// One CSV row; every value is kept as text so tests can inject bad input.
#[derive(Clone, Debug)]
pub struct TrackRow {
    pub track_id: String,
    pub artists: String,
    pub album_name: String,
    pub track_name: String,
    pub popularity: String,
    pub duration_ms: String,
    pub explicit: String,
    pub instrumentalness: String,
    pub track_genre: String,
}

impl TrackRow {
    pub fn new(track_id: &str, artists: &str, album_name: &str, genre: &str) -> Self {
        Self {
            track_id: track_id.to_string(),
            artists: artists.to_string(),
            album_name: album_name.to_string(),
            track_name: format!("Song {}", track_id),
            popularity: "50".to_string(),
            duration_ms: "200000".to_string(),
            explicit: "False".to_string(),
            instrumentalness: "0.0".to_string(),
            track_genre: genre.to_string(),
        }
    }

    pub fn with_popularity(mut self, popularity: &str) -> Self {
        self.popularity = popularity.to_string();
        self
    }

    pub fn with_instrumentalness(mut self, value: &str) -> Self {
        self.instrumentalness = value.to_string();
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.track_name = name.to_string();
        self
    }

    fn value(&self, column: &str) -> String {
        match column {
            "track_id" => self.track_id.clone(),
            "artists" => self.artists.clone(),
            "album_name" => self.album_name.clone(),
            "track_name" => self.track_name.clone(),
            "popularity" => self.popularity.clone(),
            "duration_ms" => self.duration_ms.clone(),
            "explicit" => self.explicit.clone(),
            "instrumentalness" => self.instrumentalness.clone(),
            "track_genre" => self.track_genre.clone(),
            "danceability" | "energy" | "valence" => "0.5".to_string(),
            "speechiness" | "acousticness" | "liveness" => "0.1".to_string(),
            "key" | "mode" => "1".to_string(),
            "loudness" => "-5.0".to_string(),
            "tempo" => "120.0".to_string(),
            "time_signature" => "4".to_string(),
            other => panic!("Unknown column {}", other),
        }
    }
}

/// Writes `rows` below the standard header, with an unnamed leading index
/// column like the public dataset has.
pub fn write_csv(rows: &[TrackRow]) -> NamedTempFile {
    write_csv_with_columns(rows, &REQUIRED_COLUMNS)
}

/// Writes only the given columns, to exercise header validation.
pub fn write_csv_with_columns(rows: &[TrackRow], columns: &[&str]) -> NamedTempFile {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    let mut writer = csv::Writer::from_path(file.path()).expect("Failed to open CSV writer");

    let mut header = vec![""];
    header.extend_from_slice(columns);
    writer.write_record(&header).expect("Failed to write header");

    for (index, row) in rows.iter().enumerate() {
        let mut record = vec![index.to_string()];
        record.extend(columns.iter().map(|c| row.value(c)));
        writer.write_record(&record).expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush CSV");
    file
}

/// Settings for tests: no retry delay, no progress bar.
pub fn import_settings(chunk_size: usize, attribution: AttributionMode) -> ImportSettings {
    ImportSettings {
        chunk_size,
        attribution,
        retry_delay_secs: 0,
        show_progress: false,
        ..Default::default()
    }
}

/// Creates the three tracks described in `constants`.
pub async fn seed_catalog(catalog: &CatalogGraph) {
    let tracks = [
        (
            TRACK_1_ID,
            TRACK_1_TITLE,
            vec![ARTIST_1_NAME, ARTIST_2_NAME],
            ALBUM_1_NAME,
            GENRE_POP,
            80,
        ),
        (
            TRACK_2_ID,
            "Second",
            vec![ARTIST_1_NAME],
            ALBUM_1_NAME,
            GENRE_ROCK,
            60,
        ),
        (
            TRACK_3_ID,
            "Smooth",
            vec![ARTIST_3_NAME],
            ALBUM_2_NAME,
            GENRE_JAZZ,
            90,
        ),
    ];

    for (id, name, artists, album, genre, popularity) in tracks {
        let new_track = NewTrack {
            track_id: Some(id.to_string()),
            name: name.to_string(),
            album_name: Some(album.to_string()),
            artists: ArtistsField::List(artists.into_iter().map(String::from).collect()),
            genre: genre.to_string(),
            popularity,
            duration_ms: Some(180_000),
            energy: 0.6,
            danceability: 0.7,
            ..Default::default()
        };
        catalog
            .create_track(new_track)
            .await
            .expect("Failed to seed catalog");
    }
}
