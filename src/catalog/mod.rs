mod new_track;
mod service;

pub use new_track::{ArtistsField, NewTrack};
pub use service::{
    CatalogGraph, QuickStats, ARTIST_STATS_LIMIT, ARTIST_STATS_MIN_TRACKS, GENRE_STATS_LIMIT,
    LIST_LIMIT, SEARCH_LIMIT,
};
