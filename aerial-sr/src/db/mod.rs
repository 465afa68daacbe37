//! Database access layer for aerial-sr

pub mod history;
pub mod media;
pub mod stations;

pub use history::{aggregate_song_history, HistoryEntry};
pub use media::{load_station_media, set_media_isrc, MediaRecord};
pub use stations::{list_stations, load_station};
