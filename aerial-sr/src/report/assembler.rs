//! Report assembly
//!
//! Joins aggregated play history against the station's media library,
//! optionally fills in missing ISRCs from the recording lookup service, and
//! serializes the result for download.

use std::collections::HashMap;

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use aerial_common::db::Station;
use aerial_common::song_id::offline_song_id;

use crate::db::{self, HistoryEntry, MediaRecord};
use crate::services::RecordingLookup;

use super::format::{self, TRANSMISSION_CATEGORY};
use super::{ReportPeriod, ReportRow};

/// Serialized report body plus its download filename
#[derive(Debug, Clone)]
pub struct SoundExchangeReport {
    pub filename: String,
    pub body: String,
}

/// Build the report for one station over the resolved period
///
/// ISRC enrichment is best effort: neither a failed lookup nor a failed
/// library write-back ever fails the report.
pub async fn generate(
    pool: &SqlitePool,
    lookup: &dyn RecordingLookup,
    station: &Station,
    period: &ReportPeriod,
    fetch_isrc: bool,
) -> Result<SoundExchangeReport> {
    let start_ts = period.start_ts(station.timezone_offset_min);
    let end_ts = period.end_ts(station.timezone_offset_min);

    let (media, history) = tokio::try_join!(
        db::load_station_media(pool, &station.storage_location),
        db::aggregate_song_history(pool, &station.guid, start_ts, end_ts),
    )?;

    let media_by_guid: HashMap<&str, &MediaRecord> =
        media.iter().map(|m| (m.guid.as_str(), m)).collect();

    // The placeholder logged while the stream is offline is not a sound
    // recording and never appears in the report.
    let offline = offline_song_id();

    let mut rows = Vec::with_capacity(history.len());
    for entry in &history {
        if entry.song_id == offline {
            continue;
        }

        let media = entry
            .media_id
            .as_deref()
            .and_then(|id| media_by_guid.get(id).copied());
        let mut song = SongFields::merge(entry, media);

        if fetch_isrc && song.isrc.is_none() {
            if let Some(isrc) = discover_isrc(lookup, &song).await {
                if let Some(media) = media {
                    // Fire and forget: a lost write-back only costs a repeat
                    // lookup on the next report.
                    if let Err(e) = db::set_media_isrc(pool, &media.guid, &isrc).await {
                        warn!("Failed to store ISRC for media {}: {}", media.guid, e);
                    }
                }
                song.isrc = Some(isrc);
            }
        }

        rows.push(ReportRow {
            service_name: station.name.clone(),
            transmission_category: TRANSMISSION_CATEGORY.to_string(),
            featured_artist: song.artist.unwrap_or_default(),
            sound_recording_title: song.title.unwrap_or_default(),
            isrc: song.isrc.unwrap_or_default(),
            album_title: song.album.unwrap_or_default(),
            marketing_label: String::new(),
            total_performances: entry.unique_listeners,
        });
    }

    Ok(SoundExchangeReport {
        filename: format::report_filename(&station.short_name, period),
        body: format::render(&rows),
    })
}

/// Song description used for report lines and lookup queries
///
/// `Some` values are always non-empty strings.
struct SongFields {
    artist: Option<String>,
    title: Option<String>,
    album: Option<String>,
    isrc: Option<String>,
}

impl SongFields {
    /// Library metadata wins field by field; the denormalized history copy
    /// fills the gaps and is all we have for songs no longer in the library.
    fn merge(entry: &HistoryEntry, media: Option<&MediaRecord>) -> Self {
        let history_artist = non_empty(entry.artist.as_deref());
        let history_title = non_empty(entry.title.as_deref());

        match media {
            Some(m) => Self {
                artist: non_empty(m.artist.as_deref()).or(history_artist),
                title: non_empty(m.title.as_deref()).or(history_title),
                album: non_empty(m.album.as_deref()),
                isrc: non_empty(m.isrc.as_deref()),
            },
            None => Self {
                artist: history_artist,
                title: history_title,
                album: None,
                isrc: None,
            },
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}

/// Best-effort ISRC discovery
///
/// Takes the first ISRC of the first candidate that carries any; every
/// lookup fault degrades to "no ISRC".
async fn discover_isrc(lookup: &dyn RecordingLookup, song: &SongFields) -> Option<String> {
    let artist = song.artist.as_deref().unwrap_or("");
    let title = song.title.as_deref().unwrap_or("");

    match lookup
        .find_recordings(artist, title, song.album.as_deref())
        .await
    {
        Ok(candidates) => candidates
            .into_iter()
            .find(|c| !c.isrcs.is_empty())
            .and_then(|c| c.isrcs.into_iter().next()),
        Err(e) => {
            debug!("ISRC lookup failed for {} - {}: {}", artist, title, e);
            None
        }
    }
}
