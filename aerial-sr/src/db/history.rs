//! Play history database operations

use anyhow::Result;
use sqlx::{Row, SqlitePool};

/// Aggregated play totals for one song within a report window
///
/// Computed per request by the aggregation query; never persisted.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub song_id: String,
    pub media_id: Option<String>,
    pub text: Option<String>,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub play_count: i64,
    pub unique_listeners: i64,
}

/// Aggregate play history for a station within a time window
///
/// A broadcast counts when it overlaps the window at all: it starts no later
/// than the window end and ends no earlier than the window start. Results are
/// grouped by song identity hash and ordered by it, so report output is
/// reproducible for a given database state.
pub async fn aggregate_song_history(
    pool: &SqlitePool,
    station_id: &str,
    start_ts: i64,
    end_ts: i64,
) -> Result<Vec<HistoryEntry>> {
    // The bare (non-aggregated) columns are taken from an arbitrary row of
    // each group; all rows in a group share the same song identity, so the
    // denormalized metadata agrees across them.
    let rows = sqlx::query(
        r#"
        SELECT song_id, media_id, text, artist, title,
               COUNT(id) AS play_count,
               SUM(unique_listeners) AS unique_listeners
        FROM song_history
        WHERE station_id = ?
          AND timestamp_start <= ?
          AND timestamp_end >= ?
        GROUP BY song_id
        ORDER BY song_id ASC
        "#,
    )
    .bind(station_id)
    .bind(end_ts)
    .bind(start_ts)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| HistoryEntry {
            song_id: row.get("song_id"),
            media_id: row.get("media_id"),
            text: row.get("text"),
            artist: row.get("artist"),
            title: row.get("title"),
            play_count: row.get("play_count"),
            unique_listeners: row.get("unique_listeners"),
        })
        .collect())
}
