//! Station media database operations

use anyhow::Result;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

/// Media library record with its custom fields
///
/// Read-only to the report assembler except for the ISRC backfill via
/// [`set_media_isrc`].
#[derive(Debug, Clone)]
pub struct MediaRecord {
    pub guid: String,
    pub station_id: String,
    pub storage_location: String,
    pub path: String,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub isrc: Option<String>,
    pub length_seconds: Option<f64>,
    pub custom_fields: Vec<(String, Option<String>)>,
}

/// Load all media records for a storage location, with custom fields attached
pub async fn load_station_media(
    pool: &SqlitePool,
    storage_location: &str,
) -> Result<Vec<MediaRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, station_id, storage_location, path, artist, title, album, genre,
               isrc, length_seconds
        FROM station_media
        WHERE storage_location = ?
        ORDER BY guid
        "#,
    )
    .bind(storage_location)
    .fetch_all(pool)
    .await?;

    let mut media: Vec<MediaRecord> = rows
        .iter()
        .map(|row| MediaRecord {
            guid: row.get("guid"),
            station_id: row.get("station_id"),
            storage_location: row.get("storage_location"),
            path: row.get("path"),
            artist: row.get("artist"),
            title: row.get("title"),
            album: row.get("album"),
            genre: row.get("genre"),
            isrc: row.get("isrc"),
            length_seconds: row.get("length_seconds"),
            custom_fields: Vec::new(),
        })
        .collect();

    // Attach custom fields in a single batch query
    let field_rows = sqlx::query(
        r#"
        SELECT mcf.media_id, mcf.field_name, mcf.value
        FROM media_custom_fields mcf
        JOIN station_media sm ON sm.guid = mcf.media_id
        WHERE sm.storage_location = ?
        ORDER BY mcf.media_id, mcf.field_name
        "#,
    )
    .bind(storage_location)
    .fetch_all(pool)
    .await?;

    let index_by_guid: HashMap<String, usize> = media
        .iter()
        .enumerate()
        .map(|(i, m)| (m.guid.clone(), i))
        .collect();

    for row in &field_rows {
        let media_id: String = row.get("media_id");
        if let Some(&i) = index_by_guid.get(&media_id) {
            media[i]
                .custom_fields
                .push((row.get("field_name"), row.get("value")));
        }
    }

    Ok(media)
}

/// Persist a discovered ISRC on a media record
///
/// Idempotent - writing the same ISRC twice leaves the row unchanged.
pub async fn set_media_isrc(pool: &SqlitePool, media_id: &str, isrc: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE station_media
        SET isrc = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(isrc)
    .bind(media_id)
    .execute(pool)
    .await?;

    Ok(())
}
