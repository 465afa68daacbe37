//! Station database operations

use aerial_common::db::Station;
use anyhow::Result;
use sqlx::{Row, SqlitePool};

fn station_from_row(row: &sqlx::sqlite::SqliteRow) -> Station {
    let requests_follow_format: i64 = row.get("requests_follow_format");

    Station {
        guid: row.get("guid"),
        name: row.get("name"),
        short_name: row.get("short_name"),
        timezone_offset_min: row.get("timezone_offset_min"),
        storage_location: row.get("storage_location"),
        requests_follow_format: requests_follow_format != 0,
    }
}

/// Load station by guid
pub async fn load_station(pool: &SqlitePool, station_id: &str) -> Result<Option<Station>> {
    let row = sqlx::query(
        r#"
        SELECT guid, name, short_name, timezone_offset_min, storage_location, requests_follow_format
        FROM stations
        WHERE guid = ?
        "#,
    )
    .bind(station_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(station_from_row))
}

/// List all stations, ordered by display name
pub async fn list_stations(pool: &SqlitePool) -> Result<Vec<Station>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, name, short_name, timezone_offset_min, storage_location, requests_follow_format
        FROM stations
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(station_from_row).collect())
}
