//! Database initialization
//!
//! Creates the database on first run, applies the schema idempotently, runs
//! versioned migrations, and seeds default settings. Safe to call from every
//! service at startup.

use crate::Result;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::path::Path;
use tracing::{info, warn};

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use sqlite options to create database if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL mode allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    apply_schema(&pool).await?;

    Ok(pool)
}

/// Initialize an in-memory database with the full schema
///
/// Each sqlite `:memory:` connection is a distinct database, so the pool is
/// capped at a single connection. Intended for tests and tooling.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    apply_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables, run pending migrations, seed default settings
///
/// Idempotent - safe to call multiple times.
async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_settings_table(pool).await?;
    create_stations_table(pool).await?;
    create_station_media_table(pool).await?;
    create_media_custom_fields_table(pool).await?;
    create_song_history_table(pool).await?;

    // Versioned migrations for databases created before the current schema
    crate::db::migrations::run_migrations(pool).await?;

    init_default_settings(pool).await?;

    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the stations table
///
/// One row per broadcast station (tenant). `timezone_offset_min` is the
/// station's fixed UTC offset in minutes (-12:00 through +14:00).
pub async fn create_stations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stations (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            short_name TEXT NOT NULL UNIQUE,
            timezone_offset_min INTEGER NOT NULL DEFAULT 0,
            storage_location TEXT NOT NULL,
            requests_follow_format INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (timezone_offset_min >= -720 AND timezone_offset_min <= 840),
            CHECK (requests_follow_format IN (0, 1))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_stations_short_name ON stations(short_name)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the station_media table
///
/// Stores per-station media library metadata. `isrc` is nullable; the
/// reports service backfills it from MusicBrainz when asked to.
pub async fn create_station_media_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS station_media (
            guid TEXT PRIMARY KEY,
            station_id TEXT NOT NULL REFERENCES stations(guid) ON DELETE CASCADE,
            storage_location TEXT NOT NULL,
            path TEXT NOT NULL,
            artist TEXT,
            title TEXT,
            album TEXT,
            genre TEXT,
            isrc TEXT,
            length_seconds REAL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (length_seconds IS NULL OR length_seconds >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_station_media_station ON station_media(station_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_station_media_storage ON station_media(storage_location)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_media_custom_fields_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS media_custom_fields (
            media_id TEXT NOT NULL REFERENCES station_media(guid) ON DELETE CASCADE,
            field_name TEXT NOT NULL,
            value TEXT,
            PRIMARY KEY (media_id, field_name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_media_custom_fields_media ON media_custom_fields(media_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the song_history table
///
/// One row per broadcast of a song. `song_id` is the identity hash from
/// `crate::song_id`; `media_id` is nullable because history outlives deleted
/// media records. Timestamps are Unix seconds.
pub async fn create_song_history_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS song_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            station_id TEXT NOT NULL REFERENCES stations(guid) ON DELETE CASCADE,
            song_id TEXT NOT NULL,
            media_id TEXT,
            text TEXT,
            artist TEXT,
            title TEXT,
            timestamp_start INTEGER NOT NULL,
            timestamp_end INTEGER NOT NULL,
            unique_listeners INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (timestamp_end >= timestamp_start),
            CHECK (unique_listeners >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_song_history_station_time ON song_history(station_id, timestamp_start)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_song_history_song ON song_history(song_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Initialize or update default settings
///
/// Ensures all required settings exist with default values and resets NULL
/// values to defaults.
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    // MusicBrainz lookup settings
    ensure_setting(pool, "musicbrainz_base_url", "https://musicbrainz.org").await?;
    ensure_setting(pool, "musicbrainz_rate_limit_ms", "1000").await?;

    info!("Default settings initialized");
    Ok(())
}

/// Ensure a setting exists with the specified default value
///
/// If the setting doesn't exist, it will be created with the default.
/// If the setting exists but has a NULL value, it will be reset to the default.
async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM settings WHERE key = ?)"
    )
    .bind(key)
    .fetch_one(pool)
    .await?;

    if !exists {
        // INSERT OR IGNORE handles concurrent initialization race conditions
        sqlx::query(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)"
        )
        .bind(key)
        .bind(default_value)
        .execute(pool)
        .await?;

        info!("Initialized setting '{}' with default value: {}", key, default_value);
        return Ok(());
    }

    let value: Option<String> = sqlx::query_scalar(
        "SELECT value FROM settings WHERE key = ?"
    )
    .bind(key)
    .fetch_one(pool)
    .await?;

    if value.is_none() {
        sqlx::query(
            "UPDATE settings SET value = ? WHERE key = ?"
        )
        .bind(default_value)
        .bind(key)
        .execute(pool)
        .await?;

        warn!("Setting '{}' was NULL, reset to default: {}", key, default_value);
    }

    Ok(())
}

/// Read a setting value, if present
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<Option<String>> = sqlx::query_scalar(
        "SELECT value FROM settings WHERE key = ?"
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(value.flatten())
}
