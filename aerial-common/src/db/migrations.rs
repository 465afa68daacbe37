//! Database schema migrations
//!
//! Implements versioned schema migrations to allow seamless database upgrades
//! without requiring manual deletion or data loss.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - They must remain stable for users upgrading from older versions
//! 2. **Always add new migrations** - Create a new migration function for each schema change
//! 3. **Test migrations** - Verify they work on databases with old schema
//! 4. **Use ALTER TABLE** - Prefer ALTER TABLE over DROP/CREATE to preserve data

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> = sqlx::query_scalar(
        "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1"
    )
    .fetch_optional(pool)
    .await?;

    Ok(version.unwrap_or(0))
}

/// Set schema version in database
async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query(
        "INSERT INTO schema_version (version) VALUES (?)"
    )
    .bind(version)
    .execute(pool)
    .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        warn!("This may indicate a downgrade. Proceeding with caution.");
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("✓ Migration v2 completed");
    }

    info!("All migrations completed successfully");
    Ok(())
}

/// Migration v1: Add isrc column to station_media table
///
/// **Background:** Media libraries imported before ISRC tracking have no
/// isrc column. The reports service needs it for SoundExchange exports and
/// as the target of the MusicBrainz backfill.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Add isrc column to station_media");

    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='station_media'
        )
        "#
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        // Table doesn't exist yet - will be created with correct schema
        info!("  station_media table doesn't exist yet - skipping migration");
        return Ok(());
    }

    let has_column: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('station_media') WHERE name = 'isrc'"
    )
    .fetch_one(pool)
    .await?;

    if has_column > 0 {
        info!("  isrc column already exists - skipping");
        return Ok(());
    }

    // Catch duplicate column error for concurrent initialization race conditions
    match sqlx::query("ALTER TABLE station_media ADD COLUMN isrc TEXT")
        .execute(pool)
        .await
    {
        Ok(_) => {
            info!("  ✓ Added isrc column to station_media table");
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {
            info!("  isrc column added by concurrent thread - skipping");
            Ok(())
        }
        Err(e) => Err(e.into())
    }
}

/// Migration v2: Add requests_follow_format column to stations table
///
/// **Background:** Stations gained a per-tenant toggle restricting listener
/// song requests to the station's programmed format. Existing databases
/// predate the column; the default (0) preserves the old unrestricted
/// behavior.
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: Add requests_follow_format column to stations");

    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='stations'
        )
        "#
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        // Table doesn't exist yet - will be created with correct schema
        info!("  stations table doesn't exist yet - skipping migration");
        return Ok(());
    }

    let has_column: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('stations') WHERE name = 'requests_follow_format'"
    )
    .fetch_one(pool)
    .await?;

    if has_column > 0 {
        info!("  requests_follow_format column already exists - skipping");
        return Ok(());
    }

    match sqlx::query("ALTER TABLE stations ADD COLUMN requests_follow_format INTEGER NOT NULL DEFAULT 0")
        .execute(pool)
        .await
    {
        Ok(_) => {
            info!("  ✓ Added requests_follow_format column to stations table");
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {
            info!("  requests_follow_format column added by concurrent thread - skipping");
            Ok(())
        }
        Err(e) => Err(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_schema_version_no_table() {
        let pool = setup_test_db().await;
        let version = get_schema_version(&pool).await.unwrap();
        assert_eq!(version, 0);
    }

    #[tokio::test]
    async fn test_get_schema_version_empty_table() {
        let pool = setup_test_db().await;

        sqlx::query(
            "CREATE TABLE schema_version (version INTEGER PRIMARY KEY, applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP)"
        )
        .execute(&pool)
        .await
        .unwrap();

        let version = get_schema_version(&pool).await.unwrap();
        assert_eq!(version, 0);
    }

    #[tokio::test]
    async fn test_set_and_get_schema_version() {
        let pool = setup_test_db().await;

        sqlx::query(
            "CREATE TABLE schema_version (version INTEGER PRIMARY KEY, applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP)"
        )
        .execute(&pool)
        .await
        .unwrap();

        set_schema_version(&pool, 1).await.unwrap();
        let version = get_schema_version(&pool).await.unwrap();
        assert_eq!(version, 1);
    }

    #[tokio::test]
    async fn test_migrate_v1_no_table() {
        let pool = setup_test_db().await;

        // Should succeed even if station_media table doesn't exist
        migrate_v1(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_migrate_v2_adds_column() {
        let pool = setup_test_db().await;

        // Create stations table WITHOUT requests_follow_format column
        sqlx::query(
            r#"
            CREATE TABLE stations (
                guid TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                short_name TEXT NOT NULL UNIQUE,
                timezone_offset_min INTEGER NOT NULL DEFAULT 0,
                storage_location TEXT NOT NULL
            )
            "#
        )
        .execute(&pool)
        .await
        .unwrap();

        migrate_v2(&pool).await.unwrap();

        let has_column: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pragma_table_info('stations') WHERE name = 'requests_follow_format'"
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(has_column, 1);
    }

    #[tokio::test]
    async fn test_migrate_v2_default_preserves_existing_rows() {
        let pool = setup_test_db().await;

        sqlx::query(
            r#"
            CREATE TABLE stations (
                guid TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                short_name TEXT NOT NULL UNIQUE,
                timezone_offset_min INTEGER NOT NULL DEFAULT 0,
                storage_location TEXT NOT NULL
            )
            "#
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO stations (guid, name, short_name, storage_location) VALUES ('s1', 'Demo Radio', 'demo', '/srv/media/demo')"
        )
        .execute(&pool)
        .await
        .unwrap();

        migrate_v2(&pool).await.unwrap();

        // Pre-existing rows get the unrestricted default
        let value: i64 = sqlx::query_scalar(
            "SELECT requests_follow_format FROM stations WHERE guid = 's1'"
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(value, 0);
    }

    #[tokio::test]
    async fn test_migrate_v2_idempotent() {
        let pool = setup_test_db().await;

        // Create stations table WITH requests_follow_format column
        sqlx::query(
            r#"
            CREATE TABLE stations (
                guid TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                short_name TEXT NOT NULL UNIQUE,
                timezone_offset_min INTEGER NOT NULL DEFAULT 0,
                storage_location TEXT NOT NULL,
                requests_follow_format INTEGER NOT NULL DEFAULT 0
            )
            "#
        )
        .execute(&pool)
        .await
        .unwrap();

        // Run migration twice - should not fail
        migrate_v2(&pool).await.unwrap();
        migrate_v2(&pool).await.unwrap();

        let column_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pragma_table_info('stations') WHERE name = 'requests_follow_format'"
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(column_count, 1);
    }

    #[tokio::test]
    async fn test_run_migrations_complete_flow() {
        let pool = setup_test_db().await;

        sqlx::query(
            "CREATE TABLE schema_version (version INTEGER PRIMARY KEY, applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP)"
        )
        .execute(&pool)
        .await
        .unwrap();

        // Old-schema tables without the migrated columns
        sqlx::query(
            r#"
            CREATE TABLE stations (
                guid TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                short_name TEXT NOT NULL UNIQUE,
                timezone_offset_min INTEGER NOT NULL DEFAULT 0,
                storage_location TEXT NOT NULL
            )
            "#
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            r#"
            CREATE TABLE station_media (
                guid TEXT PRIMARY KEY,
                station_id TEXT NOT NULL,
                storage_location TEXT NOT NULL,
                path TEXT NOT NULL,
                artist TEXT,
                title TEXT,
                album TEXT
            )
            "#
        )
        .execute(&pool)
        .await
        .unwrap();

        run_migrations(&pool).await.unwrap();

        let version = get_schema_version(&pool).await.unwrap();
        assert_eq!(version, CURRENT_SCHEMA_VERSION);

        let has_isrc: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pragma_table_info('station_media') WHERE name = 'isrc'"
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(has_isrc, 1);

        let has_rff: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pragma_table_info('stations') WHERE name = 'requests_follow_format'"
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(has_rff, 1);
    }
}
