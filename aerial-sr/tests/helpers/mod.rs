//! Test helpers for aerial-sr integration tests
//!
//! Provides an in-memory application instance with a scriptable recording
//! lookup, seed functions for the shared schema, and HTTP request helpers
//! that drive the router directly.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::StatusCode;
use axum::Router;
use http::Request;
use sqlx::SqlitePool;
use tower::ServiceExt;

use aerial_common::db::init_memory_database;
use aerial_sr::services::{MBError, RecordingCandidate, RecordingLookup};
use aerial_sr::AppState;

/// Scriptable recording lookup
///
/// Returns a fixed candidate list (or a network error) and counts how often
/// it was consulted.
pub struct StubLookup {
    candidates: Vec<RecordingCandidate>,
    fail: bool,
    calls: AtomicUsize,
}

impl StubLookup {
    pub fn returning(candidates: Vec<RecordingCandidate>) -> Arc<Self> {
        Arc::new(Self {
            candidates,
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            candidates: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RecordingLookup for StubLookup {
    async fn find_recordings(
        &self,
        _artist: &str,
        _title: &str,
        _album: Option<&str>,
    ) -> Result<Vec<RecordingCandidate>, MBError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MBError::NetworkError("stub: lookup unavailable".to_string()));
        }
        Ok(self.candidates.clone())
    }
}

/// A candidate recording carrying the given ISRCs
pub fn candidate(id: &str, isrcs: &[&str]) -> RecordingCandidate {
    RecordingCandidate {
        id: id.to_string(),
        title: "Song Y".to_string(),
        isrcs: isrcs.iter().map(|s| s.to_string()).collect(),
    }
}

/// Build the application against a fresh in-memory database
pub async fn setup_app(lookup: Arc<dyn RecordingLookup>) -> (Router, SqlitePool) {
    let pool = init_memory_database()
        .await
        .expect("Failed to initialize test database");
    let app = aerial_sr::build_router(AppState::new(pool.clone(), lookup));
    (app, pool)
}

/// Insert a station; `st-1` / "Demo Radio" / "demo" unless overridden
pub async fn seed_station(pool: &SqlitePool, guid: &str, name: &str, short_name: &str) {
    sqlx::query(
        r#"
        INSERT INTO stations (guid, name, short_name, timezone_offset_min, storage_location)
        VALUES (?, ?, ?, 0, '/srv/media/demo')
        "#,
    )
    .bind(guid)
    .bind(name)
    .bind(short_name)
    .execute(pool)
    .await
    .expect("Failed to seed station");
}

pub async fn seed_demo_station(pool: &SqlitePool) {
    seed_station(pool, "st-1", "Demo Radio", "demo").await;
}

/// Insert a library record for the demo station's storage location
pub async fn seed_media(pool: &SqlitePool, guid: &str, isrc: Option<&str>) {
    sqlx::query(
        r#"
        INSERT INTO station_media
            (guid, station_id, storage_location, path, artist, title, album, isrc)
        VALUES (?, 'st-1', '/srv/media/demo', ?, 'Artist X', 'Song Y', 'Album Z', ?)
        "#,
    )
    .bind(guid)
    .bind(format!("{}.mp3", guid))
    .bind(isrc)
    .execute(pool)
    .await
    .expect("Failed to seed media");
}

/// Insert one play-history row for the demo station
pub async fn seed_play(
    pool: &SqlitePool,
    song_id: &str,
    media_id: Option<&str>,
    artist: &str,
    title: &str,
    start: i64,
    listeners: i64,
) {
    sqlx::query(
        r#"
        INSERT INTO song_history
            (station_id, song_id, media_id, artist, title, timestamp_start, timestamp_end, unique_listeners)
        VALUES ('st-1', ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(song_id)
    .bind(media_id)
    .bind(artist)
    .bind(title)
    .bind(start)
    .bind(start + 180)
    .bind(listeners)
    .execute(pool)
    .await
    .expect("Failed to seed play history");
}

/// GET `path` and return (status, body text, content-disposition if any)
pub async fn get(app: &Router, path: &str) -> (StatusCode, String, Option<String>) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .expect("Failed to build request");

    send(app, request).await
}

/// POST an urlencoded form to `path`
pub async fn post_form(app: &Router, path: &str, form: &str) -> (StatusCode, String, Option<String>) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .expect("Failed to build request");

    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String, Option<String>) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed");

    let status = response.status();
    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");

    (
        status,
        String::from_utf8(body.to_vec()).expect("Response body is not UTF-8"),
        disposition,
    )
}
