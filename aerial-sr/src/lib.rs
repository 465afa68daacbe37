//! # Aerial Station Reports (aerial-sr)
//!
//! Licensing report microservice for the Aerial web radio suite.
//!
//! **Purpose:** Generate per-station royalty reports (currently the
//! SoundExchange "Report of Use") from aggregated play history, with optional
//! ISRC enrichment via MusicBrainz.

pub mod api;
pub mod db;
pub mod error;
pub mod report;
pub mod services;

pub use error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use services::RecordingLookup;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Recording lookup used for ISRC enrichment
    pub lookup: Arc<dyn RecordingLookup>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, lookup: Arc<dyn RecordingLookup>) -> Self {
        Self {
            db,
            lookup,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // UI routes (HTML pages)
        .merge(api::ui_routes())
        // Report generation
        .merge(api::report_routes())
        .merge(api::health_routes())
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
        .with_state(state)
}
