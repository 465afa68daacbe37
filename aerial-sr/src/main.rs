//! Station Reports (aerial-sr) - Main entry point
//!
//! Serves the per-station royalty reporting UI and the report download
//! endpoints against the shared Aerial database.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aerial_common::db::{get_setting, init_database};
use aerial_sr::services::{self, MusicBrainzClient};
use aerial_sr::AppState;

/// Command-line arguments for aerial-sr
#[derive(Parser, Debug)]
#[command(name = "aerial-sr")]
#[command(about = "Station Reports microservice for Aerial")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5760", env = "AERIAL_SR_PORT")]
    port: u16,

    /// Path to the shared SQLite database (defaults to <data-dir>/aerial.db)
    #[arg(long, env = "AERIAL_DATABASE")]
    database: Option<String>,

    /// Data directory (falls back to AERIAL_DATA_DIR, the config file, then
    /// the OS default)
    #[arg(short, long)]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aerial_sr=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!(
        "Starting Aerial Station Reports v{} ({}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_PROFILE"),
    );

    let db_path = resolve_database_path(&args)?;
    info!("Database: {}", db_path.display());

    let db = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;
    info!("Database connection established");

    // MusicBrainz endpoint and pacing are tunable through settings, so a
    // self-hosted mirror can be used without rebuilding.
    let base_url = get_setting(&db, "musicbrainz_base_url")
        .await?
        .unwrap_or_else(|| services::DEFAULT_BASE_URL.to_string());
    let rate_limit_ms = get_setting(&db, "musicbrainz_rate_limit_ms")
        .await?
        .and_then(|v| v.parse().ok())
        .unwrap_or(services::DEFAULT_RATE_LIMIT_MS);
    let lookup = MusicBrainzClient::with_config(base_url, rate_limit_ms)
        .context("Failed to create MusicBrainz client")?;

    let state = AppState::new(db, Arc::new(lookup));
    let app = aerial_sr::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Pick the database file: explicit path if given, otherwise the shared
/// location inside the resolved data directory.
fn resolve_database_path(args: &Args) -> Result<PathBuf> {
    if let Some(path) = &args.database {
        return Ok(PathBuf::from(path));
    }

    let data_dir =
        aerial_common::config::resolve_data_dir(args.data_dir.as_deref(), "AERIAL_DATA_DIR", Some("data_dir"))
            .context("Failed to resolve data directory")?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    Ok(data_dir.join("aerial.db"))
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
