//! MusicBrainz recording lookup
//!
//! Rate-limited client for the MusicBrainz recording search API, used to
//! discover ISRCs for media records that lack one. The report assembler only
//! depends on the [`RecordingLookup`] trait so tests can substitute a stub.

use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

/// Public MusicBrainz API, used unless a mirror is configured
pub const DEFAULT_BASE_URL: &str = "https://musicbrainz.org";
/// Minimum interval between requests against the public API
pub const DEFAULT_RATE_LIMIT_MS: u64 = 1000; // 1 request per second
const USER_AGENT: &str = "Aerial/0.1.0 (https://github.com/aerial-radio/aerial)";
const SEARCH_LIMIT: &str = "5";

/// MusicBrainz client errors
#[derive(Debug, Error)]
pub enum MBError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Candidate recording returned by a lookup
#[derive(Debug, Clone)]
pub struct RecordingCandidate {
    /// Recording MBID (MusicBrainz ID)
    pub id: String,
    /// Recording title
    pub title: String,
    /// ISRCs registered against this recording (may be empty)
    pub isrcs: Vec<String>,
}

/// Recording lookup collaborator
///
/// Given a song's artist/title (optionally narrowed by album), return
/// candidate recordings in relevance order. The enricher takes the first
/// candidate carrying a non-empty ISRC list.
#[async_trait::async_trait]
pub trait RecordingLookup: Send + Sync {
    async fn find_recordings(
        &self,
        artist: &str,
        title: &str,
        album: Option<&str>,
    ) -> Result<Vec<RecordingCandidate>, MBError>;
}

/// Recording search response (subset of the MusicBrainz document)
#[derive(Debug, Deserialize)]
struct MBSearchResponse {
    #[serde(default)]
    recordings: Vec<MBSearchRecording>,
}

#[derive(Debug, Deserialize)]
struct MBSearchRecording {
    id: String,
    title: String,
    #[serde(default)]
    isrcs: Vec<String>,
}

/// Rate limiter enforcing the MusicBrainz request interval
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter>,
}

impl MusicBrainzClient {
    pub fn new() -> Result<Self, MBError> {
        Self::with_config(DEFAULT_BASE_URL, DEFAULT_RATE_LIMIT_MS)
    }

    /// Create a client against a specific base URL and request interval
    ///
    /// Used for self-hosted MusicBrainz mirrors (which tolerate a higher
    /// request rate) and for pointing tests at a local server.
    pub fn with_config(base_url: impl Into<String>, rate_limit_ms: u64) -> Result<Self, MBError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MBError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(RateLimiter::new(rate_limit_ms)),
        })
    }

    /// Build the Lucene search query for an artist/title(/album) triple
    fn search_query(artist: &str, title: &str, album: Option<&str>) -> String {
        let mut query = format!(
            r#"artist:"{}" AND recording:"{}""#,
            escape_lucene(artist),
            escape_lucene(title)
        );

        if let Some(album) = album {
            if !album.is_empty() {
                query.push_str(&format!(r#" AND release:"{}""#, escape_lucene(album)));
            }
        }

        query
    }
}

/// Escape characters with meaning inside a quoted Lucene term
fn escape_lucene(term: &str) -> String {
    term.replace('\\', "\\\\").replace('"', "\\\"")
}

#[async_trait::async_trait]
impl RecordingLookup for MusicBrainzClient {
    async fn find_recordings(
        &self,
        artist: &str,
        title: &str,
        album: Option<&str>,
    ) -> Result<Vec<RecordingCandidate>, MBError> {
        // Rate limit
        self.rate_limiter.wait().await;

        let query = Self::search_query(artist, title, album);
        let url = format!("{}/ws/2/recording", self.base_url);

        tracing::debug!(query = %query, url = %url, "Querying MusicBrainz recording search");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("query", query.as_str()),
                ("inc", "isrcs"),
                ("fmt", "json"),
                ("limit", SEARCH_LIMIT),
            ])
            .send()
            .await
            .map_err(|e| MBError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 503 {
            return Err(MBError::RateLimitExceeded);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MBError::ApiError(status.as_u16(), error_text));
        }

        let parsed: MBSearchResponse = response
            .json()
            .await
            .map_err(|e| MBError::ParseError(e.to_string()))?;

        tracing::debug!(
            artist = %artist,
            title = %title,
            candidates = parsed.recordings.len(),
            "Retrieved recording candidates from MusicBrainz"
        );

        Ok(parsed
            .recordings
            .into_iter()
            .map(|r| RecordingCandidate {
                id: r.id,
                title: r.title,
                isrcs: r.isrcs,
            })
            .collect())
    }
}
