//! Song identity hashing
//!
//! Play-history rows are keyed by a stable identity hash derived from the
//! artist/title pair rather than by media guid, because history can outlive
//! the media record that produced it (deleted or re-imported files). The
//! same function also defines the synthetic "stream offline" placeholder
//! identity that listeners see when nothing is playing; reporting code must
//! be able to recognize and exclude it.

use sha2::{Digest, Sha256};

/// Title of the synthetic placeholder entry written to play history while
/// the stream is not broadcasting.
pub const OFFLINE_TITLE: &str = "Stream Offline";

/// Artist of the synthetic placeholder entry (intentionally empty).
pub const OFFLINE_ARTIST: &str = "";

/// Compute the stable identity hash for a song.
///
/// The hash is the lowercase SHA-256 hex digest of the trimmed, lowercased
/// `artist|title` pair. Identical metadata always maps to the same id, so
/// aggregation across media re-imports stays stable.
pub fn song_id(artist: &str, title: &str) -> String {
    let canonical = format!(
        "{}|{}",
        artist.trim().to_lowercase(),
        title.trim().to_lowercase()
    );

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Identity hash of the synthetic offline-stream placeholder.
pub fn offline_song_id() -> String {
    song_id(OFFLINE_ARTIST, OFFLINE_TITLE)
}
