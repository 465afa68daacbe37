//! External service clients

pub mod musicbrainz;

pub use musicbrainz::{
    MBError, MusicBrainzClient, RecordingCandidate, RecordingLookup, DEFAULT_BASE_URL,
    DEFAULT_RATE_LIMIT_MS,
};
