//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current Unix timestamp in whole seconds
pub fn now_unix_seconds() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_now_unix_seconds_matches_now() {
        let secs = now_unix_seconds();
        let dt = now();
        // Sampled back to back, the two clocks agree to within a second or two
        assert!((dt.timestamp() - secs).abs() <= 2);
    }
}
