//! Database models shared across Aerial services

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

/// Station (tenant) record
///
/// `timezone_offset_min` is the station's fixed UTC offset in minutes; report
/// windows are anchored to the station's local midnight using it.
/// `requests_follow_format` gates listener song requests to the station's
/// programmed format when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub guid: String,
    pub name: String,
    pub short_name: String,
    pub timezone_offset_min: i64,
    pub storage_location: String,
    pub requests_follow_format: bool,
}
