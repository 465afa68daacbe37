//! SoundExchange "Report of Use" generation
//!
//! Pipeline: resolve the reporting period ([`period`]), aggregate play
//! history and merge it with library metadata ([`assembler`]), serialize the
//! result as the pipe-delimited export format ([`format`]).

pub mod assembler;
pub mod format;
pub mod period;

pub use assembler::{generate, SoundExchangeReport};
pub use format::{escape_field, render, report_filename, REPORT_COLUMNS, TRANSMISSION_CATEGORY};
pub use period::{PeriodError, ReportPeriod};

/// One data line of the report
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub service_name: String,
    pub transmission_category: String,
    pub featured_artist: String,
    pub sound_recording_title: String,
    pub isrc: String,
    pub album_title: String,
    /// Not tracked in the media library; always rendered empty
    pub marketing_label: String,
    pub total_performances: i64,
}
