//! Report period resolution
//!
//! Turns the caller-supplied date strings into an inclusive date range,
//! defaulting to the full previous calendar month, and anchors the range to
//! the station's operating timezone (a fixed UTC offset in minutes).

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Date-range validation errors
///
/// Surfaced to the caller as field-level form messages, never as a 5xx.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("{field} date must be a valid YYYY-MM-DD date")]
    Malformed { field: &'static str },

    #[error("start date is after end date")]
    Inverted,
}

/// Inclusive report date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportPeriod {
    /// Resolve the requested range
    ///
    /// Both dates absent means the full previous calendar month relative to
    /// `today`. Supplying only one bound is malformed input on the missing
    /// field - a half-specified window has no defined meaning.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, PeriodError> {
        let (start, end) = match (start, end) {
            (None, None) => return Ok(Self::previous_month(today)),
            (Some(s), Some(e)) => (parse_date(s, "start")?, parse_date(e, "end")?),
            (Some(_), None) => return Err(PeriodError::Malformed { field: "end" }),
            (None, Some(_)) => return Err(PeriodError::Malformed { field: "start" }),
        };

        if start > end {
            return Err(PeriodError::Inverted);
        }

        Ok(Self { start, end })
    }

    /// The full previous calendar month relative to `today`
    pub fn previous_month(today: NaiveDate) -> Self {
        let first_of_current = today.with_day(1).expect("day 1 is valid in every month");
        let end = first_of_current
            .pred_opt()
            .expect("month start has a predecessor");
        let start = end.with_day(1).expect("day 1 is valid in every month");

        Self { start, end }
    }

    /// Window start as Unix seconds: 00:00:00 of the start date at the
    /// station's fixed UTC offset
    pub fn start_ts(&self, offset_min: i64) -> i64 {
        local_ts(self.start, 0, 0, 0, offset_min)
    }

    /// Window end as Unix seconds: 23:59:59 of the end date at the station's
    /// fixed UTC offset
    pub fn end_ts(&self, offset_min: i64) -> i64 {
        local_ts(self.end, 23, 59, 59, offset_min)
    }

    /// Start date as ddMMyyyy, for the export filename
    pub fn start_compact(&self) -> String {
        self.start.format("%d%m%Y").to_string()
    }

    /// End date as ddMMyyyy, for the export filename
    pub fn end_compact(&self) -> String {
        self.end.format("%d%m%Y").to_string()
    }

    /// Start date as YYYY-MM-DD, for form prefill
    pub fn start_iso(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// End date as YYYY-MM-DD, for form prefill
    pub fn end_iso(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

fn parse_date(value: &str, field: &'static str) -> Result<NaiveDate, PeriodError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| PeriodError::Malformed { field })
}

/// Wall-clock instant at a fixed UTC offset, as Unix seconds
fn local_ts(date: NaiveDate, hour: u32, min: u32, sec: u32, offset_min: i64) -> i64 {
    let naive = date
        .and_hms_opt(hour, min, sec)
        .expect("constant wall-clock time is valid");
    naive.and_utc().timestamp() - offset_min * 60
}
