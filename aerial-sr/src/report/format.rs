//! SoundExchange report serialization
//!
//! Produces the pipe-delimited "Report of Use" text format: a header line
//! followed by one line per sound recording, every field passed through the
//! same escaping rule.

use super::{ReportPeriod, ReportRow};

/// Report columns, in output order
pub const REPORT_COLUMNS: [&str; 8] = [
    "NAME_OF_SERVICE",
    "TRANSMISSION_CATEGORY",
    "FEATURED_ARTIST",
    "SOUND_RECORDING_TITLE",
    "ISRC",
    "ALBUM_TITLE",
    "MARKETING_LABEL",
    "ACTUAL_TOTAL_PERFORMANCES",
];

/// Transmission category for internet webcasters
pub const TRANSMISSION_CATEGORY: &str = "A";

/// Escape one report field
///
/// Numeric literals pass through verbatim. Everything else is upper-cased,
/// stripped of literal `^` and `|` (the wrapper and delimiter characters),
/// and wrapped in carets. An empty field renders as `^^`.
pub fn escape_field(value: &str) -> String {
    if is_numeric_literal(value) {
        return value.to_string();
    }

    let cleaned: String = value
        .to_uppercase()
        .chars()
        .filter(|c| *c != '^' && *c != '|')
        .collect();

    format!("^{}^", cleaned)
}

/// A field counts as numeric when it parses as a number and contains at
/// least one digit, so spellings like "inf" still get caret-quoted.
fn is_numeric_literal(value: &str) -> bool {
    value.parse::<f64>().is_ok() && value.chars().any(|c| c.is_ascii_digit())
}

/// Render the full report body
///
/// The header line comes first and is subject to the same per-field escaping
/// as data lines. Lines are newline-joined with no trailing newline.
pub fn render(rows: &[ReportRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render_line(REPORT_COLUMNS));

    for row in rows {
        let performances = row.total_performances.to_string();
        lines.push(render_line([
            row.service_name.as_str(),
            row.transmission_category.as_str(),
            row.featured_artist.as_str(),
            row.sound_recording_title.as_str(),
            row.isrc.as_str(),
            row.album_title.as_str(),
            row.marketing_label.as_str(),
            performances.as_str(),
        ]));
    }

    lines.join("\n")
}

/// Export filename, e.g. `DEMO01012024-31012024_A.txt`
pub fn report_filename(short_name: &str, period: &ReportPeriod) -> String {
    format!(
        "{}{}-{}_A.txt",
        short_name.to_uppercase(),
        period.start_compact(),
        period.end_compact()
    )
}

fn render_line<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    fields
        .into_iter()
        .map(escape_field)
        .collect::<Vec<_>>()
        .join("|")
}
