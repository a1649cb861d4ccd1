//! Time parsing and formatting utilities for LSF job logs.

use chrono::NaiveDateTime;

/// Canonical timestamp representation used in the gathered table.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats accepted when reading timestamps back, tried in order.
const ACCEPTED_FORMATS: [&str; 5] = [
    // LSF report header, e.g. "Thu Jan 14 10:20:30 2021"
    "%a %b %d %H:%M:%S %Y",
    TIMESTAMP_FORMAT,
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    // bjobs/bhist short form with year, e.g. "Jan 14 10:20 2021"
    "%b %d %H:%M %Y",
];

/// Parse a timestamp as printed in an LSF report (`Started at ...`) or as
/// written to the gathered table.
///
/// LSF pads single-digit days with an extra space, so runs of whitespace are
/// collapsed before parsing. Returns None for empty or unrecognized input.
pub fn parse_lsf_timestamp(s: &str) -> Option<NaiveDateTime> {
    let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return None;
    }

    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
}

/// Format a timestamp in the canonical table representation.
pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Format an elapsed time in seconds as a natural-language delta
/// ("a moment", "5 seconds", "an hour", "3 days", "2 months", "1 year, 4 days").
///
/// Sub-second precision is dropped; negative values are treated as their
/// magnitude.
pub fn natural_delta(seconds: f64) -> String {
    let total = seconds.abs();
    let mut days = (total / 86_400.0).floor() as i64;
    let secs = (total - days as f64 * 86_400.0).floor() as i64;

    let years = days / 365;
    days %= 365;
    let months = (days as f64 / 30.5) as i64;

    if years == 0 && days < 1 {
        return match secs {
            0 => "a moment".to_string(),
            1 => "a second".to_string(),
            s if s < 60 => format!("{} seconds", s),
            s if s < 120 => "a minute".to_string(),
            s if s < 3600 => format!("{} minutes", s / 60),
            s if s < 7200 => "an hour".to_string(),
            s => format!("{} hours", s / 3600),
        };
    }

    if years == 0 {
        return match (days, months) {
            (1, _) => "a day".to_string(),
            (d, 0) => format!("{} days", d),
            (_, 1) => "a month".to_string(),
            (_, m) => format!("{} months", m),
        };
    }

    if years == 1 {
        return match (days, months) {
            (0, _) => "a year".to_string(),
            (1, 0) => "1 year, 1 day".to_string(),
            (d, 0) => format!("1 year, {} days", d),
            (_, 1) => "1 year, 1 month".to_string(),
            (_, m) => format!("1 year, {} months", m),
        };
    }

    format!("{} years", years)
}
