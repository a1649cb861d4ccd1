//! Parser for LSF job report files (`*.out`).
//!
//! LSF appends a report to the job's standard output when the job ends:
//!
//! ```text
//! Started at Thu Jan 14 10:20:30 2021
//! ...
//! ------------------------------------------------------------
//!
//! Successfully completed.
//!
//! Resource usage summary:
//!
//!     Max Memory :                                 200 MB
//!     Average Memory :                             100.50 MB
//!     Run time :                                   300 sec.
//! ```

use camino::Utf8Path;
use chrono::NaiveDateTime;
use lsf_stats_parsers::parse_lsf_timestamp;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use thiserror::Error;

static STARTED_AT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Started at (?P<date>.+)").expect("valid started-at regex"));

static NOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)-+.*-+\n\n(?P<note>.+)\n\nResource usage summary:")
        .expect("valid note regex")
});

static RUN_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Run time : +(?P<value>[\d.]+) sec.").expect("valid run time regex"));

static AVERAGE_MEMORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Average Memory : +(?P<value>[\d.]+) MB").expect("valid average memory regex")
});

static MAX_MEMORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Max Memory : +(?P<value>[\d.]+) MB").expect("valid max memory regex")
});

/// Marker LSF writes when the job exited with status 0.
const SUCCESS_MARKER: &str = "Successfully completed.";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No 'Started at' line found")]
    MissingStartDate,
    #[error("Unrecognized start date: {0}")]
    InvalidStartDate(String),
    #[error("Unparseable {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Resource usage from the report's summary block.
///
/// The three values are only ever present together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceUsage {
    /// Wall clock run time in seconds
    pub duration: f64,
    /// Average memory in MB
    pub avg_memory: f64,
    /// Peak memory in MB
    pub max_memory: f64,
}

impl ResourceUsage {
    /// Combine three independently parsed values; any missing value
    /// invalidates the whole usage block.
    pub fn from_parts(
        duration: Option<f64>,
        avg_memory: Option<f64>,
        max_memory: Option<f64>,
    ) -> Option<Self> {
        Some(Self {
            duration: duration?,
            avg_memory: avg_memory?,
            max_memory: max_memory?,
        })
    }
}

/// Information extracted from a job report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportInfo {
    /// Job start time
    pub date: NaiveDateTime,
    /// Whether LSF reported successful completion
    pub successful: bool,
    /// Resource usage, absent if any of its fields could not be parsed
    pub usage: Option<ResourceUsage>,
    /// Text between the command echo and the resource summary
    /// (e.g. "Successfully completed." or "Exited with exit code 1.")
    pub note: Option<String>,
}

/// Parse a report file from disk.
pub fn parse_report_file(path: &Utf8Path) -> Result<ReportInfo, ReportError> {
    let content = fs::read_to_string(path)?;
    parse_report(&content)
}

/// Parse report text.
///
/// Fails if the start date is missing or unparseable, or if a usage value
/// matched but is not a number. Every other field degrades to missing.
pub fn parse_report(content: &str) -> Result<ReportInfo, ReportError> {
    let raw_date = STARTED_AT
        .captures(content)
        .and_then(|caps| caps.name("date"))
        .map(|m| m.as_str())
        .ok_or(ReportError::MissingStartDate)?;
    let date = parse_lsf_timestamp(raw_date)
        .ok_or_else(|| ReportError::InvalidStartDate(raw_date.trim().to_string()))?;

    let note = NOTE
        .captures(content)
        .and_then(|caps| caps.name("note"))
        .map(|m| m.as_str().to_string());

    Ok(ReportInfo {
        date,
        successful: content.contains(SUCCESS_MARKER),
        usage: parse_usage(content)?,
        note,
    })
}

/// Extract the resource usage block.
///
/// Values are read in order: run time, average memory, max memory. The
/// first missing one leaves the whole block empty.
fn parse_usage(content: &str) -> Result<Option<ResourceUsage>, ReportError> {
    let Some(duration) = capture_f64(&RUN_TIME, "run time", content)? else {
        return Ok(None);
    };
    let Some(avg_memory) = capture_f64(&AVERAGE_MEMORY, "average memory", content)? else {
        return Ok(None);
    };
    let Some(max_memory) = capture_f64(&MAX_MEMORY, "max memory", content)? else {
        return Ok(None);
    };
    Ok(Some(ResourceUsage {
        duration,
        avg_memory,
        max_memory,
    }))
}

/// Capture the `value` group of a pattern as a float.
fn capture_f64(re: &Regex, field: &'static str, content: &str) -> Result<Option<f64>, ReportError> {
    let Some(value) = re.captures(content).and_then(|caps| caps.name("value")) else {
        return Ok(None);
    };
    let value = value.as_str();
    value
        .parse()
        .map(Some)
        .map_err(|_| ReportError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}
