//! One gathered row per job.

use crate::report::{ReportInfo, ResourceUsage};
use crate::trace::TraceInfo;
use chrono::NaiveDateTime;
use lsf_stats_parsers::{format_timestamp, parse_lsf_timestamp};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Column order of the gathered table.
pub const COLUMNS: [&str; 9] = [
    "filename",
    "date",
    "successful",
    "duration",
    "avg_memory",
    "max_memory",
    "note",
    "rules",
    "wildcards",
];

/// Parsed information about a single job.
///
/// Only `filename` is guaranteed; a job whose logs could not be parsed
/// keeps every other field empty.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    /// Report file name
    pub filename: String,
    /// Job start time
    pub date: Option<NaiveDateTime>,
    /// Whether the job completed successfully
    pub successful: Option<bool>,
    /// Run time and memory, present only as a complete set
    pub usage: Option<ResourceUsage>,
    /// Free-text note from the report
    pub note: Option<String>,
    /// Comma-joined rule names
    pub rules: Option<String>,
    /// Comma-joined wildcard strings
    pub wildcards: Option<String>,
}

impl JobRecord {
    /// A row carrying only the file name.
    pub fn filename_only(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            date: None,
            successful: None,
            usage: None,
            note: None,
            rules: None,
            wildcards: None,
        }
    }

    /// Merge report and trace information into one row.
    pub fn from_parts(filename: impl Into<String>, report: ReportInfo, trace: TraceInfo) -> Self {
        Self {
            filename: filename.into(),
            date: Some(report.date),
            successful: Some(report.successful),
            usage: report.usage,
            note: report.note,
            rules: trace.rules,
            wildcards: trace.wildcards,
        }
    }
}

/// Flat CSV representation of a [`JobRecord`].
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RecordRow {
    filename: String,
    #[serde(
        serialize_with = "serialize_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    date: Option<NaiveDateTime>,
    #[serde(deserialize_with = "deserialize_bool")]
    successful: Option<bool>,
    duration: Option<f64>,
    avg_memory: Option<f64>,
    max_memory: Option<f64>,
    note: Option<String>,
    rules: Option<String>,
    wildcards: Option<String>,
}

impl From<&JobRecord> for RecordRow {
    fn from(record: &JobRecord) -> Self {
        Self {
            filename: record.filename.clone(),
            date: record.date,
            successful: record.successful,
            duration: record.usage.map(|u| u.duration),
            avg_memory: record.usage.map(|u| u.avg_memory),
            max_memory: record.usage.map(|u| u.max_memory),
            note: record.note.clone(),
            rules: record.rules.clone(),
            wildcards: record.wildcards.clone(),
        }
    }
}

impl From<RecordRow> for JobRecord {
    fn from(row: RecordRow) -> Self {
        Self {
            filename: row.filename,
            date: row.date,
            successful: row.successful,
            usage: ResourceUsage::from_parts(row.duration, row.avg_memory, row.max_memory),
            note: row.note.filter(|s| !s.is_empty()),
            rules: row.rules.filter(|s| !s.is_empty()),
            wildcards: row.wildcards.filter(|s| !s.is_empty()),
        }
    }
}

fn serialize_timestamp<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(dt) => serializer.serialize_str(&format_timestamp(dt)),
        None => serializer.serialize_none(),
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_lsf_timestamp(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
    }
}

/// Accept `true`/`false` in any case, as written by other table tools.
fn deserialize_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(s) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(s) => Err(serde::de::Error::custom(format!("invalid boolean: {}", s))),
    }
}
