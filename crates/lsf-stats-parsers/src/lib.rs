//! Shared parsing and formatting utilities for LSF job logs.
//!
//! This crate provides the small text helpers used by both the gather
//! stage (timestamp parsing) and the summarize stage (human-readable
//! sizes and durations for tables and plot axes).

pub mod memory;
pub mod time;

pub use memory::{BYTES_PER_MB, mb_to_bytes, natural_size};
pub use time::{TIMESTAMP_FORMAT, format_timestamp, natural_delta, parse_lsf_timestamp};

/// Sort, de-duplicate and comma-join a set of captured strings.
///
/// Returns None when nothing was captured.
pub fn join_sorted_unique<I, S>(items: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut values: Vec<String> = items.into_iter().map(Into::into).collect();
    values.sort();
    values.dedup();
    if values.is_empty() {
        None
    } else {
        Some(values.join(","))
    }
}
