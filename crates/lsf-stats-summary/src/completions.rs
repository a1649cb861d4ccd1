//! Cumulative job completions over time.

use crate::frame::{Frame, FrameError, Value};
use chrono::{DurationRound, NaiveDateTime, RoundingError, TimeDelta};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Column header of the bucket column in the exported series.
pub const BUCKET_COLUMN: &str = "date_group";

/// Line name used when the series is not grouped.
pub const UNGROUPED_LINE: &str = "jobs";

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("Row {row}: {column} is missing or not usable")]
    InvalidCell { column: &'static str, row: usize },
    #[error("Cannot round finish time: {0}")]
    Rounding(#[from] RoundingError),
}

/// Width of the time buckets completions are counted in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BucketWidth {
    #[default]
    Second,
    Minute,
    Hour,
}

impl BucketWidth {
    pub fn delta(&self) -> TimeDelta {
        match self {
            BucketWidth::Second => TimeDelta::seconds(1),
            BucketWidth::Minute => TimeDelta::minutes(1),
            BucketWidth::Hour => TimeDelta::hours(1),
        }
    }
}

impl fmt::Display for BucketWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketWidth::Second => write!(f, "second"),
            BucketWidth::Minute => write!(f, "minute"),
            BucketWidth::Hour => write!(f, "hour"),
        }
    }
}

/// One cumulative line, per group or for all jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionLine {
    pub group: Option<String>,
    pub cumulative: Vec<u64>,
}

impl CompletionLine {
    pub fn total(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    pub fn label(&self) -> &str {
        self.group.as_deref().unwrap_or(UNGROUPED_LINE)
    }
}

/// Cumulative completion counts on a shared, sorted bucket axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionSeries {
    pub buckets: Vec<NaiveDateTime>,
    pub lines: Vec<CompletionLine>,
}

impl CompletionSeries {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Largest cumulative value across lines.
    pub fn max_count(&self) -> u64 {
        self.lines
            .iter()
            .map(CompletionLine::total)
            .max()
            .unwrap_or(0)
    }

    /// Wide table: one bucket column plus one column per line.
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let labels = self.lines.iter().map(|l| l.label().to_string());
        let mut frame = Frame::new(std::iter::once(BUCKET_COLUMN.to_string()).chain(labels));
        for (i, bucket) in self.buckets.iter().enumerate() {
            let mut row = Vec::with_capacity(self.lines.len() + 1);
            row.push(Value::Timestamp(*bucket));
            for line in &self.lines {
                row.push(Value::Number(line.cumulative[i] as f64));
            }
            frame.push_row(row)?;
        }
        Ok(frame)
    }
}

/// Finish time of a job: start plus runtime, to the millisecond.
fn finish_time(start: NaiveDateTime, duration: f64) -> Option<NaiveDateTime> {
    if !duration.is_finite() {
        return None;
    }
    let delta = TimeDelta::try_milliseconds((duration * 1000.0).round() as i64)?;
    start.checked_add_signed(delta)
}

/// Round to the nearest multiple of `step` since the epoch. Ties go to the
/// even multiple.
fn round_half_even(time: NaiveDateTime, step: TimeDelta) -> Result<NaiveDateTime, RoundingError> {
    let floor = time.duration_trunc(step)?;
    let round_up = match ((time - floor) * 2).cmp(&step) {
        Ordering::Less => false,
        Ordering::Greater => true,
        Ordering::Equal => {
            let index = floor.and_utc().timestamp_millis() / step.num_milliseconds();
            index.rem_euclid(2) == 1
        }
    };
    Ok(if round_up { floor + step } else { floor })
}

/// Build the cumulative completion series.
///
/// Each finish time is rounded to the nearest bucket (ties to even) and
/// counted; a zero bucket one width before the first is prepended. With a
/// group column, one line is produced per group (sorted by name), each
/// carrying its total through buckets where it has no completions.
pub fn completion_series(
    frame: &Frame,
    group_column: Option<&str>,
    width: BucketWidth,
) -> Result<CompletionSeries, CompletionError> {
    let date_idx = frame.require_column("date")?;
    let duration_idx = frame.require_column("duration")?;
    let group_idx = group_column.map(|c| frame.require_column(c)).transpose()?;
    let step = width.delta();

    // group -> bucket -> count
    let mut counts: BTreeMap<Option<String>, BTreeMap<NaiveDateTime, u64>> = BTreeMap::new();
    for (row_idx, row) in frame.rows().iter().enumerate() {
        let start = row[date_idx].as_timestamp().ok_or(CompletionError::InvalidCell {
            column: "date",
            row: row_idx,
        })?;
        let finish = row[duration_idx]
            .as_f64()
            .and_then(|d| finish_time(start, d))
            .ok_or(CompletionError::InvalidCell {
                column: "duration",
                row: row_idx,
            })?;
        let bucket = round_half_even(finish, step)?;
        let group = group_idx.map(|i| row[i].to_string());
        let per_bucket = counts.entry(group).or_default();
        *per_bucket.entry(bucket).or_default() += 1;
    }

    let mut buckets: Vec<NaiveDateTime> =
        counts.values().flat_map(|b| b.keys().copied()).collect();
    buckets.sort();
    buckets.dedup();
    let Some(&first) = buckets.first() else {
        return Ok(CompletionSeries::default());
    };
    buckets.insert(0, first - step);

    let lines = counts
        .into_iter()
        .map(|(group, per_bucket)| {
            let mut total = 0;
            let cumulative = buckets
                .iter()
                .map(|b| {
                    total += per_bucket.get(b).copied().unwrap_or(0);
                    total
                })
                .collect();
            CompletionLine { group, cumulative }
        })
        .collect();

    Ok(CompletionSeries { buckets, lines })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 1, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn frame(rows: &[(NaiveDateTime, f64, &str)]) -> Frame {
        let mut frame = Frame::new(["date", "duration", "sample"]);
        for (date, duration, sample) in rows {
            frame
                .push_row(vec![
                    Value::Timestamp(*date),
                    Value::Number(*duration),
                    Value::Text(sample.to_string()),
                ])
                .unwrap();
        }
        frame
    }

    fn is_non_decreasing(values: &[u64]) -> bool {
        values.windows(2).all(|w| w[0] <= w[1])
    }

    #[test]
    fn test_ungrouped_series() {
        let frame = frame(&[
            (ts(10, 0, 0), 5.0, "A"),
            (ts(10, 0, 0), 5.4, "B"),
            (ts(10, 0, 0), 10.0, "A"),
        ]);
        let series = completion_series(&frame, None, BucketWidth::Second).unwrap();

        assert_eq!(
            series.buckets,
            vec![ts(10, 0, 4), ts(10, 0, 5), ts(10, 0, 10)]
        );
        assert_eq!(series.lines.len(), 1);
        assert_eq!(series.lines[0].group, None);
        assert_eq!(series.lines[0].cumulative, vec![0, 2, 3]);
    }

    #[test]
    fn test_ties_round_to_even() {
        let frame = frame(&[
            (ts(10, 0, 0), 0.5, "A"),
            (ts(10, 0, 0), 1.5, "A"),
            (ts(10, 0, 0), 2.5, "A"),
            (ts(10, 0, 0), 0.6, "A"),
        ]);
        let series = completion_series(&frame, None, BucketWidth::Second).unwrap();

        assert_eq!(
            series.buckets,
            vec![ts(9, 59, 59), ts(10, 0, 0), ts(10, 0, 1), ts(10, 0, 2)]
        );
        assert_eq!(series.lines[0].cumulative, vec![0, 1, 2, 4]);
    }

    #[test]
    fn test_round_half_even_minutes() {
        let step = BucketWidth::Minute.delta();
        assert_eq!(round_half_even(ts(10, 0, 30), step).unwrap(), ts(10, 0, 0));
        assert_eq!(round_half_even(ts(10, 1, 30), step).unwrap(), ts(10, 2, 0));
        assert_eq!(round_half_even(ts(10, 1, 29), step).unwrap(), ts(10, 1, 0));
        assert_eq!(round_half_even(ts(10, 1, 31), step).unwrap(), ts(10, 2, 0));
    }

    #[test]
    fn test_grouped_series() {
        let frame = frame(&[
            (ts(10, 0, 0), 60.0, "B"),
            (ts(10, 0, 0), 120.0, "A"),
            (ts(10, 0, 0), 180.0, "B"),
            (ts(10, 0, 0), 185.0, "A"),
        ]);
        let series = completion_series(&frame, Some("sample"), BucketWidth::Minute).unwrap();

        assert_eq!(
            series.buckets,
            vec![ts(10, 0, 0), ts(10, 1, 0), ts(10, 2, 0), ts(10, 3, 0)]
        );
        let groups: Vec<_> = series.lines.iter().map(|l| l.label()).collect();
        assert_eq!(groups, vec!["A", "B"]);
        assert_eq!(series.lines[0].cumulative, vec![0, 0, 1, 2]);
        assert_eq!(series.lines[1].cumulative, vec![0, 1, 1, 2]);
    }

    #[test]
    fn test_series_properties() {
        let rows: Vec<_> = (0..40)
            .map(|i| {
                let sample = if i % 3 == 0 { "A" } else { "B" };
                (ts(9, (i * 7) % 60, 0), (i * 37 % 500) as f64, sample)
            })
            .collect();
        let frame = frame(&rows);

        let all = completion_series(&frame, None, BucketWidth::Second).unwrap();
        assert!(is_non_decreasing(&all.lines[0].cumulative));
        assert_eq!(all.lines[0].total(), 40);
        assert_eq!(all.lines[0].cumulative[0], 0);

        let grouped = completion_series(&frame, Some("sample"), BucketWidth::Hour).unwrap();
        for line in &grouped.lines {
            assert!(is_non_decreasing(&line.cumulative));
        }
        let sum: u64 = grouped.lines.iter().map(CompletionLine::total).sum();
        assert_eq!(sum, 40);
    }

    #[test]
    fn test_empty_frame() {
        let frame = frame(&[]);
        let series = completion_series(&frame, None, BucketWidth::Second).unwrap();
        assert!(series.is_empty());
        assert!(series.lines.is_empty());
    }

    #[test]
    fn test_missing_duration() {
        let mut frame = frame(&[(ts(10, 0, 0), 5.0, "A")]);
        frame.map_column(1, |_| Value::Missing);
        assert!(matches!(
            completion_series(&frame, None, BucketWidth::Second),
            Err(CompletionError::InvalidCell {
                column: "duration",
                row: 0,
            })
        ));
    }

    #[test]
    fn test_to_frame() {
        let frame = frame(&[(ts(10, 0, 0), 5.0, "A")]);
        let series = completion_series(&frame, Some("sample"), BucketWidth::Second).unwrap();
        let table = series.to_frame().unwrap();
        assert_eq!(table.columns(), ["date_group", "A"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1][1], Value::Number(1.0));
    }

    #[test]
    fn test_bucket_width_display() {
        assert_eq!(BucketWidth::Minute.to_string(), "minute");
        assert_eq!(BucketWidth::Hour.delta(), TimeDelta::hours(1));
    }
}
