//! The summarize pipeline, from gathered table to plot-ready data.

use crate::clean::{convert_units, drop_incomplete};
use crate::completions::{CompletionError, CompletionSeries, completion_series};
use crate::describe::{ColumnSummary, describe};
use crate::frame::{Frame, FrameError};
use crate::grouping::{GroupingError, apply_grouping};
use crate::options::SummaryOptions;
use crate::query::{Query, QueryError};
use crate::wildcards::{WildcardError, split_wildcards};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("Cannot split wildcards: {0}")]
    Wildcards(#[from] WildcardError),
    #[error("Invalid query: {0}")]
    Query(#[from] QueryError),
    #[error(transparent)]
    Grouping(#[from] GroupingError),
    #[error("Cannot compute job completions: {0}")]
    Completions(#[from] CompletionError),
}

/// Reshaped table plus everything derived from it.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub frame: Frame,
    /// Name of the group column, when grouping variables were given.
    pub group_column: Option<String>,
    pub completions: CompletionSeries,
    pub statistics: Vec<ColumnSummary>,
}

/// Run the pipeline: drop incomplete rows, convert units, split
/// wildcards, filter, group, then derive completions and statistics.
pub fn prepare(mut frame: Frame, options: &SummaryOptions) -> Result<Prepared, SummaryError> {
    // Parse up front so a bad query fails before any work
    let query = options.query.as_deref().map(Query::parse).transpose()?;

    let total = frame.len();
    let dropped = drop_incomplete(&mut frame);
    tracing::info!(
        "Loaded {} jobs, {} with incomplete records dropped",
        total,
        dropped
    );

    convert_units(&mut frame)?;

    if options.split_wildcards {
        let added = split_wildcards(&mut frame)?;
        tracing::info!("Split wildcards into {} columns", added.len());
    }

    if let Some(query) = &query {
        let removed = query.filter(&mut frame)?;
        tracing::info!(
            "Query {:?} kept {} jobs ({} removed)",
            query.source(),
            frame.len(),
            removed
        );
    }

    let group_column = apply_grouping(&mut frame, &options.grouping_variables)?;
    if let Some(column) = &group_column {
        tracing::info!("Grouping {} jobs by {:?}", frame.len(), column);
    }

    let completions = completion_series(&frame, group_column.as_deref(), options.bucket)?;
    tracing::debug!("Counted completions per {}", options.bucket);
    let statistics = describe(&frame);

    Ok(Prepared {
        frame,
        group_column,
        completions,
        statistics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
filename,date,successful,duration,avg_memory,max_memory,note,rules,wildcards\n\
a.out,2021-01-14 10:00:00,true,60,100,200,ok,align,\"sample=A, rep=1\"\n\
b.out,2021-01-14 10:00:00,true,120,50,80,ok,align,\"sample=B, rep=1\"\n\
c.out,2021-01-14 10:05:00,false,600,10,20,ok,count,\"sample=A, rep=2\"\n\
d.out,,,,,,,,\n";

    fn frame() -> Frame {
        Frame::from_csv_reader(TABLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let prepared = prepare(frame(), &SummaryOptions::default()).unwrap();
        assert_eq!(prepared.frame.len(), 3);
        assert_eq!(prepared.group_column, None);
        assert_eq!(prepared.completions.lines.len(), 1);
        assert_eq!(prepared.completions.lines[0].total(), 3);
        assert!(prepared.frame.has_column("duration_nat"));
    }

    #[test]
    fn test_split_query_and_group() {
        let options = SummaryOptions {
            split_wildcards: true,
            query: Some("successful and avg_memory > 1e7".into()),
            grouping_variables: vec!["sample".into(), "rep".into()],
            ..Default::default()
        };
        let prepared = prepare(frame(), &options).unwrap();

        // 'c.out' fails the query; memory is in bytes by then
        assert_eq!(prepared.frame.len(), 2);
        assert_eq!(prepared.group_column.as_deref(), Some("sample, rep"));
        let series = &prepared.completions;
        let labels: Vec<_> = series.lines.iter().map(|l| l.label()).collect();
        assert_eq!(labels, vec!["A\n1", "B\n1"]);
    }

    #[test]
    fn test_bad_query_fails_early() {
        let options = SummaryOptions {
            query: Some("duration >".into()),
            ..Default::default()
        };
        assert!(matches!(
            prepare(frame(), &options),
            Err(SummaryError::Query(_))
        ));
    }

    #[test]
    fn test_unknown_grouping_variable() {
        let options = SummaryOptions {
            grouping_variables: vec!["sample".into()],
            ..Default::default()
        };
        assert!(matches!(
            prepare(frame(), &options),
            Err(SummaryError::Grouping(GroupingError::UnknownColumn(_)))
        ));
    }
}
