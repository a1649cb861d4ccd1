//! Summarize stage for lsf-stats.
//!
//! Loads a gathered job table into a [`Frame`], cleans and reshapes it
//! (unit conversion, wildcard columns, query filtering, grouping) and
//! derives the cumulative job-completion series and descriptive
//! statistics used by the plots.

pub mod clean;
pub mod completions;
pub mod describe;
pub mod dump;
pub mod frame;
pub mod grouping;
pub mod options;
pub mod pipeline;
pub mod query;
pub mod wildcards;

pub use completions::{
    BucketWidth, CompletionError, CompletionLine, CompletionSeries, completion_series,
};
pub use describe::{ColumnSummary, describe, render_statistics};
pub use dump::{DumpError, dump_intermediate, write_statistics};
pub use frame::{Frame, FrameError, Value};
pub use grouping::{GroupingError, apply_grouping};
pub use options::{ImageFormat, SummaryOptions};
pub use pipeline::{Prepared, SummaryError, prepare};
pub use query::{Query, QueryError};
pub use wildcards::{WildcardError, split_wildcards};
