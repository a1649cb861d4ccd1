//! LSF job log parsing for lsf-stats.
//!
//! This crate handles the gather stage: parsing `.out` job reports and
//! their paired `.err` execution traces into one [`JobRecord`] per job,
//! and persisting those records as a CSV table.

pub mod gather;
pub mod record;
pub mod report;
pub mod table;
pub mod trace;

pub use gather::{
    GatherError, GatherFailure, GatherSummary, Gathered, JobError, REPORT_EXTENSION,
    TRACE_EXTENSION, discover_reports, gather_dir, gather_job, gather_reports, trace_path_for,
};
pub use record::{COLUMNS, JobRecord};
pub use report::{ReportError, ReportInfo, ResourceUsage, parse_report, parse_report_file};
pub use table::{TableError, read_records, read_records_from, write_records, write_records_to};
pub use trace::{TraceInfo, parse_trace, parse_trace_file};
