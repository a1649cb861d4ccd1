//! Directory traversal and the gather pass.

use crate::record::JobRecord;
use crate::report::{ReportError, parse_report_file};
use crate::trace::parse_trace_file;
use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Extension of LSF job reports.
pub const REPORT_EXTENSION: &str = "out";

/// Extension of the paired Snakemake execution trace.
pub const TRACE_EXTENSION: &str = "err";

/// Errors that abort the whole gather pass.
#[derive(Error, Debug)]
pub enum GatherError {
    #[error("Log directory not found: {0}")]
    NotFound(Utf8PathBuf),
    #[error("Not a directory: {0}")]
    NotADirectory(Utf8PathBuf),
    #[error("Failed to walk log directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Errors that degrade a single job to a filename-only row.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("{path}: {source}")]
    Report {
        path: Utf8PathBuf,
        #[source]
        source: ReportError,
    },
    #[error("{path}: {source}")]
    Trace {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A job whose logs could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatherFailure {
    /// Report file name
    pub filename: String,
    /// Human-readable cause
    pub reason: String,
}

/// Diagnostics for a gather pass.
#[derive(Debug, Clone, Default)]
pub struct GatherSummary {
    /// Number of report files processed
    pub total: usize,
    /// Jobs that degraded to filename-only rows
    pub failures: Vec<GatherFailure>,
}

impl GatherSummary {
    /// Number of filename-only rows.
    pub fn degraded(&self) -> usize {
        self.failures.len()
    }

    /// Number of fully parsed rows.
    pub fn parsed(&self) -> usize {
        self.total - self.degraded()
    }
}

/// Result of a gather pass: one record per report plus diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Gathered {
    pub records: Vec<JobRecord>,
    pub summary: GatherSummary,
}

/// Path of the execution trace paired with a report.
pub fn trace_path_for(report: &Utf8Path) -> Utf8PathBuf {
    report.with_extension(TRACE_EXTENSION)
}

/// Recursively find all job reports below `root`.
///
/// Entries are visited in file-name order within each directory. Symbolic
/// links are followed.
pub fn discover_reports(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, GatherError> {
    if !root.exists() {
        return Err(GatherError::NotFound(root.to_owned()));
    }
    if !root.is_dir() {
        return Err(GatherError::NotADirectory(root.to_owned()));
    }

    let mut reports = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = match Utf8PathBuf::try_from(entry.into_path()) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Skipping non UTF-8 path {}", e.as_path().display());
                continue;
            }
        };

        if path.extension() == Some(REPORT_EXTENSION) {
            reports.push(path);
        }
    }

    tracing::debug!("Found {} job reports below {}", reports.len(), root);
    Ok(reports)
}

/// Parse one job from its report and paired trace.
pub fn gather_job(report: &Utf8Path) -> Result<JobRecord, JobError> {
    let filename = report.file_name().unwrap_or(report.as_str());

    let report_info = parse_report_file(report).map_err(|source| JobError::Report {
        path: report.to_owned(),
        source,
    })?;

    let trace = trace_path_for(report);
    let trace_info = parse_trace_file(&trace).map_err(|source| JobError::Trace {
        path: trace.clone(),
        source,
    })?;

    Ok(JobRecord::from_parts(filename, report_info, trace_info))
}

/// Gather a sequence of reports.
///
/// A job that fails to parse never aborts the pass: it is recorded as a
/// filename-only row and listed in the summary.
pub fn gather_reports<I, P>(reports: I) -> Gathered
where
    I: IntoIterator<Item = P>,
    P: AsRef<Utf8Path>,
{
    let mut gathered = Gathered::default();

    for report in reports {
        let report = report.as_ref();
        let filename = report.file_name().unwrap_or(report.as_str()).to_string();
        gathered.summary.total += 1;

        match gather_job(report) {
            Ok(record) => gathered.records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse job logs {}", e);
                gathered.summary.failures.push(GatherFailure {
                    filename: filename.clone(),
                    reason: e.to_string(),
                });
                gathered.records.push(JobRecord::filename_only(filename));
            }
        }
    }

    gathered
}

/// Discover and gather every job below `root`.
pub fn gather_dir(root: &Utf8Path) -> Result<Gathered, GatherError> {
    let reports = discover_reports(root)?;
    Ok(gather_reports(&reports))
}
