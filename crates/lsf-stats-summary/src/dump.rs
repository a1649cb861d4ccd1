use crate::completions::CompletionSeries;
use crate::describe::ColumnSummary;
use crate::frame::{Frame, FrameError};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{self, File};
use std::io::BufWriter;
use thiserror::Error;

/// File name of the statistics written next to the plots.
pub const STATISTICS_FILE: &str = "statistics.json";

/// File name of the reshaped table.
pub const SUMMARY_TABLE_FILE: &str = "summary_table.csv";

/// File name of the cumulative completion series.
pub const COMPLETIONS_FILE: &str = "job_completions.csv";

#[derive(Error, Debug)]
pub enum DumpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Save column statistics as pretty JSON.
///
/// Creates the output directory if needed.
pub fn write_statistics(
    output_dir: &Utf8Path,
    statistics: &[ColumnSummary],
) -> Result<Utf8PathBuf, DumpError> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(STATISTICS_FILE);
    let content = serde_json::to_string_pretty(statistics)?;
    fs::write(&path, content)?;
    Ok(path)
}

/// Write the reshaped table and completion series as CSV for inspection
/// outside this tool.
///
/// Returns the paths written, table first.
pub fn dump_intermediate(
    output_dir: &Utf8Path,
    frame: &Frame,
    completions: &CompletionSeries,
) -> Result<[Utf8PathBuf; 2], DumpError> {
    fs::create_dir_all(output_dir)?;

    let table_path = output_dir.join(SUMMARY_TABLE_FILE);
    frame.write_csv(BufWriter::new(File::create(&table_path)?))?;

    let completions_path = output_dir.join(COMPLETIONS_FILE);
    completions
        .to_frame()?
        .write_csv(BufWriter::new(File::create(&completions_path)?))?;

    tracing::info!("Wrote {} and {}", table_path, completions_path);
    Ok([table_path, completions_path])
}
