//! Options controlling the summarize stage.

use crate::completions::BucketWidth;
use camino::Utf8PathBuf;
use std::fmt;

/// Default directory for plots and statistics.
pub const DEFAULT_OUTPUT_DIR: &str = "plots";

/// Image format of the rendered plots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOptions {
    /// Row filter applied after unit conversion.
    pub query: Option<String>,
    /// Columns whose combined values define groups.
    pub grouping_variables: Vec<String>,
    /// Split the `wildcards` column into one column per key.
    pub split_wildcards: bool,
    /// Reference line drawn on the completions plot.
    pub max_job_count: Option<u64>,
    pub output_dir: Utf8PathBuf,
    pub bucket: BucketWidth,
    pub format: ImageFormat,
    /// Write the reshaped table and completion series as CSV.
    pub dump: bool,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            query: None,
            grouping_variables: Vec::new(),
            split_wildcards: false,
            max_job_count: None,
            output_dir: Utf8PathBuf::from(DEFAULT_OUTPUT_DIR),
            bucket: BucketWidth::default(),
            format: ImageFormat::default(),
            dump: false,
        }
    }
}
