//! CLI argument parsing for lsf-stats.

use camino::Utf8PathBuf;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use lsf_stats_summary::{BucketWidth, ImageFormat, SummaryOptions};

#[derive(Parser, Debug)]
#[command(name = "lsf-stats")]
#[command(version)]
#[command(about = "Summarize LSF job properties by parsing log files")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Aggregate information from log files into a single table
    Gather(GatherArgs),
    /// Summarize and visualize aggregated information
    Summarize(SummarizeArgs),
}

#[derive(ClapArgs, Debug)]
pub struct GatherArgs {
    /// Directory searched recursively for `.out` job reports
    pub directory: Utf8PathBuf,

    /// File to store aggregated information in
    #[arg(short, long, default_value = "log_statistics.csv")]
    pub output: Utf8PathBuf,
}

#[derive(ClapArgs, Debug)]
pub struct SummarizeArgs {
    /// Table written by `gather`
    pub filename: Utf8PathBuf,

    /// Indicate this maximum job count in plots
    #[arg(long)]
    pub max_job_count: Option<u64>,

    /// Split wildcards into individual table columns
    #[arg(long)]
    pub split_wildcards: bool,

    /// Stratify plots by this column (can be used multiple times)
    #[arg(long = "grouping-variable")]
    pub grouping_variables: Vec<String>,

    /// Query to subset the table before summarizing
    #[arg(short, long)]
    pub query: Option<String>,

    /// Directory to save plots to
    #[arg(short, long, default_value = "plots/")]
    pub output: Utf8PathBuf,

    /// Also write the reshaped table and completion series as CSV
    #[arg(long)]
    pub interactive: bool,

    /// Time bucket for counting job completions
    #[arg(long, value_enum, default_value_t = Bucket::Second)]
    pub bucket: Bucket,

    /// Image format of the plots
    #[arg(long, value_enum, default_value_t = Format::Png)]
    pub format: Format,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Second,
    Minute,
    Hour,
}

impl From<Bucket> for BucketWidth {
    fn from(bucket: Bucket) -> Self {
        match bucket {
            Bucket::Second => BucketWidth::Second,
            Bucket::Minute => BucketWidth::Minute,
            Bucket::Hour => BucketWidth::Hour,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Png,
    Svg,
}

impl From<Format> for ImageFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => ImageFormat::Png,
            Format::Svg => ImageFormat::Svg,
        }
    }
}

impl SummarizeArgs {
    pub fn options(&self) -> SummaryOptions {
        SummaryOptions {
            query: self.query.clone(),
            grouping_variables: self.grouping_variables.clone(),
            split_wildcards: self.split_wildcards,
            max_job_count: self.max_job_count,
            output_dir: self.output.clone(),
            bucket: self.bucket.into(),
            format: self.format.into(),
            dump: self.interactive,
        }
    }
}
