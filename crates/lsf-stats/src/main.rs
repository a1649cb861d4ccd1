//! lsf-stats - summarize LSF job resource usage from log files.

use camino::Utf8Path;
use clap::Parser;
use indicatif::{ProgressBar, ProgressIterator, ProgressStyle};
use lsf_stats_cli::{Args, Command, GatherArgs, SummarizeArgs};
use lsf_stats_core::{discover_reports, gather_reports, write_records};
use lsf_stats_plot::{AxisFormatters, PlotRequest, render_all};
use lsf_stats_summary::{Frame, dump_intermediate, prepare, render_statistics, write_statistics};
use miette::{IntoDiagnostic, Result, miette};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Gather(gather_args) => gather(&gather_args),
        Command::Summarize(summarize_args) => summarize(&summarize_args),
    }
}

/// Parse every job below the log directory into one table.
fn gather(args: &GatherArgs) -> Result<()> {
    let reports = discover_reports(&args.directory).into_diagnostic()?;
    tracing::info!("Gathering {} jobs from {}", reports.len(), args.directory);

    let pb = ProgressBar::new(reports.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .into_diagnostic()?
            .progress_chars("=> "),
    );
    let gathered = gather_reports(reports.iter().progress_with(pb.clone()));
    pb.finish_and_clear();

    write_records(&args.output, &gathered.records).into_diagnostic()?;

    let summary = &gathered.summary;
    if summary.degraded() > 0 {
        tracing::warn!(
            "{} of {} jobs could not be parsed and only carry their file name",
            summary.degraded(),
            summary.total
        );
    }
    tracing::info!(
        "Wrote {} jobs ({} parsed) to {}",
        summary.total,
        summary.parsed(),
        args.output
    );
    Ok(())
}

/// Reshape the gathered table, print statistics and render plots.
fn summarize(args: &SummarizeArgs) -> Result<()> {
    if !args.filename.is_file() {
        return Err(miette!("Input table not found: {}", args.filename));
    }
    let options = args.options();

    let frame = Frame::from_csv_path(&args.filename).into_diagnostic()?;
    let prepared = prepare(frame, &options).into_diagnostic()?;

    print!("{}", render_statistics(&prepared.statistics));
    write_statistics(&options.output_dir, &prepared.statistics).into_diagnostic()?;

    let request = PlotRequest {
        frame: &prepared.frame,
        group_column: prepared.group_column.as_deref(),
        completions: &prepared.completions,
        max_job_count: options.max_job_count,
        formatters: AxisFormatters::default(),
    };
    render_all(&request, &options.output_dir, options.format).into_diagnostic()?;

    if options.dump {
        let [table, completions] = dump_intermediate(
            &options.output_dir,
            &prepared.frame,
            &prepared.completions,
        )
        .into_diagnostic()?;
        print_dump_hint(&table, &completions);
    }

    Ok(())
}

fn print_dump_hint(table: &Utf8Path, completions: &Utf8Path) {
    println!();
    println!("Reshaped table:     {}", table);
    println!("Completion series:  {}", completions);
}
