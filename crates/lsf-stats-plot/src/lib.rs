//! Plots for lsf-stats.
//!
//! Renders the reshaped job table into three figures: runtime and memory
//! histograms (`overview`), runtime against memory (`scatterplot`) and
//! cumulative completions over time (`job_completions`). Output is PNG or
//! SVG via plotters.

pub mod axis;
pub mod completions;
pub mod data;
pub mod overview;
pub mod palette;
pub mod scatter;

pub use axis::AxisFormatters;
pub use completions::Completions;
pub use data::{GroupData, group_data};
pub use overview::Overview;
pub use palette::Palette;
pub use scatter::Scatter;

use camino::{Utf8Path, Utf8PathBuf};
use lsf_stats_summary::{CompletionSeries, Frame, FrameError, ImageFormat};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::fs;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("Drawing error: {0}")]
    Drawing(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for PlotError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        PlotError::Drawing(err.to_string())
    }
}

/// A figure that can be drawn onto any plotters backend.
pub trait Figure {
    /// File stem of the saved figure.
    const NAME: &'static str;
    /// Pixel size.
    const SIZE: (u32, u32);

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), PlotError>;
}

/// Draw `figure` into `<output_dir>/<NAME>.<ext>`.
pub fn save<F: Figure>(
    figure: &F,
    output_dir: &Utf8Path,
    format: ImageFormat,
    palette: &Palette,
) -> Result<Utf8PathBuf, PlotError> {
    let path = output_dir.join(format!("{}.{}", F::NAME, format.extension()));
    match format {
        ImageFormat::Png => {
            let root = BitMapBackend::new(&path, F::SIZE).into_drawing_area();
            root.fill(&palette.background)?;
            figure.draw(&root)?;
            root.present()?;
        }
        ImageFormat::Svg => {
            let root = SVGBackend::new(&path, F::SIZE).into_drawing_area();
            root.fill(&palette.background)?;
            figure.draw(&root)?;
            root.present()?;
        }
    }
    tracing::debug!("Saved {}", path);
    Ok(path)
}

/// Everything the figures are drawn from.
pub struct PlotRequest<'a> {
    pub frame: &'a Frame,
    pub group_column: Option<&'a str>,
    pub completions: &'a CompletionSeries,
    pub max_job_count: Option<u64>,
    pub formatters: AxisFormatters,
}

/// Render all three figures into `output_dir`, creating it if needed.
///
/// Returns the written paths.
pub fn render_all(
    request: &PlotRequest<'_>,
    output_dir: &Utf8Path,
    format: ImageFormat,
) -> Result<Vec<Utf8PathBuf>, PlotError> {
    fs::create_dir_all(output_dir)?;
    let palette = Palette::default();
    let groups = group_data(request.frame, request.group_column)?;

    let overview = Overview {
        groups: &groups,
        group_column: request.group_column,
        duration_format: request.formatters.duration,
        size_format: request.formatters.size,
        palette: &palette,
    };
    let scatter = Scatter {
        groups: &groups,
        group_column: request.group_column,
        duration_format: request.formatters.duration,
        size_format: request.formatters.size,
        palette: &palette,
    };
    let completions = Completions {
        series: request.completions,
        group_column: request.group_column,
        max_job_count: request.max_job_count,
        palette: &palette,
    };

    let paths = vec![
        save(&overview, output_dir, format, &palette)?,
        save(&scatter, output_dir, format, &palette)?,
        save(&completions, output_dir, format, &palette)?,
    ];
    tracing::info!("Wrote {} {} plots to {}", paths.len(), format, output_dir);
    Ok(paths)
}
