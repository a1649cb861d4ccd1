//! Cumulative job completions over time.

use crate::axis::padded_range;
use crate::palette::Palette;
use crate::{Figure, PlotError};
use chrono::{DateTime, NaiveDateTime};
use lsf_stats_summary::CompletionSeries;
use plotters::coord::Shift;
use plotters::prelude::*;

/// Number of dashes across the reference line.
const DASHES: usize = 40;

pub struct Completions<'a> {
    pub series: &'a CompletionSeries,
    pub group_column: Option<&'a str>,
    /// Horizontal reference line, e.g. the expected number of jobs
    pub max_job_count: Option<u64>,
    pub palette: &'a Palette,
}

/// Seconds since the epoch, used as the x coordinate.
pub fn epoch_seconds(ts: &NaiveDateTime) -> f64 {
    ts.and_utc().timestamp() as f64
}

/// Tick label for an x coordinate.
pub fn time_label(seconds: f64) -> String {
    DateTime::from_timestamp(seconds.round() as i64, 0)
        .map(|dt| dt.naive_utc().format("%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Segments of a dashed horizontal line at `y` across `x`.
pub fn dashes(x: &std::ops::Range<f64>, y: f64, count: usize) -> Vec<[(f64, f64); 2]> {
    let step = (x.end - x.start) / (2 * count) as f64;
    (0..count)
        .map(|i| {
            let x0 = x.start + (2 * i) as f64 * step;
            [(x0, y), (x0 + step, y)]
        })
        .collect()
}

impl Figure for Completions<'_> {
    const NAME: &'static str = "job_completions";
    const SIZE: (u32, u32) = (800, 600);

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), PlotError> {
        let xs: Vec<f64> = self.series.buckets.iter().map(epoch_seconds).collect();
        let x_range = padded_range(xs.iter().copied());
        let top = self
            .series
            .max_count()
            .max(self.max_job_count.unwrap_or(0))
            .max(1) as f64;

        let mut builder = ChartBuilder::on(root);
        builder
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(60);
        if let Some(column) = self.group_column {
            builder.caption(column.replace('\n', " "), ("sans-serif", 18));
        }
        let mut chart = builder.build_cartesian_2d(x_range.clone(), 0f64..top * 1.05)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Number of executed jobs")
            .x_labels(5)
            .x_label_formatter(&|v| time_label(*v))
            .y_label_formatter(&|v| format!("{:.0}", v))
            .draw()?;

        for (i, line) in self.series.lines.iter().enumerate() {
            let color = self.palette.series(i);
            let counts = line.cumulative.iter().map(|c| *c as f64);
            let points = xs.iter().copied().zip(counts);
            let series = chart.draw_series(LineSeries::new(points, color.stroke_width(2)))?;
            if self.group_column.is_some() {
                series
                    .label(line.label().replace('\n', " / "))
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
            }
        }

        if let Some(count) = self.max_job_count {
            let red = self.palette.reference;
            chart.draw_series(
                dashes(&x_range, count as f64, DASHES)
                    .into_iter()
                    .map(|segment| PathElement::new(segment.to_vec(), red.stroke_width(2))),
            )?;
        }

        if self.group_column.is_some() && !self.series.lines.is_empty() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(&self.palette.background.mix(0.8))
                .border_style(&self.palette.foreground)
                .draw()?;
        }

        Ok(())
    }
}
