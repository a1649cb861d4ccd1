//! Log-scaled runtime and memory histograms, side by side.

use crate::axis::{histogram, log10_positive, log_label, padded_range, sturges_bins};
use crate::data::GroupData;
use crate::palette::Palette;
use crate::{Figure, PlotError};
use plotters::coord::Shift;
use plotters::prelude::*;

pub struct Overview<'a> {
    pub groups: &'a [GroupData],
    pub group_column: Option<&'a str>,
    pub duration_format: fn(f64) -> String,
    pub size_format: fn(f64) -> String,
    pub palette: &'a Palette,
}

/// One histogram layer: legend text and log10 values.
struct Layer {
    legend: String,
    values: Vec<f64>,
}

impl Figure for Overview<'_> {
    const NAME: &'static str = "overview";
    const SIZE: (u32, u32) = (1600, 600);

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), PlotError> {
        let panels = root.split_evenly((1, 2));

        let durations: Vec<Layer> = self
            .groups
            .iter()
            .map(|g| Layer {
                legend: g.legend(),
                values: log10_positive(&g.duration),
            })
            .collect();
        self.panel(&panels[0], "Job Runtime", &durations, self.duration_format)?;

        let memory: Vec<Layer> = self
            .groups
            .iter()
            .map(|g| Layer {
                legend: g.legend(),
                values: log10_positive(&g.avg_memory),
            })
            .collect();
        let title = "Job Average Memory Requirements";
        self.panel(&panels[1], title, &memory, self.size_format)?;

        Ok(())
    }
}

impl Overview<'_> {
    fn panel<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        x_desc: &str,
        layers: &[Layer],
        format: fn(f64) -> String,
    ) -> Result<(), PlotError> {
        // Shared bin edges so layers line up
        let range = padded_range(layers.iter().flat_map(|l| l.values.iter().copied()));
        let total: usize = layers.iter().map(|l| l.values.len()).sum();
        let bins = sturges_bins(total);
        let width = (range.end - range.start) / bins as f64;

        let counts: Vec<Vec<u32>> = layers
            .iter()
            .map(|l| histogram(&l.values, &range, bins))
            .collect();
        let max_count = counts.iter().flatten().copied().max().unwrap_or(0).max(1);

        let mut chart = ChartBuilder::on(area)
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(range.clone(), 0f64..(f64::from(max_count) * 1.05))?;

        chart
            .configure_mesh()
            .x_desc(x_desc)
            .y_desc("Count")
            .x_labels(6)
            .x_label_formatter(&|v| log_label(*v, format))
            .y_label_formatter(&|v| format!("{:.0}", v))
            .draw()?;

        for (i, (layer, counts)) in layers.iter().zip(&counts).enumerate() {
            let color = self.palette.series(i);
            let bars = counts
                .iter()
                .enumerate()
                .filter(|(_, c)| **c > 0)
                .map(|(bin, c)| {
                    let x0 = range.start + bin as f64 * width;
                    let top = (x0 + width, f64::from(*c));
                    Rectangle::new([(x0, 0.0), top], color.mix(0.5).filled())
                });
            let series = chart.draw_series(bars)?;
            if self.group_column.is_some() {
                series
                    .label(layer.legend.as_str())
                    .legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.mix(0.5).filled())
                    });
            }
        }

        if let Some(column) = self.group_column.filter(|_| !layers.is_empty()) {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(&self.palette.background.mix(0.8))
                .border_style(&self.palette.foreground)
                .draw()?;
            tracing::debug!("Overview histograms grouped by {:?}", column);
        }

        Ok(())
    }
}
