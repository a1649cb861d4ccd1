//! Runtime versus average memory, one color per group.

use crate::axis::padded_range;
use crate::data::GroupData;
use crate::palette::Palette;
use crate::{Figure, PlotError};
use plotters::coord::Shift;
use plotters::prelude::*;

pub struct Scatter<'a> {
    pub groups: &'a [GroupData],
    pub group_column: Option<&'a str>,
    pub duration_format: fn(f64) -> String,
    pub size_format: fn(f64) -> String,
    pub palette: &'a Palette,
}

impl Figure for Scatter<'_> {
    const NAME: &'static str = "scatterplot";
    const SIZE: (u32, u32) = (800, 600);

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), PlotError> {
        let (durations, memory): (Vec<f64>, Vec<f64>) =
            self.groups.iter().flat_map(|g| g.points()).unzip();
        let x_range = padded_range(durations);
        let y_range = padded_range(memory);

        let mut builder = ChartBuilder::on(root);
        builder
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(80);
        if let Some(column) = self.group_column {
            builder.caption(column.replace('\n', " "), ("sans-serif", 18));
        }
        let mut chart = builder.build_cartesian_2d(x_range, y_range)?;

        let duration_format = self.duration_format;
        let size_format = self.size_format;
        chart
            .configure_mesh()
            .x_desc("Run time")
            .y_desc("Average Memory")
            .x_labels(6)
            .x_label_formatter(&|v| duration_format(*v))
            .y_label_formatter(&|v| size_format(*v))
            .draw()?;

        // Small markers once the plot gets crowded
        let total: usize = self.groups.iter().map(|g| g.duration.len()).sum();
        let radius = if total > 15_000 { 1 } else { 3 };

        for (i, group) in self.groups.iter().enumerate() {
            let color = self.palette.series(i);
            let series = chart.draw_series(
                group
                    .points()
                    .map(|point| Circle::new(point, radius, color.mix(0.7).filled())),
            )?;
            if self.group_column.is_some() {
                series
                    .label(group.legend())
                    .legend(move |(x, y)| Circle::new((x + 6, y), 4, color.filled()));
            }
        }

        if self.group_column.is_some() && !self.groups.is_empty() {
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
