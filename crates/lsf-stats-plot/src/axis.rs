//! Axis ranges, tick labels and histogram binning.

use std::ops::Range;

/// Formatters turning raw axis values into labels.
#[derive(Clone, Copy)]
pub struct AxisFormatters {
    /// Seconds to a human duration
    pub duration: fn(f64) -> String,
    /// Bytes to a human size
    pub size: fn(f64) -> String,
}

impl Default for AxisFormatters {
    fn default() -> Self {
        Self {
            duration: lsf_stats_parsers::natural_delta,
            size: lsf_stats_parsers::natural_size,
        }
    }
}

/// Range covering `values` with 5% padding on each side.
///
/// Degenerate or empty input yields a unit-width range.
pub fn padded_range<I: IntoIterator<Item = f64>>(values: I) -> Range<f64> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.into_iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }

    if min > max {
        return 0.0..1.0;
    }
    if min == max {
        return (min - 0.5)..(max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

/// Base-10 logarithms of the positive values.
pub fn log10_positive(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .filter(|v| **v > 0.0)
        .map(|v| v.log10())
        .collect()
}

/// Number of histogram bins for `n` values (Sturges' rule).
pub fn sturges_bins(n: usize) -> usize {
    if n == 0 {
        return 1;
    }
    (n as f64).log2().ceil() as usize + 1
}

/// Count values into `bins` equal-width bins over `range`.
///
/// The last bin is closed on the right; values outside the range are
/// ignored.
pub fn histogram(values: &[f64], range: &Range<f64>, bins: usize) -> Vec<u32> {
    let mut counts = vec![0; bins.max(1)];
    let width = (range.end - range.start) / counts.len() as f64;
    if width <= 0.0 {
        return counts;
    }
    let last = counts.len() - 1;
    for v in values {
        if *v < range.start || *v > range.end {
            continue;
        }
        let idx = (((v - range.start) / width) as usize).min(last);
        counts[idx] += 1;
    }
    counts
}

/// Label for a log10 axis position.
pub fn log_label(position: f64, format: fn(f64) -> String) -> String {
    format(10f64.powf(position))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_range() {
        let range = padded_range([0.0, 10.0]);
        assert!((range.start + 0.5).abs() < 1e-9);
        assert!((range.end - 10.5).abs() < 1e-9);

        assert_eq!(padded_range([3.0, 3.0]), 2.5..3.5);
        assert_eq!(padded_range(std::iter::empty()), 0.0..1.0);
        assert_eq!(padded_range([f64::NAN, 2.0]), 1.5..2.5);
    }

    #[test]
    fn test_log10_positive() {
        assert_eq!(log10_positive(&[0.0, 10.0, 1000.0, -5.0]), vec![1.0, 3.0]);
    }

    #[test]
    fn test_sturges_bins() {
        assert_eq!(sturges_bins(0), 1);
        assert_eq!(sturges_bins(1), 1);
        assert_eq!(sturges_bins(8), 4);
        assert_eq!(sturges_bins(1000), 11);
    }

    #[test]
    fn test_histogram() {
        let counts = histogram(&[0.0, 0.4, 0.5, 1.0, 2.0], &(0.0..1.0), 2);
        assert_eq!(counts, vec![2, 2]);
        assert_eq!(histogram(&[1.0], &(1.0..1.0), 3), vec![0, 0, 0]);
    }

    #[test]
    fn test_log_label() {
        let formatters = AxisFormatters::default();
        assert_eq!(log_label(2.0, formatters.duration), "a minute");
        assert_eq!(log_label(2.5e6_f64.log10(), formatters.size), "2.5 MB");
    }
}
