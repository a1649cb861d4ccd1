//! Plot colors.

use plotters::style::RGBColor;

pub struct Palette {
    pub background: RGBColor,
    pub foreground: RGBColor,
    pub reference: RGBColor,
    series: Vec<RGBColor>,
}

impl Palette {
    /// White background with the "tab10" categorical colors.
    pub fn light() -> Self {
        Self {
            background: RGBColor(255, 255, 255),
            foreground: RGBColor(0, 0, 0),
            reference: RGBColor(214, 39, 40),
            series: vec![
                RGBColor(31, 119, 180),
                RGBColor(255, 127, 14),
                RGBColor(44, 160, 44),
                RGBColor(148, 103, 189),
                RGBColor(140, 86, 75),
                RGBColor(227, 119, 194),
                RGBColor(127, 127, 127),
                RGBColor(188, 189, 34),
                RGBColor(23, 190, 207),
            ],
        }
    }

    /// Color of the `index`-th group, cycling when groups outnumber colors.
    pub fn series(&self, index: usize) -> RGBColor {
        self.series[index % self.series.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_cycles() {
        let palette = Palette::light();
        assert_eq!(palette.series(0), palette.series(9));
        assert_ne!(palette.series(0), palette.series(1));
        // Red is reserved for the reference line
        assert!((0..9).all(|i| palette.series(i) != palette.reference));
    }
}
