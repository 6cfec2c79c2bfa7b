//! Chart styling parameters.

use image::Rgba;
use std::path::PathBuf;

/// Default 8-color brand palette, reused cyclically past 8 series.
pub const DEFAULT_PALETTE: [[u8; 3]; 8] = [
    [26, 58, 92],    // deep navy
    [42, 111, 151],  // steel blue
    [58, 160, 135],  // teal
    [240, 177, 62],  // amber
    [224, 122, 63],  // burnt orange
    [164, 74, 63],   // brick
    [124, 98, 163],  // violet
    [110, 117, 124], // slate gray
];

/// Style parameters for chart rendering, all optional with fixed defaults.
///
/// # Examples
///
/// ```
/// use folio_charts::ChartStyle;
///
/// let style = ChartStyle::builder()
///     .title("Adoption by region".to_string())
///     .build()
///     .unwrap();
/// assert_eq!(*style.width(), 800);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    derive_getters::Getters,
    derive_builder::Builder,
    derive_setters::Setters,
)]
#[builder(default, setter(into, strip_option))]
#[setters(prefix = "with_", into, strip_option)]
pub struct ChartStyle {
    /// Chart title drawn above the plot area
    title: Option<String>,
    /// RGB palette; colors cycle when there are more series than entries
    palette: Vec<[u8; 3]>,
    /// Canvas width in pixels (sized for ~150 DPI embedding)
    width: u32,
    /// Canvas height in pixels
    height: u32,
    /// Label font size in pixels
    font_size: f32,
    /// Explicit font file to use for labels
    font_path: Option<PathBuf>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            title: None,
            palette: DEFAULT_PALETTE.to_vec(),
            width: 800,
            height: 500,
            font_size: 16.0,
            font_path: None,
        }
    }
}

impl ChartStyle {
    /// Builder entry point.
    pub fn builder() -> ChartStyleBuilder {
        ChartStyleBuilder::default()
    }

    /// Color for series `index`, cycling through the palette.
    pub fn color(&self, index: usize) -> Rgba<u8> {
        let palette = if self.palette.is_empty() {
            &DEFAULT_PALETTE[..]
        } else {
            &self.palette[..]
        };
        let [r, g, b] = palette[index % palette.len()];
        Rgba([r, g, b, 255])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_cycles_past_eight_series() {
        let style = ChartStyle::default();
        assert_eq!(style.color(0), style.color(8));
        assert_ne!(style.color(0), style.color(1));
    }
}
