//! Font metrics shared by standard and embedded fonts

use crate::Result;

/// Units per em that all [`FontMetrics`] values are expressed in
pub const GLYPH_SPACE_UNITS: f64 = 1000.0;

/// Text measurement in 1000-unit em space
///
/// Multiply by `font_size / 1000` to get page-space points.
pub trait FontMetrics {
    /// Name used in diagnostics
    fn font_name(&self) -> &str;

    /// Total advance width of `text`
    fn string_width(&self, text: &str) -> Result<f64>;

    /// Distance from the baseline to the top of flat capital letters
    fn cap_height(&self) -> f64;

    /// Font bounding box as `[llx, lly, urx, ury]`
    fn font_bbox(&self) -> [f64; 4];
}

/// Scale a glyph-space length to points for the given font size
pub fn to_points(units: f64, font_size: f64) -> f64 {
    units / GLYPH_SPACE_UNITS * font_size
}
