//! Text placement
//!
//! The text is centered horizontally on a point. Vertically, the baseline
//! sits one cap height plus [`BASELINE_OFFSET`] above the requested Y.

use pdf_core::{to_points, FontMetrics};

/// Fixed upward shift of the baseline in points
pub const BASELINE_OFFSET: f64 = 7.5;

/// Baseline origin of the text in page space, with the measurements behind it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    /// Advance width of the text in points
    pub text_width: f64,
    /// Cap height in points
    pub text_height: f64,
}

/// Horizontal center to use; absent or negative means the page midpoint
pub fn effective_center_x(center_x: Option<f64>, page_width: f64) -> f64 {
    match center_x {
        Some(center_x) if center_x >= 0.0 => center_x,
        _ => page_width / 2.0,
    }
}

impl Placement {
    /// Compute the origin from metrics in 1000-unit glyph space
    pub fn from_metrics(
        center_x: Option<f64>,
        center_y: f64,
        page_width: f64,
        width_units: f64,
        cap_height_units: f64,
        font_size: f64,
    ) -> Self {
        let text_width = to_points(width_units, font_size);
        let text_height = to_points(cap_height_units, font_size);

        Self {
            x: effective_center_x(center_x, page_width) - text_width / 2.0,
            y: center_y + text_height + BASELINE_OFFSET,
            text_width,
            text_height,
        }
    }
}

/// Measure `text` with `font` and place it
///
/// Fails only when the font cannot measure the text.
pub fn compute_origin(
    center_x: Option<f64>,
    center_y: f64,
    page_width: f64,
    text: &str,
    font: &dyn FontMetrics,
    font_size: f64,
) -> pdf_core::Result<Placement> {
    let width_units = font.string_width(text)?;

    Ok(Placement::from_metrics(
        center_x,
        center_y,
        page_width,
        width_units,
        font.cap_height(),
        font_size,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_core::{PdfError, StandardFont};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_effective_center_x() {
        assert_eq!(effective_center_x(Some(-1.0), 600.0), 300.0);
        assert_eq!(effective_center_x(None, 612.0), 306.0);
        assert_eq!(effective_center_x(Some(0.0), 612.0), 0.0);
        assert_eq!(effective_center_x(Some(150.25), 612.0), 150.25);
    }

    #[test]
    fn test_from_metrics() {
        let placement = Placement::from_metrics(Some(400.0), 50.0, 612.0, 2000.0, 700.0, 10.0);

        assert_close(placement.text_width, 20.0);
        assert_close(placement.text_height, 7.0);
        assert_close(placement.x, 390.0);
        assert_close(placement.y, 50.0 + 7.0 + BASELINE_OFFSET);
    }

    #[test]
    fn test_helvetica_hello() {
        let placement = compute_origin(
            None,
            100.0,
            612.0,
            "Hello",
            &StandardFont::Helvetica,
            12.0,
        )
        .unwrap();

        // "Hello" is 2278 units wide, Helvetica caps are 718 units tall
        assert_close(placement.text_width, 27.336);
        assert_close(placement.x, 306.0 - 13.668);
        assert_close(placement.y, 100.0 + 8.616 + 7.5);
    }

    #[test]
    fn test_empty_text_sits_on_center() {
        let placement = compute_origin(
            Some(250.0),
            80.0,
            612.0,
            "",
            &StandardFont::TimesBold,
            20.0,
        )
        .unwrap();

        assert_eq!(placement.x, 250.0);
        assert_eq!(placement.text_width, 0.0);
        assert_close(placement.y, 80.0 + 13.52 + 7.5);
    }

    #[test]
    fn test_deterministic() {
        let place = || {
            compute_origin(
                Some(-1.0),
                333.3,
                841.89,
                "Dr. Åsa Ñúñez",
                &StandardFont::TimesItalic,
                17.0,
            )
            .unwrap()
        };

        assert_eq!(place(), place());
    }

    #[test]
    fn test_symbol_has_no_cap_height() {
        let placement =
            compute_origin(None, 10.0, 600.0, "abc", &StandardFont::Symbol, 12.0).unwrap();
        assert_close(placement.y, 10.0 + BASELINE_OFFSET);
    }

    #[test]
    fn test_unmeasurable_text() {
        let result = compute_origin(
            None,
            10.0,
            600.0,
            "สมชาย",
            &StandardFont::Courier,
            12.0,
        );
        assert!(matches!(result, Err(PdfError::UnencodableText { .. })));
    }
}
