//! Text rendering utilities

use crate::document::Color;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Text color (RGB)
    pub color: Color,
}

/// Generate PDF operators for text insertion
///
/// Creates a self-contained text object (BT ... ET) that sets colour, font
/// and size, moves to the baseline origin and shows the string.
///
/// # Arguments
/// * `text_hex` - Hex-encoded text (e.g., "<48656C6C6F>")
/// * `x` - X coordinate of the baseline origin in points
/// * `y` - Y coordinate of the baseline origin in points
/// * `ctx` - Text rendering context
///
/// # Returns
/// Vector of bytes containing the PDF operators
pub fn generate_text_operators(text_hex: &str, x: f64, y: f64, ctx: &TextRenderContext) -> Vec<u8> {
    let mut ops = String::new();

    ops.push_str("BT\n");

    // Set text color (rg operator for non-stroking color)
    ops.push_str(&format!(
        "{} {} {} rg\n",
        ctx.color.r, ctx.color.g, ctx.color.b
    ));

    // Set font and size: /F1 12 Tf
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, ctx.font_size));

    // Move to position: x y Td
    ops.push_str(&format!("{x} {y} Td\n"));

    // Show text: <hex> Tj
    ops.push_str(&format!("{text_hex} Tj\n"));

    ops.push_str("ET\n");

    ops.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(font_name: &str, font_size: f32) -> TextRenderContext {
        TextRenderContext {
            font_name: font_name.to_string(),
            font_size,
            color: Color::black(),
        }
    }

    #[test]
    fn test_generate_text_operators() {
        let ctx = context("F1", 12.0);

        let ops = generate_text_operators("<48656C6C6F>", 100.0, 700.0, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert_eq!(
            ops_str,
            "BT\n0 0 0 rg\n/F1 12 Tf\n100 700 Td\n<48656C6C6F> Tj\nET\n"
        );
    }

    #[test]
    fn test_generate_text_operators_fractional_position() {
        let ctx = context("F2", 14.0);

        let ops = generate_text_operators("<54>", 292.108, 116.116, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("/F2 14 Tf"));
        assert!(ops_str.contains("292.108 116.116 Td"));
    }

    #[test]
    fn test_generate_text_operators_empty_text() {
        let ctx = context("F1", 12.0);

        let ops = generate_text_operators("<>", 100.0, 700.0, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("BT"));
        assert!(ops_str.contains("<> Tj"));
        assert!(ops_str.contains("ET"));
    }

    #[test]
    fn test_generate_text_operators_large_font() {
        let ctx = context("F1", 72.0);

        let ops = generate_text_operators("<41>", 100.0, 700.0, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("/F1 72 Tf"));
    }

    #[test]
    fn test_generate_text_operators_with_color() {
        let ctx = TextRenderContext {
            font_name: "F1".to_string(),
            font_size: 12.0,
            color: Color::red(),
        };

        let ops = generate_text_operators("<41>", 100.0, 700.0, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("1 0 0 rg"));
    }
}
