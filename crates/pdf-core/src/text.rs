//! Text rendering utilities

use crate::document::Color;
use crate::fmt_num;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "FF1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f64,
    /// Text color (RGB)
    pub color: Color,
}

/// Generate PDF operators for text insertion
///
/// Creates the PDF text operators (BT, rg, Tf, Td, Tj, ET) to render
/// left-aligned text with its baseline starting at `(x, y)`.
///
/// # Arguments
/// * `text_hex` - Hex-encoded text (e.g., "<4A616E65>")
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Y coordinate in points (PDF coordinates, from bottom)
/// * `ctx` - Text rendering context
///
/// # Returns
/// Vector of bytes containing the PDF operators
pub fn generate_text_operators(text_hex: &str, x: f64, y: f64, ctx: &TextRenderContext) -> Vec<u8> {
    let mut ops = String::new();

    ops.push_str("BT\n");

    // Non-stroking fill color
    ops.push_str(&format!(
        "{} {} {} rg\n",
        fmt_num(ctx.color.r as f64),
        fmt_num(ctx.color.g as f64),
        fmt_num(ctx.color.b as f64)
    ));

    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, fmt_num(ctx.font_size)));
    ops.push_str(&format!("{} {} Td\n", fmt_num(x), fmt_num(y)));
    ops.push_str(&format!("{text_hex} Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_text_operators() {
        let ctx = TextRenderContext {
            font_name: "FF1".to_string(),
            font_size: 12.0,
            color: Color::black(),
        };

        let ops = generate_text_operators("<4A616E65>", 51.0, 681.0, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.starts_with("BT\n"));
        assert!(ops_str.contains("0 0 0 rg"));
        assert!(ops_str.contains("/FF1 12 Tf"));
        assert!(ops_str.contains("51 681 Td"));
        assert!(ops_str.contains("<4A616E65> Tj"));
        assert!(ops_str.ends_with("ET\n"));
    }

    #[test]
    fn test_generate_text_operators_fractional() {
        let ctx = TextRenderContext {
            font_name: "FF2".to_string(),
            font_size: 10.5,
            color: Color::rgb(1.0, 0.0, 0.0),
        };

        let ops = generate_text_operators("<41>", 12.25, 700.125, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("1 0 0 rg"));
        assert!(ops_str.contains("/FF2 10.5 Tf"));
        assert!(ops_str.contains("12.25 700.125 Td"));
    }
}
