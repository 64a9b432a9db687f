//! UI pixel space to PDF point space
//!
//! The editor measures from the top-left of the rendered page; PDF draws
//! from the bottom-left. Horizontal positions only scale. Vertical positions
//! scale and flip, and the flip needs the height of whatever is drawn so the
//! element's top lands where it was dropped.

use crate::mapping::Mapping;
use pdf_core::PageSize;

/// Pick the page a field is drawn on (0-based).
///
/// Anything outside `[0, page_count)` falls back to the first page.
pub fn resolve_page(page: Option<i64>, page_count: usize) -> usize {
    match page {
        Some(p) if p >= 0 && (p as u64) < page_count as u64 => p as usize,
        _ => 0,
    }
}

/// Bottom-left origin of a text baseline, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextAnchor {
    pub x: f64,
    pub y: f64,
}

/// Image box in points: bottom-left corner plus size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Transform for one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageTransform {
    pub page_width: f64,
    pub page_height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl PageTransform {
    /// Build the transform for a page.
    ///
    /// Missing authoring dimensions mean the mapping was authored at the
    /// page's own size.
    pub fn new(page: PageSize, ui_width: Option<f64>, ui_height: Option<f64>) -> Self {
        let ui_width = ui_width.filter(|w| *w > 0.0).unwrap_or(page.width);
        let ui_height = ui_height.filter(|h| *h > 0.0).unwrap_or(page.height);

        Self {
            page_width: page.width,
            page_height: page.height,
            scale_x: ratio(page.width, ui_width),
            scale_y: ratio(page.height, ui_height),
        }
    }

    /// Transform for a page using a mapping's authoring dimensions
    pub fn for_mapping(page: PageSize, mapping: &Mapping) -> Self {
        Self::new(page, mapping.ui_width, mapping.ui_height)
    }

    /// Horizontal pixel position to points
    pub fn x(&self, x: f64) -> f64 {
        x * self.scale_x
    }

    /// Flip a top-edge pixel position to the bottom edge of an element
    /// `height_pt` points tall
    pub fn flip_y(&self, y: f64, height_pt: f64) -> f64 {
        self.page_height - y * self.scale_y - height_pt
    }

    /// Text baseline origin. The font size stands in for the glyph height.
    pub fn text_anchor(&self, x: f64, y: f64, font_size: f64) -> TextAnchor {
        TextAnchor {
            x: self.x(x),
            y: self.flip_y(y, font_size),
        }
    }

    /// Image box from a pixel-space box
    pub fn image_box(&self, x: f64, y: f64, width: f64, height: f64) -> ImageBox {
        let height_pt = height * self.scale_y;
        ImageBox {
            x: self.x(x),
            y: self.flip_y(y, height_pt),
            width: width * self.scale_x,
            height: height_pt,
        }
    }
}

// a zero-sized page would otherwise give NaN scales
fn ratio(page: f64, ui: f64) -> f64 {
    if ui > 0.0 && page.is_finite() {
        page / ui
    } else {
        1.0
    }
}
