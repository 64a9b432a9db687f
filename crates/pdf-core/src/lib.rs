//! PDF Core - Low-level PDF manipulation
//!
//! This crate provides functionality for:
//! - Opening PDF documents and serializing them back to bytes
//! - Registering one standard base font per document
//! - Inserting text at specific coordinates
//! - Inserting images (JPEG, PNG)
//! - Reading back drawn text and images from a saved document
//!
//! All drawing coordinates are PDF points with a bottom-left origin.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Color, PdfDocument};
//!
//! let mut doc = PdfDocument::open("template.pdf")?;
//! doc.use_base_font();
//! doc.insert_text("Hello, World!", 1, 100.0, 700.0, 12.0, Color::black())?;
//! let bytes = doc.to_bytes()?;
//! ```

mod document;
mod font;
mod image;
pub mod inspect;
mod text;

pub use document::{Color, PageSize, PdfDocument};
pub use font::{encode_win_ansi, BaseFont};
pub use image::ImageXObject;
pub use text::{generate_text_operators, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("No base font registered")]
    FontNotSet,

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Format a number for a content stream.
///
/// Rounds to four decimals and drops trailing zeros so that the same
/// coordinates always produce the same operator text.
pub fn fmt_num(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    // avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let mut s = format!("{rounded:.4}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}
