//! Filler - coordinate-mapped field filling
//!
//! This crate provides:
//! - The mapping schema saved by the visual mapping editor
//! - Submission records and their display names
//! - The UI pixel to PDF point transform
//! - Per-field rendering of text and images
//! - Whole-document filling and ZIP packaging of many fills
//!
//! Nothing here touches the network or the filesystem. Images are gathered
//! up front into an [`AssetBundle`], so the same engine runs natively and in
//! the browser.
//!
//! # Example
//!
//! ```ignore
//! use filler::{AssetBundle, DocumentFiller, Mapping, Record};
//!
//! let mapping = Mapping::from_json(mapping_json)?;
//! let record = Record::from_json(r#"{"full_name": "Jane Doe"}"#)?;
//! let pdf = DocumentFiller::new().fill(&template, &record, &mapping, &AssetBundle::new())?;
//! ```

pub mod archive;
mod assets;
mod filler;
mod mapping;
pub mod naming;
mod record;
mod render;
mod transform;

pub use assets::{AssetBundle, AssetSource, StaticAssets};
pub use filler::{DocumentFiller, FillReport};
pub use mapping::{FieldKind, Mapping, MappingField, MappingRecord};
pub use record::{Record, DISPLAY_NAME_FIELD, SIGNATURE_FIELD};
pub use render::{FieldOutcome, FieldRenderer};
pub use transform::{resolve_page, ImageBox, PageTransform, TextAnchor};

use thiserror::Error;

/// Default font size for text fields, in points
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Default image box width, in authoring pixels
pub const DEFAULT_IMAGE_WIDTH: f64 = 120.0;

/// Default image box height, in authoring pixels
pub const DEFAULT_IMAGE_HEIGHT: f64 = 48.0;

/// Errors that abort a fill
#[derive(Debug, Error)]
pub enum FillError {
    #[error("Failed to parse template: {0}")]
    TemplateParse(String),

    #[error("Template has no pages")]
    EmptyTemplate,

    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_core::PdfError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A problem with one image field. Never aborts a fill.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldAssetError {
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("no image data for {url}")]
    Missing { url: String },

    #[error("failed to decode image from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Result type for fill operations
pub type Result<T> = std::result::Result<T, FillError>;
