//! Drawing one mapped field

use crate::assets::AssetBundle;
use crate::mapping::{FieldKind, MappingField};
use crate::record::Record;
use crate::transform::PageTransform;
use crate::{FieldAssetError, Result, DEFAULT_FONT_SIZE};
use pdf_core::{Color, PdfDocument};

/// What happened to a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    /// Text was drawn
    Text,
    /// An image was drawn
    Image,
    /// The record has no value for the field
    Empty,
    /// The image could not be used
    Skipped(FieldAssetError),
}

/// Draws fields onto one open document
pub struct FieldRenderer<'a> {
    doc: &'a mut PdfDocument,
    assets: &'a AssetBundle,
    color: Color,
}

impl<'a> FieldRenderer<'a> {
    pub fn new(doc: &'a mut PdfDocument, assets: &'a AssetBundle) -> Self {
        Self {
            doc,
            assets,
            color: Color::black(),
        }
    }

    /// Draw `field` from `record` on `page` (0-based)
    ///
    /// Only document errors are returned. A missing value or an unusable
    /// image is reported through the outcome.
    pub fn render(
        &mut self,
        field: &MappingField,
        record: &Record,
        page: usize,
        transform: &PageTransform,
    ) -> Result<FieldOutcome> {
        match field.kind {
            FieldKind::Text { font_size } => {
                self.draw_text(field, record, page, transform, font_size)
            }
            FieldKind::Image { .. } if !field.draws_image() => {
                self.draw_text(field, record, page, transform, DEFAULT_FONT_SIZE)
            }
            FieldKind::Image { width, height } => {
                let Some(url) = record.url(&field.name) else {
                    return Ok(FieldOutcome::Empty);
                };

                let bytes = match self.assets.get(url) {
                    Ok(bytes) => bytes,
                    Err(err) => return Ok(skip(&field.name, err)),
                };

                let area = transform.image_box(field.x, field.y, width, height);
                match self
                    .doc
                    .insert_image(bytes, page + 1, area.x, area.y, area.width, area.height)
                {
                    Ok(()) => Ok(FieldOutcome::Image),
                    Err(pdf_core::PdfError::ImageError(reason)) => Ok(skip(
                        &field.name,
                        FieldAssetError::Decode {
                            url: url.to_string(),
                            reason,
                        },
                    )),
                    Err(other) => Err(other.into()),
                }
            }
        }
    }

    fn draw_text(
        &mut self,
        field: &MappingField,
        record: &Record,
        page: usize,
        transform: &PageTransform,
        font_size: f64,
    ) -> Result<FieldOutcome> {
        let Some(text) = record.text(&field.name) else {
            return Ok(FieldOutcome::Empty);
        };

        let anchor = transform.text_anchor(field.x, field.y, font_size);
        self.doc
            .insert_text(&text, page + 1, anchor.x, anchor.y, font_size, self.color)?;
        Ok(FieldOutcome::Text)
    }
}

fn skip(name: &str, err: FieldAssetError) -> FieldOutcome {
    log::warn!("skipping image field '{name}': {err}");
    FieldOutcome::Skipped(err)
}
