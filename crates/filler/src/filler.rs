//! Whole-document filling

use crate::archive;
use crate::assets::{AssetBundle, AssetSource};
use crate::mapping::Mapping;
use crate::naming::UniqueNames;
use crate::record::Record;
use crate::render::{FieldOutcome, FieldRenderer};
use crate::transform::{resolve_page, PageTransform};
use crate::{FillError, Result};
use pdf_core::PdfDocument;

/// Counts for one filled document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillReport {
    pub text_drawn: usize,
    pub images_drawn: usize,
    pub empty: usize,
    pub skipped: usize,
}

impl FillReport {
    fn record(&mut self, outcome: &FieldOutcome) {
        match outcome {
            FieldOutcome::Text => self.text_drawn += 1,
            FieldOutcome::Image => self.images_drawn += 1,
            FieldOutcome::Empty => self.empty += 1,
            FieldOutcome::Skipped(_) => self.skipped += 1,
        }
    }
}

/// Fills a template from a mapping and a record
///
/// Every call opens its own copy of the template, so one filler can be
/// shared across any number of fills.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentFiller;

impl DocumentFiller {
    pub fn new() -> Self {
        Self
    }

    /// Fill one record and return the PDF bytes
    pub fn fill(
        &self,
        template: &[u8],
        record: &Record,
        mapping: &Mapping,
        assets: &AssetBundle,
    ) -> Result<Vec<u8>> {
        self.fill_with_report(template, record, mapping, assets)
            .map(|(bytes, _)| bytes)
    }

    /// Fill one record, also returning what was drawn
    pub fn fill_with_report(
        &self,
        template: &[u8],
        record: &Record,
        mapping: &Mapping,
        assets: &AssetBundle,
    ) -> Result<(Vec<u8>, FillReport)> {
        let mut doc = PdfDocument::open_from_bytes(template)
            .map_err(|e| FillError::TemplateParse(e.to_string()))?;

        let page_count = doc.page_count();
        if page_count == 0 {
            return Err(FillError::EmptyTemplate);
        }

        doc.use_base_font();

        let mut report = FillReport::default();
        {
            let mut sizes = Vec::with_capacity(page_count);
            for page in 1..=page_count {
                sizes.push(doc.page_size(page)?);
            }

            let mut renderer = FieldRenderer::new(&mut doc, assets);
            for field in &mapping.fields {
                let page = resolve_page(field.page, page_count);
                let transform = PageTransform::for_mapping(sizes[page], mapping);
                let outcome = renderer.render(field, record, page, &transform)?;
                report.record(&outcome);
            }
        }

        let bytes = doc.to_bytes()?;
        log::debug!(
            "filled {:?}: {} text, {} image(s), {} empty, {} skipped",
            record.display_name().as_deref().unwrap_or("record"),
            report.text_drawn,
            report.images_drawn,
            report.empty,
            report.skipped
        );

        Ok((bytes, report))
    }

    /// Fetch the record's images from `source`, then fill
    pub async fn fill_with_source(
        &self,
        template: &[u8],
        record: &Record,
        mapping: &Mapping,
        source: &dyn AssetSource,
    ) -> Result<Vec<u8>> {
        let assets = AssetBundle::collect(mapping, record, source).await;
        self.fill(template, record, mapping, &assets)
    }

    /// Fill every record in order and pack the results into a ZIP
    ///
    /// Entries are named from each record's display name; repeated names get
    /// a numeric suffix.
    pub fn fill_archive(
        &self,
        template: &[u8],
        records: &[Record],
        mapping: &Mapping,
        assets: &AssetBundle,
    ) -> Result<Vec<u8>> {
        let mut names = UniqueNames::new();
        let mut entries = Vec::with_capacity(records.len());

        for record in records {
            let bytes = self.fill(template, record, mapping, assets)?;
            entries.push((names.claim(record.display_name().as_deref()), bytes));
        }

        archive::pack(&entries)
    }
}
