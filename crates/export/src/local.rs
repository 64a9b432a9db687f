//! Local fallback path

use crate::fetch::HttpFetcher;
use crate::location::TemplateLocation;
use crate::Result;
use filler::{AssetBundle, DocumentFiller, Mapping, Record};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Fills documents in-process with the shared engine
///
/// The template is fetched on first use and the bytes are kept for every
/// later fill.
#[derive(Debug)]
pub struct LocalFiller {
    fetcher: HttpFetcher,
    template: TemplateLocation,
    template_bytes: OnceCell<Arc<Vec<u8>>>,
    filler: DocumentFiller,
}

impl LocalFiller {
    pub fn new(fetcher: HttpFetcher, template: TemplateLocation) -> Self {
        Self {
            fetcher,
            template,
            template_bytes: OnceCell::new(),
            filler: DocumentFiller::new(),
        }
    }

    /// Use already loaded template bytes
    pub fn with_template_bytes(fetcher: HttpFetcher, template: TemplateLocation, bytes: Vec<u8>) -> Self {
        Self {
            fetcher,
            template,
            template_bytes: OnceCell::new_with(Some(Arc::new(bytes))),
            filler: DocumentFiller::new(),
        }
    }

    pub fn template(&self) -> &TemplateLocation {
        &self.template
    }

    pub fn fetcher(&self) -> &HttpFetcher {
        &self.fetcher
    }

    /// Template bytes, fetched once
    pub async fn template_bytes(&self) -> Result<Arc<Vec<u8>>> {
        let bytes = self
            .template_bytes
            .get_or_try_init(|| async {
                log::debug!("loading template from {}", self.template);
                self.fetcher.load(&self.template).await.map(Arc::new)
            })
            .await?;
        Ok(bytes.clone())
    }

    /// Fill one record
    pub async fn single(&self, record: &Record, mapping: &Mapping) -> Result<Vec<u8>> {
        let template = self.template_bytes().await?;
        let assets = AssetBundle::collect(mapping, record, &self.fetcher).await;
        Ok(self.filler.fill(&template, record, mapping, &assets)?)
    }

    /// Fill every record, one after another, into a ZIP
    pub async fn bulk(&self, records: &[Record], mapping: &Mapping) -> Result<Vec<u8>> {
        let template = self.template_bytes().await?;
        let assets = AssetBundle::collect_all(mapping, records, &self.fetcher).await;
        Ok(self
            .filler
            .fill_archive(&template, records, mapping, &assets)?)
    }
}
