//! Image assets referenced by records
//!
//! Image bytes are fetched before filling so the fill itself never waits on
//! the network. A failed fetch only means that URL is absent from the bundle.

use crate::mapping::Mapping;
use crate::record::Record;
use crate::FieldAssetError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Something that can produce bytes for an image URL
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FieldAssetError>;
}

/// In-memory asset source
#[derive(Debug, Clone, Default)]
pub struct StaticAssets {
    assets: HashMap<String, Vec<u8>>,
}

impl StaticAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: &str, bytes: Vec<u8>) {
        self.assets.insert(url.to_string(), bytes);
    }

    pub fn with(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.insert(url, bytes);
        self
    }
}

#[async_trait]
impl AssetSource for StaticAssets {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FieldAssetError> {
        self.assets
            .get(url)
            .cloned()
            .ok_or_else(|| FieldAssetError::Missing {
                url: url.to_string(),
            })
    }
}

/// Image bytes gathered for one or more fills
#[derive(Debug, Clone, Default)]
pub struct AssetBundle {
    images: HashMap<String, Vec<u8>>,
    failures: HashMap<String, FieldAssetError>,
}

impl AssetBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Image URLs a record needs for a mapping, in field order, without repeats
    pub fn image_urls(mapping: &Mapping, record: &Record) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        for field in mapping.fields.iter().filter(|f| f.draws_image()) {
            if let Some(url) = record.url(&field.name) {
                if !urls.iter().any(|u| u == url) {
                    urls.push(url.to_string());
                }
            }
        }
        urls
    }

    /// Fetch every image one record needs
    pub async fn collect(mapping: &Mapping, record: &Record, source: &dyn AssetSource) -> Self {
        Self::collect_all(mapping, std::slice::from_ref(record), source).await
    }

    /// Fetch every image a set of records needs. Each distinct URL is fetched once.
    pub async fn collect_all(
        mapping: &Mapping,
        records: &[Record],
        source: &dyn AssetSource,
    ) -> Self {
        let mut bundle = Self::new();
        if !mapping.has_image_fields() {
            return bundle;
        }

        for record in records {
            for url in Self::image_urls(mapping, record) {
                if bundle.contains(&url) || bundle.failures.contains_key(&url) {
                    continue;
                }
                match source.fetch(&url).await {
                    Ok(bytes) => bundle.insert(&url, bytes),
                    Err(err) => {
                        log::warn!("image unavailable, field will be skipped: {err}");
                        bundle.failures.insert(url, err);
                    }
                }
            }
        }

        bundle
    }

    pub fn insert(&mut self, url: &str, bytes: Vec<u8>) {
        self.failures.remove(url);
        self.images.insert(url.to_string(), bytes);
    }

    pub fn contains(&self, url: &str) -> bool {
        self.images.contains_key(url)
    }

    /// Bytes for a URL, or why there are none
    pub fn get(&self, url: &str) -> Result<&[u8], FieldAssetError> {
        if let Some(bytes) = self.images.get(url) {
            return Ok(bytes);
        }
        Err(self
            .failures
            .get(url)
            .cloned()
            .unwrap_or_else(|| FieldAssetError::Missing {
                url: url.to_string(),
            }))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
