//! Remote-first export with a single local fallback

use crate::config::ExportConfig;
use crate::error::{ExportError, TransportError};
use crate::fetch::HttpFetcher;
use crate::local::LocalFiller;
use crate::location::TemplateLocation;
use crate::remote::RemoteFillClient;
use crate::store::MappingStore;
use crate::wire::FillRequest;
use crate::Result;
use filler::naming::{single_file_name, ARCHIVE_FILE_NAME};
use filler::{Mapping, Record};
use std::sync::Arc;

/// Which path produced a deliverable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPath {
    Remote,
    Local,
}

/// A finished file, ready to hand to the user
#[derive(Debug, Clone)]
pub struct Deliverable {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub path: DeliveryPath,
}

/// Produces deliverables from records
///
/// Every export tries the remote fill service first. Any transport problem
/// falls back to filling locally, exactly once; there are no retries.
pub struct Exporter {
    remote: Option<RemoteFillClient>,
    local: LocalFiller,
    mappings: Arc<dyn MappingStore>,
}

impl Exporter {
    pub fn new(config: ExportConfig, mappings: Arc<dyn MappingStore>) -> Result<Self> {
        let template = TemplateLocation::parse(&config.template)?;
        let fetcher = HttpFetcher::new(config.timeout)?;

        let remote = match config.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => {
                let url = reqwest::Url::parse(endpoint).map_err(|e| {
                    ExportError::Validation(format!("invalid fill endpoint {endpoint}: {e}"))
                })?;
                Some(
                    RemoteFillClient::new(fetcher.client().clone(), url)
                        .with_token(config.token.clone())
                        .with_api_key(config.api_key.clone()),
                )
            }
            _ => None,
        };

        Ok(Self {
            remote,
            local: LocalFiller::new(fetcher, template),
            mappings,
        })
    }

    /// Seed the local path with template bytes already at hand
    pub fn with_template_bytes(mut self, bytes: Vec<u8>) -> Self {
        let template = self.local.template().clone();
        let fetcher = self.local.fetcher().clone();
        self.local = LocalFiller::with_template_bytes(fetcher, template, bytes);
        self
    }

    pub fn template(&self) -> &TemplateLocation {
        self.local.template()
    }

    /// Fill one record with the most recently saved mapping
    pub async fn single(&self, record: &Record) -> Result<Deliverable> {
        let mapping = self.latest_mapping().await?;
        self.single_with(record, &mapping).await
    }

    /// Fill many records with the most recently saved mapping
    pub async fn bulk(&self, records: &[Record]) -> Result<Deliverable> {
        let mapping = self.latest_mapping().await?;
        self.bulk_with(records, &mapping).await
    }

    /// Fill one record with an explicit mapping
    pub async fn single_with(&self, record: &Record, mapping: &Mapping) -> Result<Deliverable> {
        let request = FillRequest::single(record.clone(), mapping.clone(), &self.template_url());
        let file_name = single_file_name(record);

        self.deliver(request, file_name, || self.local.single(record, mapping))
            .await
    }

    /// Fill many records with an explicit mapping into one archive
    pub async fn bulk_with(&self, records: &[Record], mapping: &Mapping) -> Result<Deliverable> {
        if records.is_empty() {
            return Err(ExportError::Validation("No submissions provided".to_string()));
        }

        let request = FillRequest::bulk(records.to_vec(), mapping.clone(), &self.template_url());

        self.deliver(request, ARCHIVE_FILE_NAME.to_string(), || {
            self.local.bulk(records, mapping)
        })
        .await
    }

    async fn deliver<F, Fut>(
        &self,
        request: FillRequest,
        file_name: String,
        local: F,
    ) -> Result<Deliverable>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<u8>>>,
    {
        let mode = request.mode;
        let content_type = mode.content_type();

        let remote_error = match self.try_remote(&request).await {
            Ok(bytes) => {
                log::debug!("{file_name} filled remotely ({} bytes)", bytes.len());
                return Ok(Deliverable {
                    file_name,
                    content_type,
                    bytes,
                    path: DeliveryPath::Remote,
                });
            }
            Err(err) => err,
        };

        match remote_error {
            TransportError::Unavailable(_) => log::debug!("{remote_error}; filling locally"),
            _ => log::warn!("{remote_error}; falling back to local fill"),
        }

        match local().await {
            Ok(bytes) => Ok(Deliverable {
                file_name,
                content_type,
                bytes,
                path: DeliveryPath::Local,
            }),
            Err(local_error) if local_error.is_validation() => Err(local_error),
            Err(local_error) => {
                log::error!("export failed on both paths: {local_error}");
                Err(ExportError::Exhausted {
                    remote: remote_error,
                    local: Box::new(local_error),
                })
            }
        }
    }

    async fn try_remote(&self, request: &FillRequest) -> std::result::Result<Vec<u8>, TransportError> {
        let Some(remote) = &self.remote else {
            return Err(TransportError::Unavailable(
                "no endpoint configured".to_string(),
            ));
        };

        let template = self.local.template();
        if let TemplateLocation::Path(_) = template {
            return Err(TransportError::Unavailable(format!(
                "template {template} is a local file"
            )));
        }
        if template.is_loopback() {
            return Err(TransportError::Unavailable(format!(
                "template URL {template} is not reachable from the fill service"
            )));
        }

        remote.invoke(request).await
    }

    fn template_url(&self) -> String {
        self.local.template().to_string()
    }

    async fn latest_mapping(&self) -> Result<Mapping> {
        self.mappings
            .latest()
            .await?
            .map(|record| record.mapping)
            .ok_or_else(|| ExportError::Validation("No saved mapping".to_string()))
    }
}
