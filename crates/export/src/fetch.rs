//! HTTP and file fetching of templates and images

use crate::error::FetchError;
use crate::location::TemplateLocation;
use async_trait::async_trait;
use filler::{AssetSource, FieldAssetError};
use std::time::Duration;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

const USER_AGENT: &str = concat!("formfill/", env!("CARGO_PKG_VERSION"));

/// Fetches bytes over HTTP with a per-request timeout
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Request {
                url: String::new(),
                reason: format!("HTTP client error: {e}"),
            })?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// GET a URL; anything but 2xx is an error
    pub async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| FetchError::Request {
            url: url.to_string(),
            reason: format!("failed to read body: {e}"),
        })?;
        Ok(bytes.to_vec())
    }

    /// Load template bytes from a URL or a file
    pub async fn load(&self, location: &TemplateLocation) -> Result<Vec<u8>, FetchError> {
        match location {
            TemplateLocation::Url(url) => self.get(url.as_str()).await,
            TemplateLocation::Path(path) => {
                tokio::fs::read(path).await.map_err(|source| FetchError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        }
    }
}

#[async_trait]
impl AssetSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FieldAssetError> {
        self.get(url).await.map_err(|e| FieldAssetError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
