//! Export configuration

use crate::fetch::DEFAULT_TIMEOUT;
use std::time::Duration;

/// Settings for an [`Exporter`](crate::Exporter)
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Template URL or local path
    pub template: String,
    /// Remote fill endpoint; without one every export is filled locally
    pub endpoint: Option<String>,
    /// Bearer token for the remote fill service
    pub token: Option<String>,
    /// API key header for the remote fill service
    pub api_key: Option<String>,
    /// Timeout for each network request
    pub timeout: Duration,
}

impl ExportConfig {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
            endpoint: None,
            token: None,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
