//! Shared server state

use crate::config::ServerConfig;
use crate::error::ServerError;
use export::HttpFetcher;

/// Application state shared across handlers
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub fetcher: HttpFetcher,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let fetcher = HttpFetcher::new(config.fetch_timeout())?;
        Ok(Self { config, fetcher })
    }
}
