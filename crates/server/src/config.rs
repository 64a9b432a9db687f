//! Server configuration

use clap::Args;
use std::time::Duration;

/// Largest accepted request body by default (10 MiB)
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Settings for the fill service
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8787")
    #[arg(long = "listen", env = "FORMFILL_LISTEN", default_value = "127.0.0.1:8787")]
    pub listen_addr: String,

    /// Accept template URLs that point at localhost
    #[arg(long, env = "FORMFILL_ALLOW_LOOPBACK")]
    pub allow_loopback_templates: bool,

    /// Timeout for template and image fetches, in seconds
    #[arg(long = "fetch-timeout", env = "FORMFILL_FETCH_TIMEOUT", default_value_t = 20)]
    pub fetch_timeout_secs: u64,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "FORMFILL_BODY_LIMIT", default_value_t = DEFAULT_BODY_LIMIT)]
    pub body_limit: usize,
}

impl ServerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8787".to_string(),
            allow_loopback_templates: false,
            fetch_timeout_secs: 20,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}
