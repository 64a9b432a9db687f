//! Where the template comes from

use crate::{ExportError, Result};
use reqwest::Url;
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;

/// A template URL or a local file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateLocation {
    Url(Url),
    Path(PathBuf),
}

impl TemplateLocation {
    /// Parse `http(s)://` as a URL and anything else as a path
    pub fn parse(location: &str) -> Result<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(ExportError::Validation(
                "templateUrl is required".to_string(),
            ));
        }

        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(location).map_err(|e| {
                ExportError::Validation(format!("invalid template URL {location}: {e}"))
            })?;
            Ok(TemplateLocation::Url(url))
        } else {
            Ok(TemplateLocation::Path(PathBuf::from(location)))
        }
    }

    /// Whether the URL host is a loopback name or address
    /// (`localhost`, `*.localhost`, `127.0.0.0/8`, `0.0.0.0`, `::1`)
    pub fn is_loopback(&self) -> bool {
        match self {
            TemplateLocation::Url(url) => url.host_str().map(is_loopback_host).unwrap_or(false),
            TemplateLocation::Path(_) => false,
        }
    }
}

impl fmt::Display for TemplateLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateLocation::Url(url) => write!(f, "{url}"),
            TemplateLocation::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

fn is_loopback_host(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let lower = host.to_ascii_lowercase();
    let lower = lower.trim_end_matches('.');

    if lower == "localhost" || lower.ends_with(".localhost") {
        return true;
    }

    match lower.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_loopback() || v4.is_unspecified(),
        Ok(IpAddr::V6(v6)) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || v6.to_ipv4_mapped().map(|v4| v4.is_loopback()).unwrap_or(false)
        }
        Err(_) => false,
    }
}
