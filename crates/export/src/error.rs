//! Export error types

use filler::FillError;
use thiserror::Error;

/// Fetching a template or image over HTTP or from disk
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {0}")]
    InvalidUrl(String),

    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("{url} answered {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The remote fill path did not produce a usable document
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The remote path was not attempted
    #[error("remote fill unavailable: {0}")]
    Unavailable(String),

    #[error("remote fill request failed: {0}")]
    Request(String),

    #[error("remote fill answered {status}: {message}")]
    Status { status: u16, message: String },

    #[error("remote fill returned an unusable body: {0}")]
    UnexpectedBody(String),
}

/// Errors surfaced to export callers
#[derive(Debug, Error)]
pub enum ExportError {
    /// Bad input; no fallback is attempted
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Fill(#[from] FillError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Both paths failed; `local` is the last error seen
    #[error("export failed: {local} (remote path: {remote})")]
    Exhausted {
        remote: TransportError,
        local: Box<ExportError>,
    },
}

impl ExportError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ExportError::Validation(_))
    }
}
