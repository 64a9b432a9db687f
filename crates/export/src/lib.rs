//! Export - delivering filled documents
//!
//! This crate provides:
//! - The JSON wire contract of the remote fill service
//! - A client for the remote fill service
//! - The local fallback path built on the shared `filler` engine
//! - [`Exporter`], which tries the remote path first and falls back once
//! - Storage collaborator traits for mappings and records
//!
//! # Example
//!
//! ```ignore
//! use export::{ExportConfig, Exporter, MemoryMappingStore};
//!
//! let config = ExportConfig::new("https://cdn.example.com/code-of-conduct.pdf")
//!     .with_endpoint("https://fill.example.com/pdf-export");
//! let exporter = Exporter::new(config, Arc::new(MemoryMappingStore::new()))?;
//! let deliverable = exporter.single(&record).await?;
//! std::fs::write(&deliverable.file_name, &deliverable.bytes)?;
//! ```

mod config;
mod error;
mod exporter;
mod fetch;
mod local;
mod location;
mod remote;
mod store;
pub mod wire;

pub use config::ExportConfig;
pub use error::{ExportError, FetchError, TransportError};
pub use exporter::{Deliverable, DeliveryPath, Exporter};
pub use fetch::{HttpFetcher, DEFAULT_TIMEOUT};
pub use local::LocalFiller;
pub use location::TemplateLocation;
pub use remote::RemoteFillClient;
pub use store::{MappingStore, MemoryMappingStore, MemoryRecordStore, RecordStore};
pub use wire::{ErrorBody, FillMode, FillRequest};

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;
