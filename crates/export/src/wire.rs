//! Wire types of the remote fill service
//!
//! Request: `{ mode, submissions, mapping, templateUrl }` as JSON.
//! Success: the raw PDF or ZIP body. Failure: `{ "error": "..." }`.

use filler::{Mapping, Record};
use serde::{Deserialize, Deserializer, Serialize};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const ZIP_CONTENT_TYPE: &str = "application/zip";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Leading bytes of a PDF file
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Leading bytes of a ZIP local file header
pub const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// One document or an archive of many
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    #[default]
    Single,
    Bulk,
}

impl FillMode {
    /// Content type of a successful response
    pub fn content_type(&self) -> &'static str {
        match self {
            FillMode::Single => PDF_CONTENT_TYPE,
            FillMode::Bulk => ZIP_CONTENT_TYPE,
        }
    }

    /// Magic bytes a successful response starts with
    pub fn magic(&self) -> &'static [u8] {
        match self {
            FillMode::Single => PDF_MAGIC,
            FillMode::Bulk => ZIP_MAGIC,
        }
    }
}

/// Body of a fill request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub mode: FillMode,

    #[serde(default, deserialize_with = "null_as_default")]
    pub submissions: Vec<Record>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub mapping: Mapping,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_url: Option<String>,
}

impl FillRequest {
    pub fn single(record: Record, mapping: Mapping, template_url: &str) -> Self {
        Self {
            mode: FillMode::Single,
            submissions: vec![record],
            mapping,
            template_url: Some(template_url.to_string()),
        }
    }

    pub fn bulk(records: Vec<Record>, mapping: Mapping, template_url: &str) -> Self {
        Self {
            mode: FillMode::Bulk,
            submissions: records,
            mapping,
            template_url: Some(template_url.to_string()),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of an error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// `Content-Disposition` value for a download
pub fn attachment(file_name: &str) -> String {
    format!("attachment; filename=\"{file_name}\"")
}
