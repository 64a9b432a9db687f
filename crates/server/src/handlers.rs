//! Request handlers

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use export::wire::{attachment, JSON_CONTENT_TYPE};
use export::{FillMode, FillRequest, LocalFiller, TemplateLocation};
use filler::naming::{single_file_name, ARCHIVE_FILE_NAME};
use std::sync::Arc;

/// Handle POST / and POST /pdf-export - fill a template for one or many submissions.
///
/// Checks run in a fixed order: JSON content type, parseable body,
/// template URL present, template URL reachable, at least one submission.
pub async fn fill(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    if !is_json(&headers) {
        return Err(ApiError::BadRequest("Expected JSON body".to_string()));
    }

    let request: FillRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?;

    let template = template_location(&state.config, request.template_url.as_deref())?;

    if request.submissions.is_empty() {
        return Err(ApiError::BadRequest("No submission provided".to_string()));
    }

    log::info!(
        "{:?} fill of {} submission(s) from {template}",
        request.mode,
        request.submissions.len()
    );

    let filler = LocalFiller::new(state.fetcher.clone(), template);
    let (bytes, file_name) = match request.mode {
        FillMode::Single => {
            let record = &request.submissions[0];
            let bytes = filler.single(record, &request.mapping).await?;
            (bytes, single_file_name(record))
        }
        FillMode::Bulk => {
            let bytes = filler.bulk(&request.submissions, &request.mapping).await?;
            (bytes, ARCHIVE_FILE_NAME.to_string())
        }
    };

    Ok((
        [
            (CONTENT_TYPE, request.mode.content_type().to_string()),
            (CONTENT_DISPOSITION, attachment(&file_name)),
        ],
        bytes,
    )
        .into_response())
}

/// Handle GET /health
pub async fn health() -> &'static str {
    "ok"
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().contains(JSON_CONTENT_TYPE))
        .unwrap_or(false)
}

fn template_location(
    config: &ServerConfig,
    template_url: Option<&str>,
) -> Result<TemplateLocation, ApiError> {
    let template = TemplateLocation::parse(template_url.unwrap_or_default())?;

    match &template {
        TemplateLocation::Path(_) => Err(ApiError::BadRequest(
            "templateUrl must be an http(s) URL".to_string(),
        )),
        TemplateLocation::Url(_) if template.is_loopback() && !config.allow_loopback_templates => {
            Err(ApiError::BadRequest(
                "templateUrl must be a public URL reachable from the fill service".to_string(),
            ))
        }
        TemplateLocation::Url(_) => Ok(template),
    }
}
