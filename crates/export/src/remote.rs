//! Client for the remote fill service

use crate::error::TransportError;
use crate::wire::{ErrorBody, FillRequest};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;

/// Sends fill requests to a remote fill service
#[derive(Debug, Clone)]
pub struct RemoteFillClient {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
    api_key: Option<String>,
}

impl RemoteFillClient {
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self {
            client,
            endpoint,
            token: None,
            api_key: None,
        }
    }

    /// Send `Authorization: Bearer <token>`
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Send `apikey: <key>`
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// POST the request and return the document or archive bytes.
    ///
    /// The response must be 2xx, carry the content type for the request's
    /// mode and start with that format's magic bytes.
    pub async fn invoke(&self, request: &FillRequest) -> Result<Vec<u8>, TransportError> {
        let mut builder = self.client.post(self.endpoint.clone()).json(request);
        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(key) = &self.api_key {
            builder = builder.header("apikey", key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(format!("failed to read body: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let mode = request.mode;
        if body.is_empty() {
            return Err(TransportError::UnexpectedBody("empty body".to_string()));
        }
        if !content_type.contains(mode.content_type()) {
            return Err(TransportError::UnexpectedBody(format!(
                "expected {}, got {:?}",
                mode.content_type(),
                content_type
            )));
        }
        if !body.starts_with(mode.magic()) {
            return Err(TransportError::UnexpectedBody(format!(
                "body is not a {} file",
                mode.content_type()
            )));
        }

        Ok(body.to_vec())
    }
}
