//! HTTP client for the remote background-removal service
//!
//! Speaks the remove.bg wire contract: a multipart POST carrying the raw
//! image bytes, a size mode, and an output format, authenticated with an
//! `X-Api-Key` header. Success responses are the binary processed image;
//! failure responses are a JSON body with a machine-readable error code.

use crate::config::RemovalConfig;
use crate::error::{BgRemovalError, Result, GENERIC_FAILURE_MESSAGE};
use crate::service::{BackgroundRemover, ProcessingRequest};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

/// Error code the service uses for a depleted usage allowance
const INSUFFICIENT_CREDITS_CODE: &str = "insufficient_credits";

/// Structured error body returned by the service on failure
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEntry {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Client for a remove.bg-style background-removal endpoint
#[derive(Debug, Clone)]
pub struct RemoveBgClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl RemoveBgClient {
    /// Create a new client from a validated configuration
    ///
    /// # Errors
    /// - Invalid configuration (missing credential, empty endpoint)
    /// - Failed to construct the HTTP client
    pub fn new(config: &RemovalConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BgRemovalError::network_error("Failed to create HTTP client", &e))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Map a non-success response body to the error taxonomy
    ///
    /// The quota-exhaustion code gets its dedicated error so callers can
    /// surface the quota-specific message; anything else carries the
    /// service-provided title or the generic fallback. Unparseable bodies use
    /// the fallback too.
    fn map_error_body(status: reqwest::StatusCode, body: &[u8]) -> BgRemovalError {
        let parsed: Option<ApiErrorBody> = serde_json::from_slice(body).ok();
        let first = parsed.as_ref().and_then(|b| b.errors.first());

        if let Some(entry) = first {
            if entry.code.as_deref() == Some(INSUFFICIENT_CREDITS_CODE) {
                return BgRemovalError::quota_exhausted();
            }
            if let Some(title) = entry.title.as_deref() {
                if !title.trim().is_empty() {
                    return BgRemovalError::remote_processing(title);
                }
            }
        }

        log::debug!(
            "Remote service error without usable detail (status {status}, {} body bytes)",
            body.len()
        );
        BgRemovalError::remote_processing(GENERIC_FAILURE_MESSAGE)
    }
}

#[async_trait]
impl BackgroundRemover for RemoveBgClient {
    async fn remove_background(&self, request: &ProcessingRequest) -> Result<Vec<u8>> {
        let image_part = Part::bytes(request.image_bytes.clone())
            .file_name(request.file_name.clone());

        let form = Form::new()
            .part("image_file", image_part)
            .text("size", request.size_mode.as_field_value())
            .text("format", request.output_format.as_field_value());

        tracing::debug!(
            upload_id = %request.upload_id,
            size = %request.size_mode,
            format = %request.output_format,
            "Submitting background-removal request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Api-Key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BgRemovalError::network_error("Request failed", &e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| BgRemovalError::network_error("Failed to read response body", &e))?;

        if status.is_success() {
            tracing::debug!(
                upload_id = %request.upload_id,
                bytes = body.len(),
                "Received processed image"
            );
            return Ok(body.to_vec());
        }

        Err(Self::map_error_body(status, &body))
    }
}
