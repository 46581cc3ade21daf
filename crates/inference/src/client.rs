//! Inference backend abstraction and the HTTP proxy client.

use std::time::Duration;

use async_trait::async_trait;
use proto::{InferenceError, ModelCategory};
use serde_json::Value;
use tracing::debug;

use crate::request::InferenceRequest;

/// Default base URL of the inference proxy.
pub const DEFAULT_API_BASE: &str = "http://localhost:5000/api";

/// Anything that can turn an [`InferenceRequest`] into a raw JSON response.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Sends one request and returns the undecoded response body.
    async fn infer(&self, request: InferenceRequest) -> Result<Value, InferenceError>;
}

// ── HTTP client ────────────────────────────────────────────────────────────────

/// Client for the `/huggingface/{category}` proxy endpoints.
pub struct HttpInferenceClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInferenceClient {
    /// Creates a client targeting [`DEFAULT_API_BASE`].
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    /// Creates a client targeting a custom base URL (useful for proxies/tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: proto::trim_base_url(base_url),
        }
    }

    /// Creates a client with an optional whole-request timeout. `None` waits
    /// indefinitely.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, InferenceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| InferenceError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: proto::trim_base_url(base_url),
        })
    }

    /// Full endpoint URL for a category.
    pub fn endpoint(&self, category: ModelCategory) -> String {
        format!("{}/huggingface/{}", self.base_url, category.as_str())
    }
}

impl Default for HttpInferenceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceBackend for HttpInferenceClient {
    async fn infer(&self, request: InferenceRequest) -> Result<Value, InferenceError> {
        let url = self.endpoint(request.category);
        debug!(
            url = %url,
            model = %request.model,
            category = %request.category,
            "Sending inference request"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| InferenceError::Network(e.to_string()))?;

        let status = response.status();
        debug!(status = %status.as_u16(), "Inference response received");

        let body = response
            .text()
            .await
            .map_err(|e| InferenceError::Network(e.to_string()))?;

        if !status.is_success() {
            let preview: String = body.chars().take(500).collect();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body: preview,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            InferenceError::InvalidResponse(format!(
                "Deserialization error: {e}; body: {}",
                body.chars().take(200).collect::<String>()
            ))
        })
    }
}
