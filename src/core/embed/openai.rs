//! OpenAI-compatible embedding client.
//!
//! Blocking client: the embedding pipeline is synchronous and the CLI
//! runs it on tokio's blocking pool. Transient failures (HTTP 429, 5xx,
//! timeouts, connection errors) are retried with exponential backoff up
//! to `max_retries` times.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::core::embed::Embedder;
use crate::core::error::{RagprepError, Result};

/// Blocking embeddings client for OpenAI-compatible endpoints
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: Option<usize>,
    max_retries: usize,
}

impl OpenAiEmbedder {
    /// Build a client for `<base_url>/embeddings`.
    ///
    /// # Errors
    ///
    /// `ConfigError` when the API key or model is empty, or the key is
    /// not a valid header value.
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        dimensions: Option<usize>,
        timeout: Duration,
        max_retries: usize,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(RagprepError::ConfigError(
                "Missing OpenAI API key (set OPENAI_API_KEY or pass --api-key)".to_string(),
            ));
        }
        if model.trim().is_empty() {
            return Err(RagprepError::ConfigError(
                "Missing embedding model name".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|_| RagprepError::ConfigError("Invalid OpenAI API key".to_string()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| RagprepError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.to_string(),
            dimensions,
            max_retries,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn should_retry(&self, status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    fn is_retryable_error(&self, err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
    }

    fn retry_backoff(&self, attempt: usize) -> Duration {
        let capped = attempt.min(5) as u32;
        Duration::from_millis(500 * (1 << capped))
    }
}

impl Embedder for OpenAiEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.dimensions,
        };

        let mut attempt = 0usize;
        loop {
            match self.client.post(&self.endpoint).json(&request).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let mut parsed: EmbeddingResponse = resp.json().map_err(|e| {
                            RagprepError::EmbeddingFailed(format!("Invalid response body: {e}"))
                        })?;
                        parsed.data.sort_by_key(|entry| entry.index);
                        if parsed.data.len() != texts.len() {
                            return Err(RagprepError::EmbeddingFailed(format!(
                                "Service returned {} embeddings for {} inputs",
                                parsed.data.len(),
                                texts.len()
                            )));
                        }
                        return Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect());
                    }

                    let body = resp
                        .text()
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    if self.should_retry(status) && attempt < self.max_retries {
                        attempt += 1;
                        tracing::warn!(
                            "Embedding request returned {}, retrying ({}/{})",
                            status,
                            attempt,
                            self.max_retries
                        );
                        thread::sleep(self.retry_backoff(attempt));
                        continue;
                    }
                    return Err(RagprepError::EmbeddingFailed(format!(
                        "Request failed ({status}): {body}"
                    )));
                }
                Err(err) => {
                    if self.is_retryable_error(&err) && attempt < self.max_retries {
                        attempt += 1;
                        tracing::warn!(
                            "Embedding request error: {}, retrying ({}/{})",
                            err,
                            attempt,
                            self.max_retries
                        );
                        thread::sleep(self.retry_backoff(attempt));
                        continue;
                    }
                    return Err(RagprepError::EmbeddingFailed(format!("Request error: {err}")));
                }
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}
