//! OpenAI-compatible completion backend.
//!
//! Works with OpenAI and any endpoint exposing a compatible
//! `/v1/chat/completions` route (OpenRouter, Ollama, vLLM, ...).
//!
//! Supports:
//! - Streaming completions (SSE) with stop sequences and cancellation
//! - Non-streaming completions (used for single-shot code generation)

use async_trait::async_trait;
use futures::StreamExt;
use reagent_core::error::ProviderError;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{CancelHandle, CompletionBackend, SseDecoder, TokenStream};

/// An OpenAI-compatible LLM backend.
pub struct OpenAiClient {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a backend against an arbitrary OpenAI-compatible base URL.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        })
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, ProviderError> {
        Self::new("openai", "https://api.openai.com/v1", api_key, model)
    }

    fn request_body(&self, prompt: &str, stop: &[String], stream: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [ApiMessage {
                role: "system".into(),
                content: prompt.to_string(),
            }],
            "stream": stream,
        });
        if !stop.is_empty() {
            body["stop"] = serde_json::json!(stop);
        }
        body
    }

    async fn post_completions(
        &self,
        body: &serde_json::Value,
        accept: &str,
    ) -> Result<reqwest::Response, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", accept)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!(backend = %self.name, model = %self.model, "Sending completion request");

        let body = self.request_body(prompt, &[], false);
        let response = self.post_completions(&body, "application/json").await?;

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        Ok(choice.message.content.unwrap_or_default())
    }

    async fn open_stream(
        &self,
        prompt: &str,
        stop: &[String],
    ) -> Result<TokenStream, ProviderError> {
        debug!(backend = %self.name, model = %self.model, "Opening streaming completion");

        let body = self.request_body(prompt, stop, true);
        let response = self.post_completions(&body, "text/event-stream").await?;

        let (tx, rx) = mpsc::channel(64);
        let cancel = CancelHandle::new();
        let abort = cancel.clone();

        // Read the SSE byte stream, decode tokens, honor cancellation.
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut decoder = SseDecoder::new();

            loop {
                tokio::select! {
                    _ = abort.cancelled() => return,
                    chunk = byte_stream.next() => match chunk {
                        Some(Ok(bytes)) => {
                            for token in decoder.feed(&String::from_utf8_lossy(&bytes)) {
                                if tx.send(Ok(token)).await.is_err() {
                                    return; // receiver dropped
                                }
                            }
                            if decoder.is_done() {
                                return;
                            }
                        }
                        Some(Err(e)) => {
                            let _ = tx
                                .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                                .await;
                            return;
                        }
                        None => return,
                    },
                }
            }
        });

        Ok(TokenStream::new(rx, cancel))
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
