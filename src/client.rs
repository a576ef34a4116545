//! Chat-completions client for the upstream model.
//!
//! The model call is deliberately opaque: prompt in, raw text out. Every
//! transport problem - timeout, refused connection, non-2xx status,
//! unparseable envelope - surfaces as `UpstreamModel` and is never retried
//! here; retries are a caller concern.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ModelConfig;
use crate::error::AnalyzeError;

/// Opaque generative-model call.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AnalyzeError>;
}

/// Chat request body (OpenRouter/OpenAI-compatible).
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat response envelope. Only the first choice's content is consumed.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Client for an OpenRouter/OpenAI-compatible chat-completions endpoint.
pub struct OpenRouterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout_seconds: u64,
}

impl OpenRouterClient {
    pub fn new(config: &ModelConfig, api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.name.clone(),
            temperature: config.temperature,
            timeout_seconds: config.timeout_seconds,
        }
    }
}

#[async_trait]
impl ModelClient for OpenRouterClient {
    async fn complete(&self, prompt: &str) -> Result<String, AnalyzeError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
        };

        debug!(model = %self.model, "sending chat-completions request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalyzeError::UpstreamModel(format!(
                        "request timed out after {}s",
                        self.timeout_seconds
                    ))
                } else if e.is_connect() {
                    AnalyzeError::UpstreamModel(format!(
                        "cannot connect to model endpoint at {}",
                        self.base_url
                    ))
                } else {
                    AnalyzeError::UpstreamModel(format!("failed to send request: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzeError::UpstreamModel(format!(
                "model API error {status}: {body}"
            )));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            AnalyzeError::UpstreamModel(format!("failed to parse model response: {e}"))
        })?;

        // An empty choices list degrades to empty text, which the extractor
        // reports as EmptyOutput.
        Ok(chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default())
    }
}
