//! OpenAI-compatible chat completions provider.
//!
//! Works against any endpoint implementing `POST {base_url}/chat/completions`
//! (OpenAI, OpenRouter, vLLM, LiteLLM, ...). Features:
//! - Bearer authentication
//! - Request timeout
//! - Automatic retry with exponential backoff on network errors, 429 and 5xx

use std::time::Duration;

use pdfqa_core::{AppError, AppResult};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default retries after the first attempt
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 500;

/// Upper bound for a single backoff delay
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Outcome of a single HTTP attempt.
enum Attempt {
    Done(LlmResponse),
    Retryable(String),
}

/// Client for OpenAI-compatible chat completion endpoints.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
    initial_backoff: Duration,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Create a client for the default OpenAI endpoint.
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        Self::with_options(
            api_key,
            DEFAULT_BASE_URL,
            DEFAULT_MAX_RETRIES,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a client with a custom endpoint, retry budget and timeout.
    pub fn with_options(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        max_retries: u32,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
            max_retries,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// Override the first backoff delay (doubles on every retry).
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Delay before retry number `attempt + 1`, capped at `MAX_BACKOFF`.
    fn backoff_for(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2_u32.saturating_pow(attempt))
            .min(MAX_BACKOFF)
    }

    fn to_chat_request<'a>(&self, request: &'a LlmRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            model: &request.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    async fn attempt(&self, body: &ChatRequest<'_>, fallback_model: &str) -> AppResult<Attempt> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = match self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Ok(Attempt::Retryable(format!("request failed: {}", e))),
        };

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if is_retryable(status) {
                return Ok(Attempt::Retryable(format!(
                    "API error ({}): {}",
                    status, error_text
                )));
            }

            return Err(AppError::Llm(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse completion response: {}", e)))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Llm("Completion response contained no choices".to_string()))?;

        let usage = chat
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(Attempt::Done(LlmResponse {
            content,
            model: chat.model.unwrap_or_else(|| fallback_model.to_string()),
            usage,
        }))
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!(model = %request.model, "Sending chat completion request");
        tracing::debug!("Request: {:?}", request);

        let body = self.to_chat_request(request);
        let mut attempt = 0;

        loop {
            match self.attempt(&body, &request.model).await? {
                Attempt::Done(response) => {
                    tracing::info!(
                        tokens = response.usage.total_tokens,
                        "Received chat completion"
                    );
                    return Ok(response);
                }
                Attempt::Retryable(reason) if attempt < self.max_retries => {
                    let backoff = self.backoff_for(attempt);
                    attempt += 1;
                    tracing::warn!(
                        "Completion failed (attempt {}/{}): {}; retrying in {}ms",
                        attempt,
                        self.max_retries + 1,
                        reason,
                        backoff.as_millis()
                    );
                    tokio::time::sleep(backoff).await;
                }
                Attempt::Retryable(reason) => {
                    return Err(AppError::Llm(format!(
                        "Completion failed after {} attempts: {}",
                        attempt + 1,
                        reason
                    )));
                }
            }
        }
    }
}
