//! LLM client factory.
//!
//! Builds the chat client from `LlmSettings`. The credential check runs first
//! so a missing key surfaces before any other work.

use std::sync::Arc;
use std::time::Duration;

use pdfqa_core::config::LlmSettings;
use pdfqa_core::AppResult;

use crate::client::LlmClient;
use crate::providers::openai::{OpenAiClient, DEFAULT_BASE_URL};

/// Create an LLM client from configuration.
///
/// # Errors
/// - `AppError::MissingApiKey` when neither `OPENAI_API_KEY` nor `API_KEY` is set
/// - `AppError::Llm` when the HTTP client cannot be built
pub fn create_client(settings: &LlmSettings) -> AppResult<Arc<dyn LlmClient>> {
    let api_key = settings.require_api_key()?;
    let base_url = settings.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);

    tracing::debug!(base_url, model = %settings.model, "Creating LLM client");

    let client = OpenAiClient::with_options(
        api_key,
        base_url,
        settings.max_retries,
        Duration::from_secs(settings.timeout_secs),
    )?;

    Ok(Arc::new(client))
}
