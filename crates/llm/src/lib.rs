//! LLM integration crate for pdfqa.
//!
//! Provides a provider-agnostic chat completion abstraction and a client for
//! OpenAI-compatible endpoints (OpenAI itself, OpenRouter, local gateways).
//!
//! # Example
//! ```no_run
//! use pdfqa_llm::{LlmClient, LlmRequest, providers::OpenAiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new("sk-...")?;
//! let request = LlmRequest::new("Hello, world!", "gpt-4o-mini");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::OpenAiClient;
