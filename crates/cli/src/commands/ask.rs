//! Ask command handler.
//!
//! Answers one question from an index built by `pdfqa ingest`.

use clap::Args;
use pdfqa_core::{config::AppConfig, AppError, AppResult};
use std::path::PathBuf;

/// Answer one question from an existing index
#[derive(Args, Debug)]
pub struct AskCommand {
    /// Index directory printed by `pdfqa ingest`
    #[arg(short, long)]
    pub index: PathBuf,

    /// The question to ask
    pub query: String,

    /// Number of chunks to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        if self.query.trim().is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let mut config = config.clone();
        if let Some(top_k) = self.top_k {
            config.retrieval.top_k = top_k;
            config.validate()?;
        }

        let response = pdfqa_knowledge::answer_query(&config, &self.index, &self.query).await?;

        if self.json {
            let output = serde_json::json!({
                "answer": response.answer,
                "model": response.model,
                "usage": {
                    "promptTokens": response.usage.prompt_tokens,
                    "completionTokens": response.usage.completion_tokens,
                    "totalTokens": response.usage.total_tokens
                },
                "sources": response.sources,
            });
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", response.answer);

            if tracing::enabled!(tracing::Level::DEBUG) {
                for source in &response.sources {
                    tracing::debug!(
                        "Source {} page {} (score {:.3})",
                        source.source,
                        source.page,
                        source.score
                    );
                }
            }
        }

        Ok(())
    }
}
