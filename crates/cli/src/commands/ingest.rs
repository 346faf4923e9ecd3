//! Ingest command handler.

use clap::Args;
use pdfqa_core::{config::AppConfig, AppError, AppResult};
use std::path::PathBuf;

/// Upload a PDF and build its vector index
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// PDF file to ingest
    pub pdf: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command for {:?}", self.pdf);

        let report = pdfqa_knowledge::upload_and_ingest(config, &self.pdf).await?;

        if self.json {
            let output = serde_json::json!({
                "indexPath": report.index_path,
                "source": report.source,
                "pageCount": report.page_count,
                "chunkCount": report.chunk_count,
                "embeddingProvider": report.embedding_provider,
                "embeddingModel": report.embedding_model,
                "durationSecs": report.duration_secs,
            });
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", report.index_path.display());
            tracing::info!(
                "Indexed {} pages into {} chunks in {:.2}s",
                report.page_count,
                report.chunk_count,
                report.duration_secs
            );
        }

        Ok(())
    }
}
