//! Local sentence-transformer embeddings via fastembed (ONNX runtime).
//!
//! Models are downloaded on first use into the configured cache directory.
//! Inference is CPU-bound and runs on the blocking thread pool.

use crate::embeddings::provider::EmbeddingProvider;
use anyhow::Context;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use pdfqa_core::{AppError, AppResult};
use std::path::PathBuf;
use std::sync::Arc;

/// Known models: accepted names, fastembed model, dimensions.
const MODELS: &[(&[&str], EmbeddingModel, usize)] = &[
    (
        &["sentence-transformers/all-MiniLM-L6-v2", "all-MiniLM-L6-v2"],
        EmbeddingModel::AllMiniLML6V2,
        384,
    ),
    (
        &["BAAI/bge-small-en-v1.5", "bge-small-en-v1.5"],
        EmbeddingModel::BGESmallENV15,
        384,
    ),
];

pub struct FastEmbedProvider {
    model: Arc<TextEmbedding>,
    model_name: String,
    dimensions: usize,
}

impl std::fmt::Debug for FastEmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedProvider")
            .field("model_name", &self.model_name)
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

impl FastEmbedProvider {
    /// Load (downloading if needed) the named model.
    pub async fn load(model_name: &str, cache_dir: PathBuf) -> AppResult<Self> {
        let (model, dimensions) = MODELS
            .iter()
            .find(|(names, _, _)| names.contains(&model_name))
            .map(|(_, model, dims)| (model.clone(), *dims))
            .ok_or_else(|| {
                AppError::Embedding(format!(
                    "Unsupported fastembed model '{}'. Supported: sentence-transformers/all-MiniLM-L6-v2, BAAI/bge-small-en-v1.5",
                    model_name
                ))
            })?;

        tracing::info!("Loading embedding model {} (cache: {:?})", model_name, cache_dir);

        let text_embedding = tokio::task::spawn_blocking(move || {
            let options = InitOptions::new(model)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(false);
            TextEmbedding::try_new(options).context("Failed to initialize embedding model")
        })
        .await
        .map_err(|e| AppError::Embedding(format!("Embedding model loader panicked: {}", e)))?
        .map_err(|e| AppError::Embedding(format!("{:#}", e)))?;

        Ok(Self {
            model: Arc::new(text_embedding),
            model_name: model_name.to_string(),
            dimensions,
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    fn provider_name(&self) -> &str {
        "fastembed"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let batch = texts.to_vec();

        tokio::task::spawn_blocking(move || {
            model
                .embed(batch, None)
                .context("Failed to generate batch embeddings")
        })
        .await
        .map_err(|e| AppError::Embedding(format!("Embedding worker panicked: {}", e)))?
        .map_err(|e| AppError::Embedding(format!("{:#}", e)))
    }
}
