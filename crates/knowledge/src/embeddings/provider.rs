//! Embedding provider trait and factory.

use pdfqa_core::config::EmbeddingSettings;
use pdfqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "fastembed", "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Which embedder built an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingSpec {
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
}

impl EmbeddingSpec {
    /// Describe a live provider.
    pub fn of(provider: &dyn EmbeddingProvider) -> Self {
        Self {
            provider: provider.provider_name().to_string(),
            model: provider.model_name().to_string(),
            dimensions: provider.dimensions(),
        }
    }

    /// Requested provider and model from configuration.
    ///
    /// Dimensions are unknown until the provider is built and are left at 0.
    pub fn from_settings(settings: &EmbeddingSettings) -> Self {
        Self {
            provider: settings.provider.clone(),
            model: settings.model.clone(),
            dimensions: 0,
        }
    }
}

/// Create an embedding provider.
///
/// Model downloads (fastembed) land in `cache_dir`. A non-zero
/// `spec.dimensions` is checked against the built provider.
pub async fn create_provider(
    spec: &EmbeddingSpec,
    cache_dir: &Path,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    tracing::debug!(
        "Creating embedding provider: provider={}, model={}",
        spec.provider,
        spec.model
    );

    let provider: Arc<dyn EmbeddingProvider> = match spec.provider.as_str() {
        "trigram" => Arc::new(super::providers::TrigramProvider::default()),

        #[cfg(feature = "fastembed")]
        "fastembed" => Arc::new(
            super::providers::FastEmbedProvider::load(&spec.model, cache_dir.to_path_buf()).await?,
        ),

        #[cfg(not(feature = "fastembed"))]
        "fastembed" => {
            let _ = cache_dir;
            return Err(AppError::Embedding(format!(
                "Embedding model '{}' needs the fastembed provider, but this build does not \
                 include it. Rebuild with `--features fastembed` or set EMBEDDING_PROVIDER=trigram.",
                spec.model
            )));
        }

        other => {
            return Err(AppError::Embedding(format!(
                "Unknown embedding provider: '{}'. Supported providers: fastembed, trigram",
                other
            )))
        }
    };

    if spec.dimensions != 0 && spec.dimensions != provider.dimensions() {
        return Err(AppError::Embedding(format!(
            "Embedding dimension mismatch: index expects {}, provider '{}' produces {}",
            spec.dimensions,
            provider.provider_name(),
            provider.dimensions()
        )));
    }

    Ok(provider)
}
