//! Top-k retrieval over a loaded index.

use crate::embeddings::EmbeddingProvider;
use crate::types::ScoredChunk;
use crate::vector_index::VectorIndex;
use pdfqa_core::AppResult;
use std::sync::Arc;

/// Embeds queries and searches one index.
pub struct Retriever {
    index: Box<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        index: Box<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            embedder,
            top_k,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The `top_k` chunks most similar to `query`, best first.
    pub async fn retrieve(&self, query: &str) -> AppResult<Vec<ScoredChunk>> {
        if self.index.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let results = self.index.search(&query_embedding, self.top_k)?;

        if let Some(best) = results.first() {
            tracing::debug!(
                "Top score {:.3} from page {} of {}",
                best.score,
                best.chunk.metadata.page,
                best.chunk.metadata.source
            );
        }

        Ok(results)
    }
}
