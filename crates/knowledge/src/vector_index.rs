//! Vector index abstraction and the exact (flat) cosine implementation.

use crate::types::{DocumentChunk, ScoredChunk};
use pdfqa_core::{AppError, AppResult};
use std::cmp::Ordering;

/// Trait for vector index backends.
pub trait VectorIndex: Send + Sync {
    /// Add a chunk with its embedding.
    fn add(&mut self, chunk: DocumentChunk, embedding: Vec<f32>) -> AppResult<()>;

    /// Search for the top-k most similar chunks to the query embedding.
    ///
    /// Returns chunks ordered by descending similarity score.
    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<ScoredChunk>>;

    /// Number of stored chunks.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedding dimensions accepted by the index.
    fn dimensions(&self) -> usize;
}

/// A stored chunk and its embedding.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub chunk: DocumentChunk,
    pub embedding: Vec<f32>,
}

/// In-memory index scanned exhaustively on every query.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

impl FlatIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    fn check_dimensions(&self, len: usize, what: &str) -> AppResult<()> {
        if len != self.dimensions {
            return Err(AppError::Index(format!(
                "{} has {} dimensions, index expects {}",
                what, len, self.dimensions
            )));
        }
        Ok(())
    }
}

impl VectorIndex for FlatIndex {
    fn add(&mut self, chunk: DocumentChunk, embedding: Vec<f32>) -> AppResult<()> {
        self.check_dimensions(embedding.len(), "Embedding")?;
        self.entries.push(IndexEntry { chunk, embedding });
        Ok(())
    }

    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<ScoredChunk>> {
        self.check_dimensions(query_embedding.len(), "Query embedding")?;

        let mut results: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query_embedding, &entry.embedding),
            })
            .collect();

        // Ties keep document order.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.chunk.position.cmp(&b.chunk.position))
        });
        results.truncate(top_k);

        tracing::debug!(
            "Retrieved {} chunks (requested top-{})",
            results.len(),
            top_k
        );

        Ok(results)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Calculate cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
