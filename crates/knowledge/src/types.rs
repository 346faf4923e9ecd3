//! Knowledge system type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Text extracted from one PDF page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-based page number
    pub page: u32,

    /// Extracted text (empty when the page has none or could not be read)
    pub text: String,
}

/// Where a chunk came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// File name of the source PDF
    pub source: String,

    /// 1-based page number
    pub page: u32,

    /// Char offset of the first character within the page text
    pub start_char: usize,

    /// Char offset one past the last character within the page text
    pub end_char: usize,

    /// SHA-256 of the chunk text
    pub hash: String,
}

/// An immutable span of one page's text, as stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Unique chunk identifier (UUID v4)
    pub id: String,

    /// 0-based position across the whole document
    pub position: u32,

    /// Chunk text
    pub text: String,

    pub metadata: ChunkMetadata,
}

/// A chunk paired with its similarity to a query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,

    /// Cosine similarity in [-1.0, 1.0]
    pub score: f32,
}

/// Outcome of ingesting one PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// Directory the index was written to
    pub index_path: PathBuf,

    /// File name of the ingested PDF
    pub source: String,

    pub page_count: u32,

    pub chunk_count: usize,

    /// Embedding provider used
    pub embedding_provider: String,

    /// Embedding model used
    pub embedding_model: String,

    /// Wall-clock time of the whole ingestion
    pub duration_secs: f64,
}
