//! Document ingestion and question answering for pdfqa.
//!
//! Loads PDFs page by page, splits them into overlapping chunks, embeds the
//! chunks into a per-document vector index persisted as SQLite plus a
//! checksummed manifest, and answers questions from the top-k chunks.

pub mod chunker;
pub mod embeddings;
pub mod ingest;
pub mod loader;
pub mod paths;
pub mod rag;
pub mod session;
pub mod store;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use ingest::{ingest_pdf, upload_and_ingest};
pub use rag::{answer_query, QaResponse, SourceRef};
pub use session::Session;
pub use store::{load_index, read_manifest, IndexManifest};
pub use types::{DocumentChunk, IngestReport, ScoredChunk};
