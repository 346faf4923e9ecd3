//! Embedding providers.
//!
//! Chunks and queries must be embedded by the same provider and model; the
//! index manifest records which one built the index.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider, EmbeddingSpec};
