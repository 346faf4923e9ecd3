//! Embedding provider implementations.

#[cfg(feature = "fastembed")]
pub mod fastembed;
pub mod trigram;

#[cfg(feature = "fastembed")]
pub use self::fastembed::FastEmbedProvider;
pub use trigram::TrigramProvider;
