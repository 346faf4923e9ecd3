//! Retrieval-augmented question answering.
//!
//! Retrieves the most similar chunks from a document index and asks the chat
//! model to answer from them.

pub mod ask;
pub mod retriever;
pub mod types;

pub use ask::{answer_query, answer_query_with, StuffQaChain};
pub use retriever::Retriever;
pub use types::{QaResponse, SourceRef};
