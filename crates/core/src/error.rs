//! Error types for pdfqa.
//!
//! A single error enum covers every failure category in the workspace:
//! configuration, credentials, I/O, PDF parsing, embeddings, the vector
//! index, the LLM endpoint, prompts and front-end sequencing.

use thiserror::Error;

/// Unified error type for pdfqa.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// No LLM credential was found in the environment
    #[error("Missing OpenAI API key. Set the environment variable OPENAI_API_KEY or API_KEY.")]
    MissingApiKey,

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PDF loading and text extraction errors
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Embedding model errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index build, persistence and lookup errors
    #[error("Index error: {0}")]
    Index(String),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// A query was issued before any document was indexed
    #[error("Please upload and index a PDF before asking a question.")]
    NoDocument,

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
