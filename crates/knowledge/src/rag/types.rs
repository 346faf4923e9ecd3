//! Question-answering response types.

use crate::types::ScoredChunk;
use pdfqa_llm::LlmUsage;
use serde::{Deserialize, Serialize};

/// Maximum snippet length, in characters, for source references.
pub const MAX_SNIPPET_CHARS: usize = 150;

/// A retrieved chunk as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// File name of the source PDF
    pub source: String,

    /// 1-based page number
    pub page: u32,

    /// Start of the chunk text, truncated at a word boundary
    pub snippet: String,

    /// Cosine similarity to the query
    pub score: f32,
}

impl SourceRef {
    pub fn from_scored(scored: &ScoredChunk) -> Self {
        Self {
            source: scored.chunk.metadata.source.clone(),
            page: scored.chunk.metadata.page,
            snippet: truncate_snippet(&scored.chunk.text, MAX_SNIPPET_CHARS),
            score: scored.score,
        }
    }
}

/// Answer to one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaResponse {
    /// Text generated by the chat model
    pub answer: String,

    /// Model that produced the answer (empty when no model was called)
    pub model: String,

    pub usage: LlmUsage,

    /// Retrieved chunks in descending score order
    pub sources: Vec<SourceRef>,
}

impl QaResponse {
    /// Response for an index with nothing to retrieve.
    pub fn no_information(query: &str) -> Self {
        Self {
            answer: format!(
                "I could not find information about \"{}\" in the uploaded document.",
                query
            ),
            model: String::new(),
            usage: LlmUsage::default(),
            sources: Vec::new(),
        }
    }
}

/// Truncate to at most `max_chars` characters, preferring a word boundary.
pub fn truncate_snippet(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut = text
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let truncated = &text[..cut];

    match truncated.rfind(char::is_whitespace) {
        Some(last_space) if last_space > 0 => format!("{}...", truncated[..last_space].trim_end()),
        _ => format!("{}...", truncated),
    }
}
