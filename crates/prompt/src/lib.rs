//! Prompt system for pdfqa.
//!
//! - YAML-based prompt definitions with a system and a user template
//! - Handlebars rendering without HTML escaping
//! - Built-in question-answering prompt, overridable per workspace

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use builtin::QA_STUFF_PROMPT_ID;
pub use loader::load_prompt;
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
