//! Prompts shipped with the binary.

use pdfqa_core::{AppError, AppResult};

use crate::types::PromptDefinition;

/// Identifier of the "stuff" question-answering prompt.
pub const QA_STUFF_PROMPT_ID: &str = "qa.stuff";

const QA_STUFF_YAML: &str = r#"
id: qa.stuff
title: Answer a question from retrieved document chunks
apiVersion: "1.0"
createdBy: pdfqa
system: |-
  Use the following pieces of context to answer the user's question. If you don't know the answer, just say that you don't know, don't try to make up an answer.
  ----------------
  {{context}}
template: "{{question}}"
"#;

/// Look up a built-in prompt by id.
pub fn builtin_prompt(prompt_id: &str) -> AppResult<Option<PromptDefinition>> {
    let yaml = match prompt_id {
        QA_STUFF_PROMPT_ID => QA_STUFF_YAML,
        _ => return Ok(None),
    };

    let definition = serde_yaml::from_str(yaml).map_err(|e| {
        AppError::Prompt(format!("Built-in prompt {} is malformed: {}", prompt_id, e))
    })?;

    Ok(Some(definition))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qa_stuff_is_available() {
        let def = builtin_prompt(QA_STUFF_PROMPT_ID).unwrap().unwrap();
        let system = def.system.unwrap();
        assert!(system.starts_with("Use the following pieces of context"));
        assert!(system.ends_with("----------------\n{{context}}"));
        assert_eq!(def.template, "{{question}}");
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(builtin_prompt("agent.plan").unwrap().is_none());
    }
}
