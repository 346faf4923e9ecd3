//! Question answering over one index.
//!
//! Retrieves the top-k chunks and "stuffs" all of them into a single prompt
//! for one chat completion.

use crate::embeddings::create_provider;
use crate::rag::retriever::Retriever;
use crate::rag::types::{QaResponse, SourceRef};
use crate::store::load_index;
use crate::types::ScoredChunk;
use pdfqa_core::config::LlmSettings;
use pdfqa_core::{AppConfig, AppResult};
use pdfqa_llm::{create_client, LlmClient, LlmRequest};
use pdfqa_prompt::{build_prompt, load_prompt, PromptDefinition, QA_STUFF_PROMPT_ID};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Separator placed between retrieved chunks in the prompt context.
const CONTEXT_SEPARATOR: &str = "\n\n";

/// Answer `query` from the index at `index_path`.
///
/// The LLM client is built first, so a missing API key is reported before
/// the index is touched.
pub async fn answer_query(
    config: &AppConfig,
    index_path: &Path,
    query: &str,
) -> AppResult<QaResponse> {
    let llm = create_client(&config.llm)?;
    answer_query_with(config, llm, index_path, query).await
}

/// Answer `query` with an explicit LLM client.
pub async fn answer_query_with(
    config: &AppConfig,
    llm: Arc<dyn LlmClient>,
    index_path: &Path,
    query: &str,
) -> AppResult<QaResponse> {
    tracing::info!("Answering query against {:?}", index_path);

    let (index, manifest) = load_index(index_path)?;
    let embedder = create_provider(&manifest.embedding, &config.model_cache_dir()).await?;
    let retriever = Retriever::new(Box::new(index), embedder, config.retrieval.top_k);

    if retriever.is_empty() {
        tracing::info!("Index {:?} has no chunks; skipping the model call", index_path);
        return Ok(QaResponse::no_information(query));
    }

    let chunks = retriever.retrieve(query).await?;

    let prompt = load_prompt(&config.workspace, QA_STUFF_PROMPT_ID)?;
    StuffQaChain::new(llm, prompt, &config.llm)
        .run(query, &chunks)
        .await
}

/// One prompt, one model call, every retrieved chunk in the context.
pub struct StuffQaChain {
    llm: Arc<dyn LlmClient>,
    prompt: PromptDefinition,
    model: String,
    temperature: f32,
}

impl StuffQaChain {
    pub fn new(llm: Arc<dyn LlmClient>, prompt: PromptDefinition, settings: &LlmSettings) -> Self {
        Self {
            llm,
            prompt,
            model: settings.model.clone(),
            temperature: settings.temperature,
        }
    }

    pub async fn run(&self, query: &str, chunks: &[ScoredChunk]) -> AppResult<QaResponse> {
        let mut variables = HashMap::new();
        variables.insert("context".to_string(), build_context(chunks));
        variables.insert("question".to_string(), query.to_string());

        let built = build_prompt(&self.prompt, &variables)?;

        let mut request =
            LlmRequest::new(built.user, self.model.clone()).with_temperature(self.temperature);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        tracing::debug!(
            "Calling {} model {} with {} context chunks",
            self.llm.provider_name(),
            self.model,
            chunks.len()
        );

        let response = self.llm.complete(&request).await?;

        tracing::info!(
            "Answer generated ({} prompt + {} completion tokens)",
            response.usage.prompt_tokens,
            response.usage.completion_tokens
        );

        Ok(QaResponse {
            answer: response.content,
            model: response.model,
            usage: response.usage,
            sources: chunks.iter().map(SourceRef::from_scored).collect(),
        })
    }
}

fn build_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::TextSplitter;
    use crate::embeddings::providers::TrigramProvider;
    use crate::ingest::ingest_with;
    use crate::testing::{long_page, test_config, write_pdf, EchoLlm};
    use pdfqa_core::AppError;
    use tempfile::TempDir;

    async fn build_index(dir: &Path, pages: &[&str]) -> std::path::PathBuf {
        let pdf = dir.join("doc.pdf");
        write_pdf(&pdf, pages);
        let index_path = dir.join("faiss_indices/doc_1");
        ingest_with(
            &pdf,
            &index_path,
            &TextSplitter::new(1000, 200).unwrap(),
            &TrigramProvider::default(),
            64,
        )
        .await
        .unwrap();
        index_path
    }

    #[tokio::test]
    async fn test_answer_stuffs_context_into_system_message() {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path());
        let index_path = build_index(
            temp.path(),
            &[
                "Atlantis was a legendary island described by Plato.",
                "According to the story, Atlantis sank into the ocean in a single day and night.",
            ],
        )
        .await;

        let llm = Arc::new(EchoLlm::default());
        let response = answer_query_with(&config, llm.clone(), &index_path, "What happened to Atlantis?")
            .await
            .unwrap();

        assert_eq!(llm.request_count(), 1);
        let request = llm.requests.lock().unwrap()[0].clone();
        let system = request.system.unwrap();
        assert!(system.starts_with("Use the following pieces of context"));
        assert!(system.contains("sank into the ocean"));
        assert!(system.contains("legendary island"));
        assert_eq!(request.prompt, "What happened to Atlantis?");
        assert_eq!(request.model, "test-model");
        assert_eq!(request.temperature, Some(0.0));

        assert!(response.answer.starts_with("ECHO: "));
        assert_eq!(response.model, "test-model");
        assert_eq!(response.usage.total_tokens, 49);
        assert_eq!(response.sources.len(), 2);
    }

    #[tokio::test]
    async fn test_relevant_page_ranks_first() {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path());

        let topics = ["harbor", "temple", "river", "orchard", "bridge", "market", "quarry"];
        let mut pages: Vec<String> = topics.iter().map(|t| long_page(t, 300)).collect();
        pages.insert(4, "The secret password is swordfish.".to_string());
        let page_refs: Vec<&str> = pages.iter().map(|p| p.as_str()).collect();
        let index_path = build_index(temp.path(), &page_refs).await;

        let llm = Arc::new(EchoLlm::default());
        let response = answer_query_with(&config, llm.clone(), &index_path, "What is the secret password?")
            .await
            .unwrap();

        assert_eq!(response.sources.len(), 3);
        assert_eq!(response.sources[0].page, 5);
        assert!(response.sources[0].snippet.contains("swordfish"));
        assert!(response.answer.contains("swordfish"));
    }

    #[tokio::test]
    async fn test_missing_api_key_reported_before_index_lookup() {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path());

        let result = answer_query(&config, &temp.path().join("missing"), "anything").await;
        assert!(matches!(result, Err(AppError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_missing_index_is_an_error() {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path());
        let llm = Arc::new(EchoLlm::default());

        let result = answer_query_with(&config, llm.clone(), &temp.path().join("missing"), "q").await;
        assert!(result.is_err());
        assert_eq!(llm.request_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_index_skips_model_call() {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path());
        let index_path = build_index(temp.path(), &["", ""]).await;

        let llm = Arc::new(EchoLlm::default());
        let response = answer_query_with(&config, llm.clone(), &index_path, "Anything there?")
            .await
            .unwrap();

        assert_eq!(llm.request_count(), 0);
        assert!(response.answer.contains("could not find"));
        assert!(response.sources.is_empty());
    }

    #[tokio::test]
    async fn test_workspace_prompt_override() {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path());
        let index_path = build_index(temp.path(), &["Plato wrote about Atlantis."]).await;

        let prompts = temp.path().join(".pdfqa/prompts");
        std::fs::create_dir_all(&prompts).unwrap();
        std::fs::write(
            prompts.join("qa.stuff.yml"),
            "id: qa.stuff\ntitle: Terse QA\napiVersion: \"1.0\"\nsystem: \"Context: {{context}}\"\ntemplate: \"Q: {{question}}\"\n",
        )
        .unwrap();

        let llm = Arc::new(EchoLlm::default());
        answer_query_with(&config, llm.clone(), &index_path, "Who?").await.unwrap();

        let request = llm.requests.lock().unwrap()[0].clone();
        assert_eq!(request.system.as_deref(), Some("Context: Plato wrote about Atlantis."));
        assert_eq!(request.prompt, "Q: Who?");
    }

    #[test]
    fn test_build_context_joins_with_blank_line() {
        use crate::types::{ChunkMetadata, DocumentChunk};
        let scored = |text: &str| ScoredChunk {
            chunk: DocumentChunk {
                id: text.to_string(),
                position: 0,
                text: text.to_string(),
                metadata: ChunkMetadata {
                    source: "a.pdf".to_string(),
                    page: 1,
                    start_char: 0,
                    end_char: 0,
                    hash: String::new(),
                },
            },
            score: 1.0,
        };

        assert_eq!(
            build_context(&[scored("First chunk"), scored("Second chunk")]),
            "First chunk\n\nSecond chunk"
        );
    }
}
