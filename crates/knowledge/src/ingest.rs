//! PDF ingestion: load pages, chunk, embed, persist.

use crate::chunker::TextSplitter;
use crate::embeddings::{create_provider, EmbeddingProvider, EmbeddingSpec};
use crate::loader::load_pdf;
use crate::paths::{index_path_for, pdf_file_name};
use crate::store::{save_index, IndexInfo};
use crate::types::{ChunkMetadata, DocumentChunk, IngestReport};
use crate::vector_index::{FlatIndex, VectorIndex};
use chrono::Utc;
use pdfqa_core::{AppConfig, AppError, AppResult};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Copy a PDF into the uploads directory and index it under a fresh
/// `{stem}_{unix_ts}` directory.
///
/// The splitter and embedder are built before anything is written, so a
/// misconfigured embedder leaves `uploads/` untouched.
pub async fn upload_and_ingest(config: &AppConfig, pdf_path: &Path) -> AppResult<IngestReport> {
    let file_name = pdf_file_name(pdf_path)?;
    let (splitter, provider) = build_pipeline(config).await?;
    config.ensure_storage_dirs()?;

    let upload_path = config.uploads_dir().join(&file_name);
    if !same_file(pdf_path, &upload_path) {
        std::fs::copy(pdf_path, &upload_path)?;
        tracing::debug!("Copied {:?} to {:?}", pdf_path, upload_path);
    }

    let index_path = index_path_for(&config.indices_dir(), &file_name, Utc::now().timestamp());
    ingest_with(
        &upload_path,
        &index_path,
        &splitter,
        provider.as_ref(),
        config.embedding.batch_size,
    )
    .await
}

/// Ingest `pdf_path` into a new index at `index_path` using the configured
/// embedder and chunking parameters.
pub async fn ingest_pdf(
    config: &AppConfig,
    pdf_path: &Path,
    index_path: &Path,
) -> AppResult<IngestReport> {
    let (splitter, provider) = build_pipeline(config).await?;

    ingest_with(
        pdf_path,
        index_path,
        &splitter,
        provider.as_ref(),
        config.embedding.batch_size,
    )
    .await
}

async fn build_pipeline(
    config: &AppConfig,
) -> AppResult<(TextSplitter, Arc<dyn EmbeddingProvider>)> {
    let splitter = TextSplitter::new(
        config.retrieval.chunk_size,
        config.retrieval.chunk_overlap,
    )?;

    let provider = create_provider(
        &EmbeddingSpec::from_settings(&config.embedding),
        &config.model_cache_dir(),
    )
    .await?;

    Ok((splitter, provider))
}

/// Ingest with an explicit splitter and embedder.
pub async fn ingest_with(
    pdf_path: &Path,
    index_path: &Path,
    splitter: &TextSplitter,
    provider: &dyn EmbeddingProvider,
    batch_size: usize,
) -> AppResult<IngestReport> {
    let start = Instant::now();
    let source = pdf_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| pdf_path.display().to_string());

    tracing::info!("Ingesting {} into {:?}", source, index_path);

    let pages = tokio::task::spawn_blocking({
        let pdf_path = pdf_path.to_path_buf();
        move || load_pdf(&pdf_path)
    })
    .await
    .map_err(|e| AppError::Pdf(format!("PDF loader panicked: {}", e)))??;

    let chunks = chunk_pages(&source, &pages, splitter);
    tracing::debug!(
        "Split {} pages into {} chunks",
        pages.len(),
        chunks.len()
    );

    let mut index = FlatIndex::new(provider.dimensions());
    for batch in chunks.chunks(batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let embeddings = provider.embed_batch(&texts).await?;

        if embeddings.len() != batch.len() {
            return Err(AppError::Embedding(format!(
                "Provider returned {} embeddings for {} texts",
                embeddings.len(),
                batch.len()
            )));
        }

        for (chunk, embedding) in batch.iter().zip(embeddings) {
            index.add(chunk.clone(), embedding)?;
        }
    }

    let manifest = save_index(
        index_path,
        &index,
        IndexInfo {
            source: source.clone(),
            embedding: EmbeddingSpec::of(provider),
            chunk_size: splitter.chunk_size(),
            chunk_overlap: splitter.chunk_overlap(),
            page_count: pages.len() as u32,
        },
    )?;

    let duration = start.elapsed();
    tracing::info!(
        "Indexed {}: {} pages, {} chunks in {:.2}s",
        source,
        manifest.page_count,
        manifest.chunk_count,
        duration.as_secs_f64()
    );

    Ok(IngestReport {
        index_path: index_path.to_path_buf(),
        source,
        page_count: manifest.page_count,
        chunk_count: manifest.chunk_count,
        embedding_provider: manifest.embedding.provider,
        embedding_model: manifest.embedding.model,
        duration_secs: duration.as_secs_f64(),
    })
}

/// Split every page and number the chunks across the document.
fn chunk_pages(
    source: &str,
    pages: &[crate::types::PageText],
    splitter: &TextSplitter,
) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();

    for page in pages {
        for span in splitter.split(&page.text) {
            let hash = format!("{:x}", Sha256::digest(span.text.as_bytes()));
            chunks.push(DocumentChunk {
                id: uuid::Uuid::new_v4().to_string(),
                position: chunks.len() as u32,
                metadata: ChunkMetadata {
                    source: source.to_string(),
                    page: page.page,
                    start_char: span.start_char,
                    end_char: span.end_char,
                    hash,
                },
                text: span.text,
            });
        }
    }

    chunks
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;
    use crate::store::load_index;
    use crate::testing::{long_page, test_config, write_pdf};
    use crate::types::PageText;
    use tempfile::TempDir;

    #[test]
    fn test_chunk_pages_numbering_and_metadata() {
        let pages = vec![
            PageText {
                page: 1,
                text: long_page("harbor", 2400),
            },
            PageText {
                page: 2,
                text: String::new(),
            },
            PageText {
                page: 3,
                text: "Short closing page.".to_string(),
            },
        ];
        let splitter = TextSplitter::new(1000, 200).unwrap();
        let chunks = chunk_pages("atlantis.pdf", &pages, &splitter);

        assert!(chunks.len() >= 4);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.position, i as u32);
            assert_eq!(chunk.metadata.source, "atlantis.pdf");
            assert_eq!(chunk.metadata.hash.len(), 64);
        }
        let last = chunks.last().unwrap();
        assert_eq!(last.metadata.page, 3);
        assert_eq!(last.text, "Short closing page.");
        assert!(chunks.iter().all(|c| c.metadata.page != 2));
    }

    #[tokio::test]
    async fn test_ingest_builds_loadable_index() {
        let temp = TempDir::new().unwrap();
        let pdf = temp.path().join("atlantis.pdf");
        write_pdf(
            &pdf,
            &[
                "Atlantis was a legendary island described by Plato.",
                "According to the story, Atlantis sank into the ocean in a single day and night.",
            ],
        );

        let index_path = temp.path().join("faiss_indices/atlantis_1");
        let report = ingest_with(
            &pdf,
            &index_path,
            &TextSplitter::new(1000, 200).unwrap(),
            &TrigramProvider::default(),
            64,
        )
        .await
        .unwrap();

        assert_eq!(report.index_path, index_path);
        assert_eq!(report.page_count, 2);
        assert_eq!(report.chunk_count, 2);
        assert_eq!(report.embedding_provider, "trigram");

        let (index, manifest) = load_index(&index_path).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(manifest.source, "atlantis.pdf");
        assert_eq!(manifest.chunk_size, 1000);
        assert_eq!(manifest.embedding.dimensions, 384);
    }

    #[tokio::test]
    async fn test_ingest_small_batches() {
        let temp = TempDir::new().unwrap();
        let pdf = temp.path().join("long.pdf");
        write_pdf(
            &pdf,
            &[long_page("temple", 3000).as_str(), long_page("river", 3000).as_str()],
        );

        let report = ingest_with(
            &pdf,
            &temp.path().join("idx"),
            &TextSplitter::new(500, 100).unwrap(),
            &TrigramProvider::default(),
            2,
        )
        .await
        .unwrap();

        assert!(report.chunk_count > 4);
    }

    #[tokio::test]
    async fn test_pdf_without_text_yields_empty_index() {
        let temp = TempDir::new().unwrap();
        let pdf = temp.path().join("blank.pdf");
        write_pdf(&pdf, &["", ""]);

        let index_path = temp.path().join("blank_1");
        let report = ingest_with(
            &pdf,
            &index_path,
            &TextSplitter::new(1000, 200).unwrap(),
            &TrigramProvider::default(),
            64,
        )
        .await
        .unwrap();

        assert_eq!(report.chunk_count, 0);
        let (index, _) = load_index(&index_path).unwrap();
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_pdf_propagates() {
        let temp = TempDir::new().unwrap();
        let pdf = temp.path().join("broken.pdf");
        std::fs::write(&pdf, b"%PDF-1.4 garbage").unwrap();

        let result = ingest_with(
            &pdf,
            &temp.path().join("idx"),
            &TextSplitter::new(1000, 200).unwrap(),
            &TrigramProvider::default(),
            64,
        )
        .await;
        assert!(matches!(result, Err(AppError::Pdf(_))));
        assert!(!temp.path().join("idx").exists());
    }

    #[tokio::test]
    async fn test_upload_and_ingest_layout() {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path());
        let source_dir = TempDir::new().unwrap();
        let pdf = source_dir.path().join("Plato Notes.pdf");
        write_pdf(&pdf, &["Critias describes the island of Atlantis."]);

        let report = upload_and_ingest(&config, &pdf).await.unwrap();

        assert!(temp.path().join("uploads/Plato Notes.pdf").exists());
        assert!(report.index_path.starts_with(temp.path().join("faiss_indices")));
        let dir_name = report.index_path.file_name().unwrap().to_string_lossy().to_string();
        assert!(dir_name.starts_with("Plato_Notes_"));
        assert_eq!(report.chunk_count, 1);
    }

    #[cfg(not(feature = "fastembed"))]
    #[tokio::test]
    async fn test_default_embedder_unavailable_fails_before_copy() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig {
            workspace: temp.path().to_path_buf(),
            ..Default::default()
        };
        let source_dir = TempDir::new().unwrap();
        let pdf = source_dir.path().join("a.pdf");
        write_pdf(&pdf, &["Atlantis sank."]);

        let err = upload_and_ingest(&config, &pdf).await.unwrap_err();

        assert!(matches!(err, AppError::Embedding(_)));
        assert!(err.to_string().contains("--features fastembed"));
        assert!(!temp.path().join("uploads/a.pdf").exists());
        assert!(!temp.path().join("faiss_indices").exists());
    }

    #[cfg(feature = "fastembed")]
    #[tokio::test]
    #[ignore = "Requires model download"]
    async fn test_default_config_ingests_with_minilm() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig {
            workspace: temp.path().to_path_buf(),
            ..Default::default()
        };
        let source_dir = TempDir::new().unwrap();
        let pdf = source_dir.path().join("a.pdf");
        write_pdf(&pdf, &["Atlantis sank into the ocean."]);

        let report = upload_and_ingest(&config, &pdf).await.unwrap();

        assert_eq!(report.embedding_provider, "fastembed");
        assert_eq!(report.embedding_model, "sentence-transformers/all-MiniLM-L6-v2");
        assert_eq!(report.chunk_count, 1);
        assert!(temp.path().join("uploads/a.pdf").exists());
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf() {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path());
        let notes = temp.path().join("notes.txt");
        std::fs::write(&notes, "not a pdf").unwrap();

        assert!(upload_and_ingest(&config, &notes).await.is_err());
        assert!(!temp.path().join("faiss_indices").exists());
    }
}
