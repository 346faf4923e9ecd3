//! Interactive session state: at most one active document.

use crate::ingest::upload_and_ingest;
use crate::rag::{answer_query, answer_query_with, QaResponse};
use crate::types::IngestReport;
use pdfqa_core::{AppConfig, AppError, AppResult};
use pdfqa_llm::LlmClient;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One user's session. Each session owns its index path; sessions never
/// share or overwrite each other's indices.
pub struct Session {
    config: AppConfig,
    index_path: Option<PathBuf>,
    llm: Option<Arc<dyn LlmClient>>,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            index_path: None,
            llm: None,
        }
    }

    /// Use `llm` instead of building a client from configuration.
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Index of the active document, if one has been uploaded.
    pub fn index_path(&self) -> Option<&Path> {
        self.index_path.as_deref()
    }

    /// Upload and index `pdf_path`, making it the active document.
    ///
    /// On failure the previously active document stays active.
    pub async fn upload(&mut self, pdf_path: &Path) -> AppResult<IngestReport> {
        let report = upload_and_ingest(&self.config, pdf_path).await?;

        if let Some(previous) = self.index_path.replace(report.index_path.clone()) {
            tracing::info!("Replaced active index {:?}", previous);
        }

        Ok(report)
    }

    /// Answer `query` from the active document.
    pub async fn ask(&self, query: &str) -> AppResult<QaResponse> {
        let index_path = self.index_path.as_deref().ok_or(AppError::NoDocument)?;

        match &self.llm {
            Some(llm) => answer_query_with(&self.config, llm.clone(), index_path, query).await,
            None => answer_query(&self.config, index_path, query).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_config, write_pdf, EchoLlm};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_query_before_upload() {
        let temp = TempDir::new().unwrap();
        let session = Session::new(test_config(temp.path()));

        let result = session.ask("What is this about?").await;
        assert!(matches!(result, Err(AppError::NoDocument)));
        assert_eq!(
            AppError::NoDocument.to_string(),
            "Please upload and index a PDF before asking a question."
        );
    }

    #[tokio::test]
    async fn test_non_pdf_upload_rejected() {
        let temp = TempDir::new().unwrap();
        let mut session = Session::new(test_config(temp.path()));
        let notes = temp.path().join("notes.txt");
        std::fs::write(&notes, "plain text").unwrap();

        assert!(matches!(
            session.upload(&notes).await,
            Err(AppError::Pdf(_))
        ));
        assert!(session.index_path().is_none());
    }

    #[tokio::test]
    async fn test_upload_then_ask() {
        let temp = TempDir::new().unwrap();
        let source = TempDir::new().unwrap();
        let llm = Arc::new(EchoLlm::default());
        let mut session = Session::new(test_config(temp.path())).with_llm(llm.clone());

        let pdf = source.path().join("atlantis.pdf");
        write_pdf(&pdf, &["Atlantis sank into the ocean in a single day and night."]);
        session.upload(&pdf).await.unwrap();

        let response = session.ask("What happened to Atlantis?").await.unwrap();
        assert!(response.answer.contains("single day and night"));
        assert_eq!(llm.request_count(), 1);
    }

    #[tokio::test]
    async fn test_second_upload_replaces_active_index() {
        let temp = TempDir::new().unwrap();
        let source = TempDir::new().unwrap();
        let llm = Arc::new(EchoLlm::default());
        let mut session = Session::new(test_config(temp.path())).with_llm(llm.clone());

        let first = source.path().join("first.pdf");
        write_pdf(&first, &["The first document covers tidal mills."]);
        let second = source.path().join("second.pdf");
        write_pdf(&second, &["The second document covers lighthouse lenses."]);

        let first_report = session.upload(&first).await.unwrap();
        let second_report = session.upload(&second).await.unwrap();

        assert_ne!(first_report.index_path, second_report.index_path);
        assert_eq!(session.index_path(), Some(second_report.index_path.as_path()));
        assert!(first_report.index_path.exists());

        let response = session.ask("What does it cover?").await.unwrap();
        assert!(response.answer.contains("lighthouse"));
        assert!(!response.answer.contains("tidal"));
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_previous_document() {
        let temp = TempDir::new().unwrap();
        let source = TempDir::new().unwrap();
        let mut session = Session::new(test_config(temp.path()));

        let pdf = source.path().join("kept.pdf");
        write_pdf(&pdf, &["Kept document."]);
        let report = session.upload(&pdf).await.unwrap();

        let broken = source.path().join("broken.pdf");
        std::fs::write(&broken, b"%PDF-1.4 garbage").unwrap();
        assert!(session.upload(&broken).await.is_err());

        assert_eq!(session.index_path(), Some(report.index_path.as_path()));
    }
}
