//! PDF loading with per-page text extraction.

use crate::types::PageText;
use lopdf::Document;
use pdfqa_core::{AppError, AppResult};
use std::path::Path;

/// Load a PDF and extract the text of every page, in page order.
///
/// A page whose text cannot be extracted is logged and returned with empty
/// text so page numbering stays intact. Failing to open or parse the file
/// itself is an error.
pub fn load_pdf(path: &Path) -> AppResult<Vec<PageText>> {
    if !path.exists() {
        return Err(AppError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("PDF not found: {}", path.display()),
        )));
    }

    let document = Document::load(path)
        .map_err(|e| AppError::Pdf(format!("Failed to parse {}: {}", path.display(), e)))?;

    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    tracing::debug!("Loaded {:?} with {} pages", path, page_numbers.len());

    let pages = page_numbers
        .into_iter()
        .map(|page| {
            let text = match document.extract_text(&[page]) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Could not extract text from page {} of {:?}: {}", page, path, e);
                    String::new()
                }
            };
            PageText { page, text }
        })
        .collect();

    Ok(pages)
}
