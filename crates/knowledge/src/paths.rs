//! Naming of uploaded files and index directories.

use pdfqa_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// `{indices_dir}/{stem}_{unix_ts}` for a PDF named `file_name`.
///
/// Existing directories are never reused; a `-2`, `-3`, ... suffix is added
/// when two uploads of the same name land in the same second.
pub fn index_path_for(indices_dir: &Path, file_name: &str, unix_ts: i64) -> PathBuf {
    let base = format!("{}_{}", file_stem(file_name), unix_ts);

    let mut candidate = indices_dir.join(&base);
    let mut suffix = 2;
    while candidate.exists() {
        candidate = indices_dir.join(format!("{}-{}", base, suffix));
        suffix += 1;
    }
    candidate
}

/// Validate an upload and return its bare file name.
///
/// Only `.pdf` files (case-insensitive) are accepted.
pub fn pdf_file_name(path: &Path) -> AppResult<String> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::Pdf(format!("Not a file path: {}", path.display())))?;

    let is_pdf = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    if !is_pdf {
        return Err(AppError::Pdf(format!(
            "Only PDF files can be uploaded: {}",
            file_name
        )));
    }

    Ok(file_name.to_string())
}

fn file_stem(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    // Keep directory names portable.
    stem.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_index_path_naming() {
        let path = index_path_for(Path::new("faiss_indices"), "report.pdf", 1_700_000_000);
        assert_eq!(path, PathBuf::from("faiss_indices/report_1700000000"));
    }

    #[test]
    fn test_index_path_sanitizes_stem() {
        let path = index_path_for(Path::new("idx"), "Q3 report (final).pdf", 42);
        assert_eq!(path, PathBuf::from("idx/Q3_report__final__42"));
    }

    #[test]
    fn test_index_path_never_reuses_directory() {
        let temp = TempDir::new().unwrap();
        let first = index_path_for(temp.path(), "doc.pdf", 100);
        std::fs::create_dir_all(&first).unwrap();

        let second = index_path_for(temp.path(), "doc.pdf", 100);
        assert_ne!(first, second);
        assert!(second.ends_with("doc_100-2"));
    }

    #[test]
    fn test_pdf_file_name() {
        assert_eq!(
            pdf_file_name(Path::new("/tmp/uploads/Atlantis.PDF")).unwrap(),
            "Atlantis.PDF"
        );
        assert!(pdf_file_name(Path::new("notes.txt")).is_err());
        assert!(pdf_file_name(Path::new("pdf")).is_err());
    }
}
