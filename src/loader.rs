//! PDF text extraction.
//!
//! Produces an ordered sequence of page-level text records from a PDF
//! on disk. Failures are final for the invocation: there is no retry;
//! the caller must supply the file again.

use std::fmt;
use std::path::{Path, PathBuf};

/// Extracted text of a single page. `number` is the zero-based page
/// index in document order.
#[derive(Debug, Clone)]
pub struct Page {
    pub number: usize,
    pub text: String,
}

/// Why a document could not be loaded.
#[derive(Debug)]
pub enum LoadError {
    /// The path does not point at a regular file.
    Missing(PathBuf),
    /// The file exists but could not be read.
    Unreadable(String),
    /// The bytes are not a parseable PDF.
    InvalidPdf(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Missing(p) => write!(f, "document not found: {}", p.display()),
            LoadError::Unreadable(e) => write!(f, "document could not be read: {}", e),
            LoadError::InvalidPdf(e) => write!(f, "not a valid PDF: {}", e),
        }
    }
}

impl std::error::Error for LoadError {}

/// Extract per-page text from the PDF at `path`, in page order.
pub fn load_pdf(path: &Path) -> Result<Vec<Page>, LoadError> {
    if !path.is_file() {
        return Err(LoadError::Missing(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|e| LoadError::Unreadable(e.to_string()))?;

    let pages = pdf_extract::extract_text_by_pages_from_mem(&bytes)
        .map_err(|e| LoadError::InvalidPdf(e.to_string()))?;

    Ok(pages
        .into_iter()
        .enumerate()
        .map(|(number, text)| Page { number, text })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_returns_missing() {
        let err = load_pdf(Path::new("/no/such/file.pdf")).unwrap_err();
        assert!(matches!(err, LoadError::Missing(_)));
    }

    #[test]
    fn test_invalid_bytes_return_invalid_pdf() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("garbage.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        let err = load_pdf(&path).unwrap_err();
        assert!(matches!(err, LoadError::InvalidPdf(_)));
    }

    #[test]
    fn test_directory_returns_missing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = load_pdf(tmp.path()).unwrap_err();
        assert!(matches!(err, LoadError::Missing(_)));
    }
}
