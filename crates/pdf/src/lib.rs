use std::path::Path;

use thiserror::Error;

use parser::backend::LopdfBackend;

pub mod parser;
pub mod types;

pub use types::*;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("Page {0} is out of range")]
    PageOutOfRange(u32),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// A loaded PDF whose pages are decoded on demand.
///
/// Decoding is per page so a caller can skip pages that fail without losing
/// the rest of the document.
#[derive(Debug)]
pub struct Document {
    backend: LopdfBackend,
}

impl Document {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PdfError> {
        Ok(Document {
            backend: LopdfBackend::load_file(path.as_ref())?,
        })
    }

    pub fn page_count(&self) -> u32 {
        self.backend.page_count()
    }

    /// Positioned text of a 1-based page.
    pub fn page(&self, number: u32) -> Result<PageText, PdfError> {
        parser::layout::extract_page(&self.backend, number)
    }

    /// Info dictionary entries plus the page count; no page is decoded.
    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata::from_info(&self.backend.metadata(), self.page_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Document::open(dir.path().join("himnario.pdf"));
        assert!(result.is_err());
    }

    #[test]
    fn test_page_out_of_range_message() {
        assert_eq!(
            PdfError::PageOutOfRange(400).to_string(),
            "Page 400 is out of range"
        );
    }
}
