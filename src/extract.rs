//! Plain-text extraction for uploaded documents.
//!
//! PDFs are extracted page by page and concatenated; a failure of the
//! page-level extractor falls back to whole-document extraction so that a
//! partially malformed file still yields text. Anything that is not a PDF is
//! treated as plain text and decoded lossily.

use std::path::Path;
use thiserror::Error;

/// Errors raised while turning a document byte stream into plain text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The uploaded file is no longer present on disk.
    #[error("document file not found: {0}")]
    NotFound(String),
    /// The PDF extractor could not recover any text from the file.
    #[error("failed to extract PDF text: {0}")]
    Pdf(String),
    /// Reading the file from disk failed.
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

/// Extracted text view of a document.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Full plain-text content, pages joined by blank lines.
    pub text: String,
    /// Number of pages observed during extraction (1 for plain text).
    pub page_count: usize,
}

/// Extract plain text from the document at `path`.
pub fn extract_document(path: &Path) -> Result<Extraction, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::NotFound(path.display().to_string()));
    }

    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        extract_pdf(path)
    } else {
        let bytes = std::fs::read(path)?;
        Ok(Extraction {
            text: String::from_utf8_lossy(&bytes).into_owned(),
            page_count: 1,
        })
    }
}

fn extract_pdf(path: &Path) -> Result<Extraction, ExtractError> {
    match pdf_extract::extract_text_by_pages(path) {
        Ok(pages) => Ok(Extraction {
            page_count: pages.len(),
            text: pages.join("\n\n"),
        }),
        Err(page_error) => {
            tracing::warn!(
                path = %path.display(),
                error = %page_error,
                "Page-level PDF extraction failed; retrying whole document"
            );
            let text = pdf_extract::extract_text(path)
                .map_err(|error| ExtractError::Pdf(error.to_string()))?;
            Ok(Extraction {
                text,
                page_count: 1,
            })
        }
    }
}
