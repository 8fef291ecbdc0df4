use std::path::Path;

use thiserror::Error;

use crate::RawLine;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    Open(String),
    #[error("failed to extract lines: {0}")]
    Extraction(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF line extraction backends.
///
/// Implementors provide the low-level layout step: one [`RawLine`] per
/// physical line, page-major, in natural reading order. The structural
/// pipeline (feature extraction, classification, heading aggregation) lives
/// in `docsift-pdf` and is backend-agnostic.
pub trait PdfBackend: Send + Sync {
    /// Extract every text line of a PDF file with its layout metadata.
    fn extract_lines(&self, path: &Path) -> Result<Vec<RawLine>, BackendError>;
}
