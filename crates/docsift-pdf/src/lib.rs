use std::path::Path;

use thiserror::Error;

use docsift_core::{BackendError, ClassifyError, HeadingClassifier, PdfBackend};

pub mod aggregate;
pub mod batch;
pub mod config;
pub mod extractor;
pub mod features;

pub use aggregate::HeadingAggregator;
pub use batch::{ProgressEvent, process_documents};
pub use config::{ConfigError, ExtractionConfig, ExtractionConfigBuilder};
pub use extractor::{DocumentExtraction, DocumentProcessor};
pub use features::extract_features;
// Re-export domain types from core (canonical definitions live there)
pub use docsift_core::{CollectionCorpus, CorpusLine, Heading, RawLine};

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("classifier error: {0}")]
    Classify(#[from] ClassifyError),
}

/// Extract headings and the line corpus from one document.
///
/// Pipeline:
/// 1. Pull raw lines (text + layout metadata) from the backend
/// 2. Filter lines shorter than the configured minimum
/// 3. Derive the feature vector per line
/// 4. Classify each line via the frozen model
/// 5. Aggregate consecutive heading lines into section titles
pub fn extract_document(
    path: &Path,
    backend: &dyn PdfBackend,
    classifier: &dyn HeadingClassifier,
    config: &ExtractionConfig,
) -> Result<DocumentExtraction, PdfError> {
    let raw_lines = backend.extract_lines(path)?;
    let document = document_name(path);
    let extraction = DocumentProcessor::new(classifier, config).process(&document, &raw_lines)?;
    Ok(extraction)
}

/// Document identifier used throughout the outputs: the file's basename.
pub fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
