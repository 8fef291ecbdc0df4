use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod backend;
pub mod classify;
pub mod config;
pub mod config_file;
pub mod embed;
pub mod ranker;
pub mod refine;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend};
pub use classify::{ClassifyError, FEATURE_COUNT, FeatureVector, HeadingClassifier, StructuralLabel};
pub use config::RankingConfig;
pub use embed::{EmbedError, EmbeddingBackend, cosine_similarity};
pub use refine::DedupContext;

/// A single text line recovered from a PDF page, with the layout metadata
/// the structural classifier needs.
///
/// Backends emit one `RawLine` per physical line, in natural reading order,
/// page by page. Centered detection is the backend's job: a line counts as
/// centered when its x-offset sits within the configured tolerance of the
/// page midline.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLine {
    pub text: String,
    /// 1-based page number.
    pub page: u32,
    /// Dominant font size of the line in points.
    pub font_size: f32,
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_centered: bool,
    /// Left edge of the line in page coordinates.
    pub x_offset: f32,
}

/// The retained projection of a [`RawLine`]: what passage search needs after
/// feature extraction has consumed the layout metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusLine {
    pub document: String,
    pub text: String,
    pub page: u32,
}

/// A section heading recovered from one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub document: String,
    pub section_title: String,
    /// Page of the heading's first merged line.
    pub page_number: u32,
}

/// A heading selected by the ranking pass, with its 1-based importance rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedSection {
    pub document: String,
    pub section_title: String,
    pub importance_rank: u32,
    pub page_number: u32,
}

/// Newline-joined passages refined from one ranked section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub refined_text: String,
    pub page_number: u32,
}

/// Combined per-document extraction output across a whole batch: every
/// finalized heading plus the full line corpus, both flat.
#[derive(Debug, Clone, Default)]
pub struct CollectionCorpus {
    pub sections: Vec<Heading>,
    pub lines: Vec<CorpusLine>,
}

/// Final output of one collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionAnalysis {
    pub extracted_sections: Vec<RankedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("embedding error: {0}")]
    Embed(#[from] EmbedError),
}

/// Rank sections and refine supporting passages for one collection run.
///
/// An empty section list short-circuits with empty outputs; that is a
/// degenerate input, not an error. Embedding failures abort the whole run,
/// since a partially ranked collection would not be globally consistent.
pub fn analyze_collection(
    task: &str,
    corpus: &CollectionCorpus,
    embedder: &dyn EmbeddingBackend,
    config: &RankingConfig,
) -> Result<CollectionAnalysis, CoreError> {
    if corpus.sections.is_empty() {
        tracing::warn!("no sections extracted, skipping ranking");
        return Ok(CollectionAnalysis::default());
    }

    let task_embedding = embedder.encode_one(task)?;
    let extracted_sections = ranker::rank_sections(&task_embedding, &corpus.sections, embedder, config)?;

    let mut dedup = DedupContext::new();
    let subsection_analysis = refine::extract_subsections(
        &task_embedding,
        &extracted_sections,
        &corpus.lines,
        embedder,
        config,
        &mut dedup,
    )?;

    Ok(CollectionAnalysis {
        extracted_sections,
        subsection_analysis,
    })
}
