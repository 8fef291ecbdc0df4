use std::cmp::Ordering;

use crate::config::RankingConfig;
use crate::embed::{EmbedError, EmbeddingBackend, cosine_similarity};
use crate::{Heading, RankedSection};

/// Rank candidate sections against the task embedding.
///
/// Titles are embedded in one batch, scored by cosine similarity against the
/// task, and the top `max_sections` survive with importance ranks 1..K.
/// The sort is stable, so equal scores keep their original corpus order and
/// repeated runs with identical embeddings produce identical rankings.
pub fn rank_sections(
    task_embedding: &[f32],
    sections: &[Heading],
    embedder: &dyn EmbeddingBackend,
    config: &RankingConfig,
) -> Result<Vec<RankedSection>, EmbedError> {
    if sections.is_empty() {
        return Ok(Vec::new());
    }

    let titles: Vec<String> = sections.iter().map(|s| s.section_title.clone()).collect();
    let title_embeddings = embedder.encode_batch(&titles)?;

    let mut scored: Vec<(f32, &Heading)> = sections
        .iter()
        .zip(title_embeddings.iter())
        .map(|(section, embedding)| (cosine_similarity(task_embedding, embedding), section))
        .collect();

    // Stable sort: ties keep input order
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    Ok(scored
        .into_iter()
        .take(config.max_sections)
        .enumerate()
        .map(|(i, (_score, section))| RankedSection {
            document: section.document.clone(),
            section_title: section.section_title.clone(),
            importance_rank: (i + 1) as u32,
            page_number: section.page_number,
        })
        .collect())
}
