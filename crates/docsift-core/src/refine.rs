use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::RankingConfig;
use crate::embed::{EmbedError, EmbeddingBackend, cosine_similarity};
use crate::{CorpusLine, RankedSection, SubsectionAnalysis};

/// Tracks passages already claimed by a higher-ranked section.
///
/// Owned by a single collection run and threaded through the refinement
/// loop; never shared across collections.
#[derive(Debug, Default)]
pub struct DedupContext {
    used: HashSet<String>,
}

impl DedupContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_used(&self, text: &str) -> bool {
        self.used.contains(text)
    }

    pub fn mark_used(&mut self, text: &str) {
        self.used.insert(text.to_string());
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

/// Refine supporting passages for each ranked section, in rank order.
///
/// Candidates are the owning document's corpus lines on the section's page
/// or the immediately following page, minus lines that repeat the section
/// title and lines a higher-ranked section already claimed. The top
/// `max_passages` scoring strictly above the similarity floor survive; a
/// section with no survivors contributes no entry.
pub fn extract_subsections(
    task_embedding: &[f32],
    ranked: &[RankedSection],
    lines: &[CorpusLine],
    embedder: &dyn EmbeddingBackend,
    config: &RankingConfig,
    dedup: &mut DedupContext,
) -> Result<Vec<SubsectionAnalysis>, EmbedError> {
    let mut analyses = Vec::new();

    for section in ranked {
        let candidates: Vec<String> = lines
            .iter()
            .filter(|line| {
                line.document == section.document
                    && (line.page == section.page_number || line.page == section.page_number + 1)
                    && !line.text.contains(&section.section_title)
                    && !dedup.is_used(&line.text)
            })
            .map(|line| line.text.clone())
            .collect();

        if candidates.is_empty() {
            continue;
        }

        let embeddings = embedder.encode_batch(&candidates)?;

        let mut scored: Vec<(f32, usize)> = embeddings
            .iter()
            .enumerate()
            .map(|(i, embedding)| (cosine_similarity(task_embedding, embedding), i))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let selected: Vec<&String> = scored
            .into_iter()
            .take(config.max_passages)
            .filter(|(score, _)| *score > config.similarity_floor)
            .map(|(_, i)| &candidates[i])
            .collect();

        if selected.is_empty() {
            continue;
        }

        for text in &selected {
            dedup.mark_used(text);
        }

        analyses.push(SubsectionAnalysis {
            document: section.document.clone(),
            refined_text: selected
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            page_number: section.page_number,
        });
    }

    Ok(analyses)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scores each text by a score embedded in the text itself: a line
    /// "p:<score>" maps to a vector whose cosine against [1, 0] is <score>.
    struct ScoredEmbedder;

    impl EmbeddingBackend for ScoredEmbedder {
        fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(texts
                .iter()
                .map(|t| {
                    let score: f32 = t
                        .rsplit(':')
                        .next()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(0.0);
                    vec![score, (1.0 - score * score).max(0.0).sqrt()]
                })
                .collect())
        }
    }

    const TASK: [f32; 2] = [1.0, 0.0];

    fn section(doc: &str, title: &str, rank: u32, page: u32) -> RankedSection {
        RankedSection {
            document: doc.to_string(),
            section_title: title.to_string(),
            importance_rank: rank,
            page_number: page,
        }
    }

    fn line(doc: &str, text: &str, page: u32) -> CorpusLine {
        CorpusLine {
            document: doc.to_string(),
            text: text.to_string(),
            page,
        }
    }

    #[test]
    fn selects_passages_above_floor_in_score_order() {
        let ranked = vec![section("a.pdf", "Overview", 1, 1)];
        let lines = vec![
            line("a.pdf", "weak p:0.1", 1),
            line("a.pdf", "strong p:0.9", 1),
            line("a.pdf", "medium p:0.5", 2),
        ];
        let mut dedup = DedupContext::new();
        let analyses = extract_subsections(
            &TASK,
            &ranked,
            &lines,
            &ScoredEmbedder,
            &RankingConfig::default(),
            &mut dedup,
        )
        .unwrap();
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].refined_text, "strong p:0.9\nmedium p:0.5");
        assert_eq!(analyses[0].page_number, 1);
        assert_eq!(dedup.len(), 2);
    }

    #[test]
    fn floor_is_strict_and_cap_is_five() {
        let ranked = vec![section("a.pdf", "Overview", 1, 1)];
        let mut lines: Vec<CorpusLine> = (0..8)
            .map(|i| line("a.pdf", &format!("passage {i} p:0.9{i}"), 1))
            .collect();
        // Exactly at the floor: must NOT be selected
        lines.push(line("a.pdf", "borderline p:0.3", 1));
        let mut dedup = DedupContext::new();
        let analyses = extract_subsections(
            &TASK,
            &ranked,
            &lines,
            &ScoredEmbedder,
            &RankingConfig::default(),
            &mut dedup,
        )
        .unwrap();
        let selected: Vec<&str> = analyses[0].refined_text.lines().collect();
        assert_eq!(selected.len(), 5);
        assert!(!analyses[0].refined_text.contains("borderline"));
    }

    #[test]
    fn passages_are_never_shared_between_sections() {
        let ranked = vec![
            section("a.pdf", "First", 1, 1),
            section("a.pdf", "Second", 2, 1),
        ];
        let lines = vec![
            line("a.pdf", "shared p:0.9", 1),
            line("a.pdf", "other p:0.8", 2),
        ];
        let mut dedup = DedupContext::new();
        let analyses = extract_subsections(
            &TASK,
            &ranked,
            &lines,
            &ScoredEmbedder,
            &RankingConfig::default(),
            &mut dedup,
        )
        .unwrap();
        // Rank 1 claims both candidates; rank 2 has none left
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].document, "a.pdf");
        assert!(analyses[0].refined_text.contains("shared"));
    }

    #[test]
    fn candidates_are_scoped_by_document_and_page_window() {
        let ranked = vec![section("a.pdf", "Overview", 1, 2)];
        let lines = vec![
            line("b.pdf", "other doc p:0.9", 2),
            line("a.pdf", "previous page p:0.9", 1),
            line("a.pdf", "on page p:0.8", 2),
            line("a.pdf", "next page p:0.7", 3),
            line("a.pdf", "too far p:0.9", 4),
        ];
        let mut dedup = DedupContext::new();
        let analyses = extract_subsections(
            &TASK,
            &ranked,
            &lines,
            &ScoredEmbedder,
            &RankingConfig::default(),
            &mut dedup,
        )
        .unwrap();
        assert_eq!(
            analyses[0].refined_text,
            "on page p:0.8\nnext page p:0.7"
        );
    }

    #[test]
    fn lines_repeating_the_title_are_excluded() {
        let ranked = vec![section("a.pdf", "Budget", 1, 1)];
        let lines = vec![
            line("a.pdf", "Budget overview table p:0.9", 1),
            line("a.pdf", "spending detail p:0.8", 1),
        ];
        let mut dedup = DedupContext::new();
        let analyses = extract_subsections(
            &TASK,
            &ranked,
            &lines,
            &ScoredEmbedder,
            &RankingConfig::default(),
            &mut dedup,
        )
        .unwrap();
        assert_eq!(analyses[0].refined_text, "spending detail p:0.8");
    }

    #[test]
    fn section_without_candidates_contributes_no_entry() {
        let ranked = vec![
            section("a.pdf", "Empty", 1, 9),
            section("a.pdf", "Full", 2, 1),
        ];
        let lines = vec![line("a.pdf", "content p:0.9", 1)];
        let mut dedup = DedupContext::new();
        let analyses = extract_subsections(
            &TASK,
            &ranked,
            &lines,
            &ScoredEmbedder,
            &RankingConfig::default(),
            &mut dedup,
        )
        .unwrap();
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].page_number, 1);
    }

    #[test]
    fn all_passages_below_floor_contributes_no_entry() {
        let ranked = vec![section("a.pdf", "Overview", 1, 1)];
        let lines = vec![line("a.pdf", "weak p:0.1", 1)];
        let mut dedup = DedupContext::new();
        let analyses = extract_subsections(
            &TASK,
            &ranked,
            &lines,
            &ScoredEmbedder,
            &RankingConfig::default(),
            &mut dedup,
        )
        .unwrap();
        assert!(analyses.is_empty());
        assert!(dedup.is_empty());
    }
}
