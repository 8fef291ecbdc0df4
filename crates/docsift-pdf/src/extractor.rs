use docsift_core::{ClassifyError, CorpusLine, Heading, HeadingClassifier, RawLine};

use crate::aggregate::HeadingAggregator;
use crate::config::ExtractionConfig;
use crate::features::extract_features;

/// Everything one document contributes to the collection corpus.
#[derive(Debug, Clone, Default)]
pub struct DocumentExtraction {
    pub headings: Vec<Heading>,
    pub lines: Vec<CorpusLine>,
}

/// Per-document extraction pipeline: raw lines → features → classification →
/// heading aggregation.
///
/// Every surviving line, heading or not, lands in the corpus for later
/// passage search. A classifier failure abandons the whole document attempt;
/// the caller decides whether that is fatal (single-document mode) or
/// recovered (batch mode).
pub struct DocumentProcessor<'a> {
    classifier: &'a dyn HeadingClassifier,
    config: &'a ExtractionConfig,
}

impl<'a> DocumentProcessor<'a> {
    pub fn new(classifier: &'a dyn HeadingClassifier, config: &'a ExtractionConfig) -> Self {
        Self { classifier, config }
    }

    pub fn process(
        &self,
        document: &str,
        raw_lines: &[RawLine],
    ) -> Result<DocumentExtraction, ClassifyError> {
        let mut aggregator = HeadingAggregator::new(document, self.config);
        let mut lines = Vec::new();

        for line in raw_lines {
            if line.text.trim().chars().count() < self.config.min_line_chars() {
                continue;
            }

            let features = extract_features(line);
            let label = self.classifier.predict(&features)?;

            lines.push(CorpusLine {
                document: document.to_string(),
                text: line.text.clone(),
                page: line.page,
            });

            aggregator.observe(&line.text, &label, line.font_size, line.page);
        }

        Ok(DocumentExtraction {
            headings: aggregator.finish(),
            lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsift_core::{FeatureVector, StructuralLabel};

    /// Labels every line at or above 14pt as a heading.
    struct SizeClassifier;

    impl HeadingClassifier for SizeClassifier {
        fn predict(&self, features: &FeatureVector) -> Result<StructuralLabel, ClassifyError> {
            if features.as_slice()[0] >= 14.0 {
                Ok(StructuralLabel::Heading("h1".to_string()))
            } else {
                Ok(StructuralLabel::None)
            }
        }
    }

    struct FailingClassifier;

    impl HeadingClassifier for FailingClassifier {
        fn predict(&self, _features: &FeatureVector) -> Result<StructuralLabel, ClassifyError> {
            Err(ClassifyError::Prediction("model refused".to_string()))
        }
    }

    fn raw(text: &str, font_size: f32, page: u32) -> RawLine {
        RawLine {
            text: text.to_string(),
            page,
            font_size,
            is_bold: false,
            is_italic: false,
            is_centered: false,
            x_offset: 50.0,
        }
    }

    #[test]
    fn executive_summary_scenario() {
        let lines = vec![
            raw("Executive", 20.0, 1),
            raw("Summary", 20.0, 1),
            raw("Quarterly revenue grew by twelve percent.", 11.0, 1),
        ];
        let config = ExtractionConfig::default();
        let processor = DocumentProcessor::new(&SizeClassifier, &config);
        let extraction = processor.process("q3.pdf", &lines).unwrap();

        assert_eq!(extraction.headings.len(), 1);
        assert_eq!(extraction.headings[0].section_title, "Executive Summary");
        assert_eq!(extraction.headings[0].page_number, 1);
        assert_eq!(extraction.lines.len(), 3);
    }

    #[test]
    fn short_lines_never_reach_features_or_corpus() {
        let lines = vec![
            raw("ok", 20.0, 1),
            raw(" a ", 20.0, 1),
            raw("long enough", 11.0, 1),
        ];
        let config = ExtractionConfig::default();
        let processor = DocumentProcessor::new(&SizeClassifier, &config);
        let extraction = processor.process("doc.pdf", &lines).unwrap();

        assert!(extraction.headings.is_empty());
        assert_eq!(extraction.lines.len(), 1);
        assert_eq!(extraction.lines[0].text, "long enough");
    }

    #[test]
    fn corpus_keeps_non_heading_lines_with_pages() {
        let lines = vec![
            raw("Section Title", 18.0, 2),
            raw("body line on page two", 11.0, 2),
            raw("body line on page three", 11.0, 3),
        ];
        let config = ExtractionConfig::default();
        let processor = DocumentProcessor::new(&SizeClassifier, &config);
        let extraction = processor.process("doc.pdf", &lines).unwrap();

        assert_eq!(extraction.headings.len(), 1);
        let pages: Vec<u32> = extraction.lines.iter().map(|l| l.page).collect();
        assert_eq!(pages, vec![2, 2, 3]);
        assert!(extraction.lines.iter().all(|l| l.document == "doc.pdf"));
    }

    #[test]
    fn classifier_failure_abandons_the_document() {
        let lines = vec![raw("Some Title", 20.0, 1)];
        let config = ExtractionConfig::default();
        let processor = DocumentProcessor::new(&FailingClassifier, &config);
        assert!(processor.process("doc.pdf", &lines).is_err());
    }
}
