use thiserror::Error;

/// Number of components in a [`FeatureVector`].
pub const FEATURE_COUNT: usize = 15;

/// Fixed-order numeric features derived from one text line.
///
/// Component order is part of the frozen-model contract and must match the
/// order the classifier was trained with: font size, bold flag, centered
/// flag, italic flag, page number, x-offset, raw length, trimmed length,
/// word count, digit flag, colon flag, uppercase fraction, structural-keyword
/// flag, fully-uppercase flag, font-size bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(pub [f32; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Classifier output for one line: a heading class name, or the "none"
/// sentinel meaning the line is not structurally significant.
///
/// The class set is open (whatever the frozen encoder was trained with),
/// so heading classes are carried as strings rather than a closed enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralLabel {
    None,
    Heading(String),
}

impl StructuralLabel {
    /// Map an encoder class name to a label. The sentinel is matched
    /// case-insensitively, so "None", "none", and "NONE" all decode the same.
    pub fn from_class(name: &str) -> Self {
        if name.eq_ignore_ascii_case("none") {
            StructuralLabel::None
        } else {
            StructuralLabel::Heading(name.to_string())
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, StructuralLabel::Heading(_))
    }
}

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("prediction failed: {0}")]
    Prediction(String),
}

/// Trait for frozen heading classifiers.
///
/// Implementors wrap a pre-trained model plus label encoder; the pipeline
/// performs no training and no fallback. A failed prediction is a hard error
/// and abandons the enclosing document attempt rather than silently
/// degrading to the sentinel label.
pub trait HeadingClassifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<StructuralLabel, ClassifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_class_is_case_insensitive() {
        assert_eq!(StructuralLabel::from_class("None"), StructuralLabel::None);
        assert_eq!(StructuralLabel::from_class("none"), StructuralLabel::None);
        assert_eq!(StructuralLabel::from_class("NONE"), StructuralLabel::None);
    }

    #[test]
    fn heading_classes_keep_their_name() {
        let label = StructuralLabel::from_class("h1");
        assert_eq!(label, StructuralLabel::Heading("h1".to_string()));
        assert!(label.is_heading());
        assert!(!StructuralLabel::None.is_heading());
    }
}
