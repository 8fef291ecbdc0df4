//! Frozen heading-classifier artifact.
//!
//! Training happens elsewhere; this crate only loads a serialized artifact
//! (the label encoder's class list plus a decision-tree ensemble over the
//! fixed line features) and answers predictions through the
//! [`HeadingClassifier`] seam. There is no retraining and no fallback: a
//! malformed artifact fails at load time, a broken prediction fails hard.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use docsift_core::{
    ClassifyError, FEATURE_COUNT, FeatureVector, HeadingClassifier, StructuralLabel,
};

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model artifact is invalid: {0}")]
    Invalid(String),
}

/// On-disk JSON artifact: encoder classes plus a decision-tree ensemble.
///
/// Trees are stored as flat node arrays; evaluation starts at node 0 and
/// walks left when `feature <= threshold`. Class indices in leaves map into
/// `classes`, which doubles as the label encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub classes: Vec<String>,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf {
        leaf: usize,
    },
}

/// Majority-vote tree-ensemble classifier over the frozen artifact.
pub struct TreeEnsembleClassifier {
    artifact: ModelArtifact,
}

impl TreeEnsembleClassifier {
    /// Load and validate an artifact from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        let artifact: ModelArtifact = serde_json::from_str(&content)?;
        let classifier = Self::from_artifact(artifact)?;
        tracing::info!(
            path = %path.display(),
            classes = classifier.artifact.classes.len(),
            trees = classifier.artifact.trees.len(),
            "loaded heading classifier"
        );
        Ok(classifier)
    }

    /// Validate and wrap an already-deserialized artifact.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        validate(&artifact)?;
        Ok(Self { artifact })
    }

    pub fn classes(&self) -> &[String] {
        &self.artifact.classes
    }

    fn eval_tree(&self, tree: &Tree, features: &[f32]) -> Result<usize, ClassifyError> {
        let mut index = 0;
        // Index validity is checked at load time; the step bound guards
        // against cyclic node graphs, which validation cannot rule out.
        for _ in 0..=tree.nodes.len() {
            match &tree.nodes[index] {
                Node::Leaf { leaf } => return Ok(*leaf),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
        Err(ClassifyError::Prediction(
            "tree evaluation did not reach a leaf".to_string(),
        ))
    }
}

impl HeadingClassifier for TreeEnsembleClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<StructuralLabel, ClassifyError> {
        let mut votes = vec![0usize; self.artifact.classes.len()];
        for tree in &self.artifact.trees {
            let class = self.eval_tree(tree, features.as_slice())?;
            votes[class] += 1;
        }

        // Ties resolve to the lowest class index, matching encoder order
        let mut winner = 0;
        for (index, &count) in votes.iter().enumerate() {
            if count > votes[winner] {
                winner = index;
            }
        }

        Ok(StructuralLabel::from_class(&self.artifact.classes[winner]))
    }
}

fn validate(artifact: &ModelArtifact) -> Result<(), ModelError> {
    if artifact.classes.is_empty() {
        return Err(ModelError::Invalid("empty class list".to_string()));
    }
    if artifact.trees.is_empty() {
        return Err(ModelError::Invalid("empty tree ensemble".to_string()));
    }

    for (tree_index, tree) in artifact.trees.iter().enumerate() {
        if tree.nodes.is_empty() {
            return Err(ModelError::Invalid(format!(
                "tree {tree_index} has no nodes"
            )));
        }
        for (node_index, node) in tree.nodes.iter().enumerate() {
            match node {
                Node::Leaf { leaf } => {
                    if *leaf >= artifact.classes.len() {
                        return Err(ModelError::Invalid(format!(
                            "tree {tree_index} node {node_index}: class index {leaf} out of range"
                        )));
                    }
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(ModelError::Invalid(format!(
                            "tree {tree_index} node {node_index}: feature index {feature} out of range"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelError::Invalid(format!(
                            "tree {tree_index} node {node_index}: non-finite threshold"
                        )));
                    }
                    if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                        return Err(ModelError::Invalid(format!(
                            "tree {tree_index} node {node_index}: child index out of range"
                        )));
                    }
                }
            }
        }
    }

    Ok(())
}
