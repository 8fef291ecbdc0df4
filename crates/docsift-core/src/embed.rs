use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("failed to load embedding model: {0}")]
    ModelLoad(String),
    #[error("failed to encode text: {0}")]
    Encode(String),
}

/// Trait for sentence-embedding backends.
///
/// Implementors wrap a frozen embedding model. Batching is an implementation
/// detail for throughput; a batch call must be logically equivalent to
/// encoding each text on its own.
pub trait EmbeddingBackend: Send + Sync {
    /// Encode a batch of texts into fixed-dimension vectors, one per input,
    /// in input order.
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Encode a single text.
    fn encode_one(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.encode_batch(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::Encode("backend returned no vector".into()))
    }
}

/// Normalized dot-product similarity between two embedding vectors.
///
/// Returns 0.0 for mismatched dimensions or zero-norm inputs, so degenerate
/// vectors rank last instead of poisoning the sort with NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
