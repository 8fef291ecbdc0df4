use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use docsift_core::{EmbedError, EmbeddingBackend};

/// fastembed-based implementation of [`EmbeddingBackend`].
///
/// Defaults to all-MiniLM-L6-v2, a small sentence-transformer that embeds
/// short texts (titles, single lines) into 384 dimensions. The ONNX model is
/// fetched into fastembed's cache directory on first use, then loaded from
/// disk. The model itself is frozen; this crate never trains anything.
pub struct FastembedBackend {
    model: TextEmbedding,
}

impl FastembedBackend {
    /// Load the default MiniLM model.
    pub fn new() -> Result<Self, EmbedError> {
        Self::with_model(EmbeddingModel::AllMiniLML6V2)
    }

    /// Load a specific fastembed model.
    pub fn with_model(model: EmbeddingModel) -> Result<Self, EmbedError> {
        tracing::info!(model = ?model, "loading embedding model");
        let text_embedding =
            TextEmbedding::try_new(InitOptions::new(model).with_show_download_progress(false))
                .map_err(|e| EmbedError::ModelLoad(e.to_string()))?;
        Ok(Self {
            model: text_embedding,
        })
    }
}

impl EmbeddingBackend for FastembedBackend {
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.model
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbedError::Encode(e.to_string()))
    }
}
