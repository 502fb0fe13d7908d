//! Local model embeddings via `fastembed` (all-MiniLM-L6-v2).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::Embedder;
use crate::{Error, Result};

/// Embedding dimensions for all-MiniLM-L6-v2
pub const FASTEMBED_DIMENSIONS: usize = 384;

/// Embedder running a local ONNX model. The model loads on first use.
#[derive(Clone, Default)]
pub struct FastEmbedder {
    model: Arc<RwLock<Option<fastembed::TextEmbedding>>>,
}

impl FastEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    async fn ensure_model(&self) -> Result<()> {
        use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

        if self.model.read().await.is_some() {
            return Ok(());
        }

        let mut guard = self.model.write().await;
        if guard.is_some() {
            return Ok(());
        }

        tracing::info!("Loading embedding model: all-MiniLM-L6-v2");
        let start = std::time::Instant::now();

        let mut options = InitOptions::default();
        options.model_name = EmbeddingModel::AllMiniLML6V2;
        options.show_download_progress = false;

        let model = TextEmbedding::try_new(options)
            .map_err(|e| Error::embedding(format!("failed to load embedding model: {e}")))?;

        tracing::info!("Embedding model loaded in {:?}", start.elapsed());
        *guard = Some(model);
        Ok(())
    }

    /// Whether the model has been loaded yet
    pub async fn is_loaded(&self) -> bool {
        self.model.read().await.is_some()
    }
}

#[async_trait]
impl Embedder for FastEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        self.ensure_model().await?;

        let guard = self.model.read().await;
        let model = guard
            .as_ref()
            .ok_or_else(|| Error::embedding("embedding model not initialized"))?;

        let vectors = model
            .embed(texts.to_vec(), None)
            .map_err(|e| Error::embedding(format!("failed to generate embeddings: {e}")))?;

        if vectors.len() != texts.len() {
            return Err(Error::embedding(format!(
                "model returned {} embeddings for {} texts",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        FASTEMBED_DIMENSIONS
    }
}
