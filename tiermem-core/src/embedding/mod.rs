//! Embedding providers.
//!
//! An [`Embedder`] turns text into dense vectors for the archival tier and
//! any vector store. Two implementations ship with the crate:
//!
//! - [`HashEmbedder`]: deterministic feature hashing, no model download.
//!   Good enough for tests and small keyword-heavy corpora.
//! - `FastEmbedder` (feature `fastembed`): local all-MiniLM-L6-v2 inference
//!   with lazy model loading.
//!
//! # Example
//!
//! ```rust
//! use tiermem_core::embedding::{Embedder, HashEmbedder};
//!
//! # async fn example() -> tiermem_core::Result<()> {
//! let embedder = HashEmbedder::new(64);
//! let vector = embedder.embed_single("remember the milk").await?;
//! assert_eq!(vector.len(), embedder.dimensions());
//! # Ok(())
//! # }
//! ```

mod hash;

#[cfg(feature = "fastembed")]
mod local;

use async_trait::async_trait;

use crate::{Error, Result};

pub use hash::{DEFAULT_HASH_DIMENSIONS, HashEmbedder};

#[cfg(feature = "fastembed")]
pub use local::{FastEmbedder, FASTEMBED_DIMENSIONS};

/// Converts text into embedding vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts. The result has one vector per input, in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding("no embedding generated"))
    }

    /// Dimensionality of produced vectors.
    fn dimensions(&self) -> usize;
}
