use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::Embedder;
use crate::Result;

/// Default vector width for [`HashEmbedder`].
pub const DEFAULT_HASH_DIMENSIONS: usize = 256;

/// Feature-hashing embedder.
///
/// Each lowercase alphanumeric token is hashed with SHA-256 into a signed
/// bucket; the bucket counts are L2-normalized. Identical texts always map to
/// identical vectors and texts sharing vocabulary score higher under cosine.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSIONS)
    }
}

impl HashEmbedder {
    /// Create an embedder producing vectors of `dimensions` width.
    /// A width of 0 is bumped to 1.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, token: &str) -> (usize, f32) {
        let digest = Sha256::digest(token.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let n = u64::from_le_bytes(head);
        let index = (n % self.dimensions as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }

    /// Embed synchronously. An empty or token-free text maps to the zero vector.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let (index, sign) = self.bucket(&token.to_lowercase());
            vector[index] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
