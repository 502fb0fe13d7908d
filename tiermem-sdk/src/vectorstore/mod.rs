//! Vector Stores
//!
//! Storage and k-nearest-neighbor search over embedded [`Document`]s.
//!
//! # Search pipeline
//!
//! 1. Metadata filter (exact match on stringified values)
//! 2. Score with the selected [`SearchStrategy`]
//! 3. Drop scores below the threshold, when one is set
//! 4. Stable sort by descending score
//! 5. Take the top `k`
//!
//! # Example
//!
//! ```rust
//! use tiermem_core::Document;
//! use tiermem_sdk::vectorstore::{InMemoryVectorStore, SearchOptions, SearchStrategy, VectorStore};
//!
//! # async fn example() -> tiermem_sdk::MemoryResult<()> {
//! let store = InMemoryVectorStore::new();
//! store.add(&[Document::new("a", "apple")], &[vec![1.0, 0.0]]).await?;
//!
//! let hits = store
//!     .search(&[1.0, 0.0], 5, SearchOptions::new().with_strategy(SearchStrategy::DotProduct))
//!     .await?;
//! assert_eq!(hits[0].id, "a");
//! # Ok(())
//! # }
//! ```

mod hooks;
mod inmemory;
pub mod similarity;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tiermem_core::Document;

use crate::MemoryResult;

pub use hooks::{
    apply_vector_store_middleware, compose_vector_store_hooks, with_vector_store_hooks,
    HookedVectorStore, VectorStoreHooks, VectorStoreMiddleware,
};
pub use inmemory::InMemoryVectorStore;

// ─────────────────────────────────────────────────────────────────────────────
// Search Options
// ─────────────────────────────────────────────────────────────────────────────

/// Distance metric used to score candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// dot(a, b) / (|a| |b|)
    #[default]
    Cosine,
    /// Raw dot product
    DotProduct,
    /// Negated L2 distance, so closer scores higher
    Euclidean,
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStrategy::Cosine => write!(f, "cosine"),
            SearchStrategy::DotProduct => write!(f, "dot_product"),
            SearchStrategy::Euclidean => write!(f, "euclidean"),
        }
    }
}

/// Optional search parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Exact-match metadata filter. Empty matches every document.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub filter: HashMap<String, serde_json::Value>,

    /// Minimum score. Only applied when greater than zero.
    #[serde(default)]
    pub threshold: f64,

    #[serde(default)]
    pub strategy: SearchStrategy,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the metadata filter
    pub fn with_filter(mut self, filter: HashMap<String, serde_json::Value>) -> Self {
        self.filter = filter;
        self
    }

    /// Add one filter entry
    pub fn with_filter_entry(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.filter.insert(key.into(), value);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// VectorStore Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Embedding-indexed document storage.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert documents with their embeddings, overwriting documents whose id
    /// already exists. `docs` and `embeddings` must have equal lengths.
    async fn add(&self, docs: &[Document], embeddings: &[Vec<f32>]) -> MemoryResult<()>;

    /// Top `k` documents for `query`, each carrying its score.
    async fn search(
        &self,
        query: &[f32],
        k: usize,
        options: SearchOptions,
    ) -> MemoryResult<Vec<Document>>;

    /// Remove documents by id. Unknown ids are ignored.
    async fn delete(&self, ids: &[String]) -> MemoryResult<()>;
}
