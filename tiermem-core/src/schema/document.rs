//! Retrievable documents.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A unit of retrievable content.
///
/// `score` is only meaningful on documents returned from a search; stores
/// never persist it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub score: f64,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Copy of this document carrying a retrieval score
    pub fn scored(&self, score: f64) -> Self {
        Self {
            score,
            ..self.clone()
        }
    }
}
