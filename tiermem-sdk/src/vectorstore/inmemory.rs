use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tiermem_core::Document;
use tokio::sync::RwLock;

use super::similarity::{matches_filter, score};
use super::{SearchOptions, VectorStore};
use crate::{MemoryError, MemoryResult};

#[derive(Debug, Clone)]
struct Entry {
    document: Document,
    embedding: Vec<f32>,
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, Entry>,
    /// Insertion order; overwrites keep their original slot.
    order: Vec<String>,
}

/// Linear-scan vector store held in process memory.
///
/// Equal scores keep insertion order.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    state: RwLock<State>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add(&self, docs: &[Document], embeddings: &[Vec<f32>]) -> MemoryResult<()> {
        if docs.len() != embeddings.len() {
            return Err(MemoryError::LengthMismatch {
                docs: docs.len(),
                embeddings: embeddings.len(),
            });
        }

        let mut state = self.state.write().await;
        for (doc, embedding) in docs.iter().zip(embeddings) {
            let mut document = doc.clone();
            document.score = 0.0;
            let entry = Entry {
                document,
                embedding: embedding.clone(),
            };
            if state.entries.insert(doc.id.clone(), entry).is_none() {
                state.order.push(doc.id.clone());
            }
        }
        tracing::trace!(added = docs.len(), total = state.entries.len(), "vector store add");
        Ok(())
    }

    async fn search(
        &self,
        query: &[f32],
        k: usize,
        options: SearchOptions,
    ) -> MemoryResult<Vec<Document>> {
        let state = self.state.read().await;

        let mut scored: Vec<(f64, &Entry)> = state
            .order
            .iter()
            .filter_map(|id| state.entries.get(id))
            .filter(|entry| matches_filter(&entry.document.metadata, &options.filter))
            .map(|entry| (score(options.strategy, query, &entry.embedding), entry))
            // NaN scores come from corrupt embeddings and never rank
            .filter(|(s, _)| !s.is_nan())
            .filter(|(s, _)| options.threshold <= 0.0 || *s >= options.threshold)
            .collect();

        // stable: ties keep insertion order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(s, entry)| entry.document.scored(s))
            .collect())
    }

    async fn delete(&self, ids: &[String]) -> MemoryResult<()> {
        let mut state = self.state.write().await;
        let removed: HashSet<&str> = ids
            .iter()
            .filter(|id| state.entries.remove(id.as_str()).is_some())
            .map(String::as_str)
            .collect();
        if !removed.is_empty() {
            state.order.retain(|id| !removed.contains(id.as_str()));
        }
        Ok(())
    }
}
