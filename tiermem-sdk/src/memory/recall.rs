//! Recall memory: the verbatim conversation log.

use std::sync::Arc;

use async_trait::async_trait;
use tiermem_core::{Document, Message};

use super::Memory;
use crate::stores::MessageStore;
use crate::MemoryResult;

/// Maximum messages returned by a non-empty `load` query
pub const RECALL_LOAD_LIMIT: usize = 20;

/// Every conversational turn, appended to a [`MessageStore`] in order.
pub struct RecallMemory {
    store: Arc<dyn MessageStore>,
}

impl RecallMemory {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Backing store
    pub fn store(&self) -> &Arc<dyn MessageStore> {
        &self.store
    }
}

#[async_trait]
impl Memory for RecallMemory {
    async fn save(&self, input: &Message, output: &Message) -> MemoryResult<()> {
        self.store.append(input).await?;
        self.store.append(output).await
    }

    /// Empty query: the whole log. Otherwise up to 20 substring matches.
    async fn load(&self, query: &str) -> MemoryResult<Vec<Message>> {
        if query.is_empty() {
            return self.store.all().await;
        }
        self.store.search(query, RECALL_LOAD_LIMIT).await
    }

    async fn search(&self, _query: &str, _k: usize) -> MemoryResult<Vec<Document>> {
        Ok(Vec::new())
    }

    async fn clear(&self) -> MemoryResult<()> {
        self.store.clear().await
    }
}
