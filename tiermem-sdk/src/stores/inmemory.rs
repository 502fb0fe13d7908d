use async_trait::async_trait;
use tiermem_core::Message;
use tokio::sync::RwLock;

use super::{matches_query, MessageStore};
use crate::MemoryResult;

/// Message log held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    messages: RwLock<Vec<Message>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, message: &Message) -> MemoryResult<()> {
        self.messages.write().await.push(message.clone());
        Ok(())
    }

    async fn search(&self, query: &str, k: usize) -> MemoryResult<Vec<Message>> {
        let lowered = query.to_lowercase();
        let limit = if k == 0 { usize::MAX } else { k };
        let messages = self.messages.read().await;
        Ok(messages
            .iter()
            .filter(|m| matches_query(m, &lowered))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn all(&self) -> MemoryResult<Vec<Message>> {
        Ok(self.messages.read().await.clone())
    }

    async fn clear(&self) -> MemoryResult<()> {
        self.messages.write().await.clear();
        Ok(())
    }
}
