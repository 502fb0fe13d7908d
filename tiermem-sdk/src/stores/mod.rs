//! Message and graph stores backing the memory tiers.
//!
//! - [`InMemoryMessageStore`] - process-local ordered log
//! - `SqliteMessageStore` (feature `sqlite`) - persistent log in SQLite
//! - [`InMemoryGraphStore`] - entity/relation graph with neighbor traversal

mod graph;
mod inmemory;

#[cfg(feature = "sqlite")]
pub mod migrations;
#[cfg(feature = "sqlite")]
mod sqlite;

use async_trait::async_trait;
use tiermem_core::Message;

use crate::MemoryResult;

pub use graph::{Entity, GraphResult, GraphStore, InMemoryGraphStore, Relation};
pub use inmemory::InMemoryMessageStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteMessageStore;

/// Ordered, append-only message log with substring search.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a message to the end of the log.
    async fn append(&self, message: &Message) -> MemoryResult<()>;

    /// Messages whose text contains `query` case-insensitively, in log order.
    /// An empty query matches every message. `k == 0` means no limit.
    async fn search(&self, query: &str, k: usize) -> MemoryResult<Vec<Message>>;

    /// Every message in log order.
    async fn all(&self) -> MemoryResult<Vec<Message>>;

    /// Remove every message.
    async fn clear(&self) -> MemoryResult<()>;
}

/// Case-insensitive substring match over a message's text.
pub(crate) fn matches_query(message: &Message, lowered_query: &str) -> bool {
    lowered_query.is_empty() || message.text().to_lowercase().contains(lowered_query)
}
