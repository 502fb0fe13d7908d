//! Tiered Memory
//!
//! MemGPT-style memory hierarchy behind a single [`Memory`] contract:
//!
//! - **Core** - two bounded text blocks (persona, human) always placed in context
//! - **Recall** - verbatim conversation log over a [`MessageStore`](crate::stores::MessageStore)
//! - **Archival** - embedded turns in a [`VectorStore`](crate::vectorstore::VectorStore),
//!   searchable by similarity
//! - **Composite** - fans each operation out to the configured tiers
//!
//! Any `Memory` can be wrapped with [`Hooks`] through [`with_hooks`] and
//! [`apply_middleware`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tiermem_core::Message;
//! use tiermem_sdk::memory::{CompositeMemory, CoreMemory, Memory, RecallMemory};
//! use tiermem_sdk::stores::InMemoryMessageStore;
//!
//! # async fn example() -> tiermem_sdk::MemoryResult<()> {
//! let core = Arc::new(CoreMemory::default());
//! core.set_persona("You are a patient tutor.")?;
//!
//! let memory = CompositeMemory::new()
//!     .with_core(core)
//!     .with_recall(Arc::new(RecallMemory::new(Arc::new(InMemoryMessageStore::new()))));
//!
//! memory.save(&Message::human("hi"), &Message::ai("hello")).await?;
//! let context = memory.load("").await?;
//! assert_eq!(context.len(), 3);
//! # Ok(())
//! # }
//! ```

mod archival;
mod composite;
mod core;
mod hooks;
mod middleware;
mod recall;

use async_trait::async_trait;
use tiermem_core::{Document, Message};

use crate::MemoryResult;

pub use self::core::CoreMemory;
pub use archival::{ArchivalMemory, DEFAULT_ARCHIVAL_K};
pub use composite::CompositeMemory;
pub use hooks::{compose_hooks, Hooks};
pub use middleware::{apply_middleware, with_hooks, HookedMemory, Middleware};
pub use recall::{RecallMemory, RECALL_LOAD_LIMIT};

/// Conversational memory contract implemented by every tier.
#[async_trait]
pub trait Memory: Send + Sync {
    /// Persist one conversational turn.
    async fn save(&self, input: &Message, output: &Message) -> MemoryResult<()>;

    /// Messages relevant to `query`. An empty query means "everything this tier
    /// contributes to context".
    async fn load(&self, query: &str) -> MemoryResult<Vec<Message>>;

    /// Up to `k` documents ranked by relevance to `query`.
    async fn search(&self, query: &str, k: usize) -> MemoryResult<Vec<Document>>;

    /// Reset this tier's contents.
    async fn clear(&self) -> MemoryResult<()>;
}
