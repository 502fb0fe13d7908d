//! tiermem SDK - Tiered Memory for LLM Agents
//!
//! A MemGPT-style memory hierarchy for conversational agents:
//!
//! # Memory Tiers
//!
//! - **core** - bounded persona/human blocks always placed in context
//! - **recall** - verbatim conversation log with substring lookup
//! - **archival** - embedded turns searchable by vector similarity
//! - **composite** - one `Memory` fanning out to any mix of the above
//!
//! # Supporting Modules
//!
//! - **stores** - message log stores (in-memory, SQLite) and a graph store
//! - **vectorstore** - `VectorStore` contract and the in-memory similarity engine
//! - **registry** - name-keyed provider factories
//! - **config** - serde/TOML configuration
//!
//! Every `Memory` and `VectorStore` can be wrapped with hooks through the
//! middleware helpers in [`memory`] and [`vectorstore`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tiermem_core::{HashEmbedder, Message};
//! use tiermem_sdk::memory::{
//!     apply_middleware, with_hooks, ArchivalMemory, CompositeMemory, CoreMemory, Hooks, Memory,
//!     RecallMemory,
//! };
//! use tiermem_sdk::stores::InMemoryMessageStore;
//! use tiermem_sdk::vectorstore::InMemoryVectorStore;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let core = Arc::new(CoreMemory::default());
//!     core.set_persona("You are a concise assistant.")?;
//!
//!     let composite = CompositeMemory::new()
//!         .with_core(core)
//!         .with_recall(Arc::new(RecallMemory::new(Arc::new(InMemoryMessageStore::new()))))
//!         .with_archival(Arc::new(ArchivalMemory::new(
//!             Arc::new(InMemoryVectorStore::new()),
//!             Arc::new(HashEmbedder::default()),
//!         )));
//!
//!     let memory = apply_middleware(Arc::new(composite), [with_hooks(Hooks::logging("chat"))]);
//!
//!     memory.save(&Message::human("I live in Lisbon"), &Message::ai("Noted!")).await?;
//!     let context = memory.load("").await?;
//!     let related = memory.search("where do I live", 3).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod memory;
pub mod registry;
pub mod stores;
pub mod vectorstore;

mod error;

#[cfg(test)]
mod test_support;

pub use config::{ConfigValidationError, CoreConfig, MemoryConfig, ProviderConfig};
pub use error::{MemoryError, MemoryResult};
pub use memory::{
    ArchivalMemory, CompositeMemory, CoreMemory, Hooks, HookedMemory, Memory, Middleware,
    RecallMemory,
};
pub use registry::{MemoryRegistry, VectorStoreRegistry};
pub use stores::{GraphStore, InMemoryGraphStore, InMemoryMessageStore, MessageStore};
pub use vectorstore::{InMemoryVectorStore, SearchOptions, SearchStrategy, VectorStore};

#[cfg(feature = "sqlite")]
pub use stores::SqliteMessageStore;

// Re-export core types
pub use tiermem_core::{ContentPart, Document, Embedder, HashEmbedder, Message, Role};
