//! Provider Registry
//!
//! Name-keyed factories for memories and vector stores. Registries are plain
//! values owned by the caller; there is no global state.
//!
//! | registry                | duplicate name   | built-ins                       |
//! |-------------------------|------------------|---------------------------------|
//! | [`MemoryRegistry`]      | replaces         | `composite`, `core`, `recall`   |
//! | [`VectorStoreRegistry`] | rejected         | `inmemory`                      |
//!
//! # Example
//!
//! ```rust
//! use tiermem_sdk::config::ProviderConfig;
//! use tiermem_sdk::registry::MemoryRegistry;
//!
//! # fn example() -> tiermem_sdk::MemoryResult<()> {
//! let registry = MemoryRegistry::with_builtins();
//! let memory = registry.create("composite", &ProviderConfig::new("composite"))?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::{CoreConfig, ProviderConfig};
use crate::memory::{CompositeMemory, CoreMemory, Memory, RecallMemory};
use crate::stores::InMemoryMessageStore;
use crate::vectorstore::{InMemoryVectorStore, VectorStore};
use crate::{MemoryError, MemoryResult};

/// Builds a provider instance from its configuration.
pub type Factory<T> = Arc<dyn Fn(&ProviderConfig) -> MemoryResult<Arc<T>> + Send + Sync>;

/// What `register` does when the name is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDuplicate {
    /// Last registration wins
    Replace,
    /// Fail with [`MemoryError::DuplicateProvider`]
    Reject,
}

/// Registry of provider factories producing `Arc<T>`.
pub struct Registry<T: ?Sized> {
    kind: &'static str,
    on_duplicate: OnDuplicate,
    factories: RwLock<HashMap<String, Factory<T>>>,
}

impl<T: ?Sized> Registry<T> {
    /// Empty registry. `kind` names the provider family in error messages.
    pub fn new(kind: &'static str, on_duplicate: OnDuplicate) -> Self {
        Self {
            kind,
            on_duplicate,
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// Register a factory under `name`
    pub fn register<F>(&self, name: impl Into<String>, factory: F) -> MemoryResult<()>
    where
        F: Fn(&ProviderConfig) -> MemoryResult<Arc<T>> + Send + Sync + 'static,
    {
        let name = name.into();
        let mut factories = self.factories.write();

        if self.on_duplicate == OnDuplicate::Reject && factories.contains_key(&name) {
            return Err(MemoryError::duplicate_provider(self.kind, name));
        }

        tracing::debug!(kind = self.kind, provider = %name, "registered provider");
        factories.insert(name, Arc::new(factory));
        Ok(())
    }

    /// Build the provider registered under `name`
    pub fn create(&self, name: &str, config: &ProviderConfig) -> MemoryResult<Arc<T>> {
        // release the lock before running the factory
        let factory = self
            .factories
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| MemoryError::unknown_provider(self.kind, name))?;
        factory(config)
    }

    /// Build the provider named by `config.provider`
    pub fn from_config(&self, config: &ProviderConfig) -> MemoryResult<Arc<T>> {
        self.create(&config.provider, config)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.read().contains_key(name)
    }

    /// Registered names, sorted
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
        names.sort();
        names
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory providers
// ─────────────────────────────────────────────────────────────────────────────

pub type MemoryRegistry = Registry<dyn Memory>;

impl Registry<dyn Memory> {
    /// Empty memory registry; duplicate registrations replace.
    pub fn memory() -> Self {
        Self::new("memory", OnDuplicate::Replace)
    }

    /// Memory registry with `composite`, `core` and `recall` registered.
    ///
    /// `composite` is a self-editable core tier plus recall over an in-memory
    /// log, with no archival tier. `composite` and `core` accept the
    /// [`CoreConfig`] keys as options.
    pub fn with_builtins() -> Self {
        let registry = Self::memory();
        {
            let mut factories = registry.factories.write();
            factories.insert("composite".into(), Arc::new(composite_factory));
            factories.insert("core".into(), Arc::new(core_factory));
            factories.insert("recall".into(), Arc::new(recall_factory));
        }
        registry
    }
}

fn build_core(config: &ProviderConfig) -> MemoryResult<CoreMemory> {
    let core = CoreConfig::from_provider(config)?;
    core.validate()?;
    CoreMemory::try_new(core)
}

fn in_memory_recall() -> RecallMemory {
    RecallMemory::new(Arc::new(InMemoryMessageStore::new()))
}

fn composite_factory(config: &ProviderConfig) -> MemoryResult<Arc<dyn Memory>> {
    let composite = CompositeMemory::new()
        .with_core(Arc::new(build_core(config)?))
        .with_recall(Arc::new(in_memory_recall()));
    Ok(Arc::new(composite))
}

fn core_factory(config: &ProviderConfig) -> MemoryResult<Arc<dyn Memory>> {
    Ok(Arc::new(build_core(config)?))
}

fn recall_factory(_config: &ProviderConfig) -> MemoryResult<Arc<dyn Memory>> {
    Ok(Arc::new(in_memory_recall()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Vector store providers
// ─────────────────────────────────────────────────────────────────────────────

pub type VectorStoreRegistry = Registry<dyn VectorStore>;

impl Registry<dyn VectorStore> {
    /// Empty vector store registry; duplicate registrations are rejected.
    pub fn vector_store() -> Self {
        Self::new("vectorstore", OnDuplicate::Reject)
    }

    /// Vector store registry with `inmemory` registered.
    pub fn with_builtins() -> Self {
        let registry = Self::vector_store();
        registry
            .factories
            .write()
            .insert("inmemory".into(), Arc::new(in_memory_vector_store_factory));
        registry
    }
}

fn in_memory_vector_store_factory(_config: &ProviderConfig) -> MemoryResult<Arc<dyn VectorStore>> {
    Ok(Arc::new(InMemoryVectorStore::new()))
}
