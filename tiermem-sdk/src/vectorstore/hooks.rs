//! VectorStore hooks and middleware.
//!
//! Same composition rules as the memory hooks: `before_add` hooks run in
//! order and the first error aborts, `after_search` hooks all run in order.
//! `delete` passes straight through.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tiermem_core::Document;

use super::{SearchOptions, VectorStore};
use crate::{MemoryError, MemoryResult};

/// Runs before `add`; an error aborts the add.
pub type BeforeAddFn = Arc<dyn Fn(&[Document]) -> MemoryResult<()> + Send + Sync>;

/// Observes the final search outcome.
pub type AfterSearchFn = Arc<dyn Fn(&[Document], Option<&MemoryError>) + Send + Sync>;

/// Transforms one store into another, typically by wrapping it.
pub type VectorStoreMiddleware = Arc<dyn Fn(Arc<dyn VectorStore>) -> Arc<dyn VectorStore> + Send + Sync>;

/// Optional callbacks around vector store operations.
#[derive(Clone, Default)]
pub struct VectorStoreHooks {
    pub before_add: Option<BeforeAddFn>,
    pub after_search: Option<AfterSearchFn>,
}

impl fmt::Debug for VectorStoreHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorStoreHooks")
            .field("before_add", &self.before_add.is_some())
            .field("after_search", &self.after_search.is_some())
            .finish()
    }
}

impl VectorStoreHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before_add<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Document]) -> MemoryResult<()> + Send + Sync + 'static,
    {
        self.before_add = Some(Arc::new(f));
        self
    }

    pub fn after_search<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Document], Option<&MemoryError>) + Send + Sync + 'static,
    {
        self.after_search = Some(Arc::new(f));
        self
    }
}

/// Merge several hook sets into one whose callbacks are always set.
pub fn compose_vector_store_hooks(hooks: impl IntoIterator<Item = VectorStoreHooks>) -> VectorStoreHooks {
    let hooks: Arc<Vec<VectorStoreHooks>> = Arc::new(hooks.into_iter().collect());

    let before = hooks.clone();
    let after = hooks;

    VectorStoreHooks::new()
        .before_add(move |docs| {
            for hook in before.iter().filter_map(|h| h.before_add.as_ref()) {
                hook(docs)?;
            }
            Ok(())
        })
        .after_search(move |results, err| {
            for hook in after.iter().filter_map(|h| h.after_search.as_ref()) {
                hook(results, err);
            }
        })
}

/// A store wrapped with [`VectorStoreHooks`].
pub struct HookedVectorStore {
    inner: Arc<dyn VectorStore>,
    hooks: VectorStoreHooks,
}

impl HookedVectorStore {
    pub fn new(inner: Arc<dyn VectorStore>, hooks: VectorStoreHooks) -> Self {
        Self { inner, hooks }
    }
}

#[async_trait]
impl VectorStore for HookedVectorStore {
    async fn add(&self, docs: &[Document], embeddings: &[Vec<f32>]) -> MemoryResult<()> {
        if let Some(before) = &self.hooks.before_add {
            before(docs)?;
        }
        self.inner.add(docs, embeddings).await
    }

    async fn search(
        &self,
        query: &[f32],
        k: usize,
        options: SearchOptions,
    ) -> MemoryResult<Vec<Document>> {
        let result = self.inner.search(query, k, options).await;
        if let Some(after) = &self.hooks.after_search {
            match &result {
                Ok(docs) => after(docs, None),
                Err(err) => after(&[], Some(err)),
            }
        }
        result
    }

    async fn delete(&self, ids: &[String]) -> MemoryResult<()> {
        self.inner.delete(ids).await
    }
}

/// Middleware that wraps a store with `hooks`.
pub fn with_vector_store_hooks(hooks: VectorStoreHooks) -> VectorStoreMiddleware {
    Arc::new(move |inner| Arc::new(HookedVectorStore::new(inner, hooks.clone())) as Arc<dyn VectorStore>)
}

/// Apply middleware so that the first listed ends up outermost.
pub fn apply_vector_store_middleware(
    store: Arc<dyn VectorStore>,
    middleware: impl IntoIterator<Item = VectorStoreMiddleware>,
) -> Arc<dyn VectorStore> {
    let middleware: Vec<_> = middleware.into_iter().collect();
    middleware.iter().rev().fold(store, |inner, mw| mw(inner))
}
