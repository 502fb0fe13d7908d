//! Memory middleware and the hook wrapper.

use std::sync::Arc;

use async_trait::async_trait;
use tiermem_core::{Document, Message};

use super::{Hooks, Memory};
use crate::{MemoryError, MemoryResult};

/// Transforms one memory into another, typically by wrapping it.
pub type Middleware = Arc<dyn Fn(Arc<dyn Memory>) -> Arc<dyn Memory> + Send + Sync>;

/// Apply middleware so that the first listed ends up outermost:
/// `apply_middleware(m, [a, b, c])` is `a(b(c(m)))`.
pub fn apply_middleware(
    memory: Arc<dyn Memory>,
    middleware: impl IntoIterator<Item = Middleware>,
) -> Arc<dyn Memory> {
    let middleware: Vec<_> = middleware.into_iter().collect();
    middleware.iter().rev().fold(memory, |inner, mw| mw(inner))
}

/// Middleware that wraps a memory in [`HookedMemory`].
pub fn with_hooks(hooks: Hooks) -> Middleware {
    Arc::new(move |inner| Arc::new(HookedMemory::new(inner, hooks.clone())) as Arc<dyn Memory>)
}

/// A [`Memory`] that runs [`Hooks`] around every call to `inner`.
pub struct HookedMemory {
    inner: Arc<dyn Memory>,
    hooks: Hooks,
}

impl HookedMemory {
    pub fn new(inner: Arc<dyn Memory>, hooks: Hooks) -> Self {
        Self { inner, hooks }
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Route a failure through `on_error`. `None` means suppressed.
    fn handle_error(&self, err: MemoryError) -> Option<MemoryError> {
        match &self.hooks.on_error {
            Some(on_error) => on_error(err),
            None => Some(err),
        }
    }

    /// Split an operation result into (value, final error) after `on_error`.
    fn settle<T: Default>(&self, result: MemoryResult<T>) -> (T, Option<MemoryError>) {
        match result {
            Ok(value) => (value, None),
            Err(err) => (T::default(), self.handle_error(err)),
        }
    }
}

fn finish<T>(value: T, err: Option<MemoryError>) -> MemoryResult<T> {
    match err {
        Some(err) => Err(err),
        None => Ok(value),
    }
}

#[async_trait]
impl Memory for HookedMemory {
    async fn save(&self, input: &Message, output: &Message) -> MemoryResult<()> {
        if let Some(before) = &self.hooks.before_save {
            before(input, output)?;
        }

        let ((), err) = self.settle(self.inner.save(input, output).await);

        if let Some(after) = &self.hooks.after_save {
            after(input, output, err.as_ref());
        }
        finish((), err)
    }

    async fn load(&self, query: &str) -> MemoryResult<Vec<Message>> {
        if let Some(before) = &self.hooks.before_load {
            before(query)?;
        }

        let (messages, err) = self.settle(self.inner.load(query).await);

        if let Some(after) = &self.hooks.after_load {
            after(query, &messages, err.as_ref());
        }
        finish(messages, err)
    }

    async fn search(&self, query: &str, k: usize) -> MemoryResult<Vec<Document>> {
        if let Some(before) = &self.hooks.before_search {
            before(query, k)?;
        }

        let (docs, err) = self.settle(self.inner.search(query, k).await);

        if let Some(after) = &self.hooks.after_search {
            after(query, k, &docs, err.as_ref());
        }
        finish(docs, err)
    }

    async fn clear(&self) -> MemoryResult<()> {
        if let Some(before) = &self.hooks.before_clear {
            before()?;
        }

        let ((), err) = self.settle(self.inner.clear().await);

        if let Some(after) = &self.hooks.after_clear {
            after(err.as_ref());
        }
        finish((), err)
    }
}
