//! Test doubles with injectable failures.

use async_trait::async_trait;
use parking_lot::Mutex;
use tiermem_core::{Document, Embedder, Message};

use crate::memory::Memory;
use crate::stores::MessageStore;
use crate::vectorstore::{SearchOptions, VectorStore};
use crate::{MemoryError, MemoryResult};

fn fail_or<T>(err: &Option<MemoryError>, value: impl FnOnce() -> T) -> MemoryResult<T> {
    match err {
        Some(err) => Err(err.clone()),
        None => Ok(value()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockMemory {
    calls: Mutex<Vec<String>>,
    error: Mutex<Option<MemoryError>>,
    load_result: Mutex<Vec<Message>>,
    search_result: Mutex<Vec<Document>>,
}

impl MockMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn fail_all(&self, err: MemoryError) {
        *self.error.lock() = Some(err);
    }

    pub fn set_load_result(&self, messages: Vec<Message>) {
        *self.load_result.lock() = messages;
    }

    pub fn set_search_result(&self, docs: Vec<Document>) {
        *self.search_result.lock() = docs;
    }

    fn record(&self, op: &str) {
        self.calls.lock().push(op.to_string());
    }
}

#[async_trait]
impl Memory for MockMemory {
    async fn save(&self, _input: &Message, _output: &Message) -> MemoryResult<()> {
        self.record("save");
        fail_or(&self.error.lock(), || ())
    }

    async fn load(&self, _query: &str) -> MemoryResult<Vec<Message>> {
        self.record("load");
        fail_or(&self.error.lock(), || self.load_result.lock().clone())
    }

    async fn search(&self, _query: &str, _k: usize) -> MemoryResult<Vec<Document>> {
        self.record("search");
        fail_or(&self.error.lock(), || self.search_result.lock().clone())
    }

    async fn clear(&self) -> MemoryResult<()> {
        self.record("clear");
        fail_or(&self.error.lock(), || ())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MessageStore
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockMessageStore {
    messages: Mutex<Vec<Message>>,
    append_calls: Mutex<usize>,
    /// (successful appends allowed, error returned afterwards)
    append_failure: Mutex<Option<(usize, MemoryError)>>,
    all_error: Mutex<Option<MemoryError>>,
    clear_error: Mutex<Option<MemoryError>>,
}

impl MockMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `ok` appends succeed, then fail every later append with `err`.
    pub fn fail_append_after(&self, ok: usize, err: MemoryError) {
        *self.append_failure.lock() = Some((ok, err));
    }

    pub fn fail_all(&self, err: MemoryError) {
        *self.all_error.lock() = Some(err);
    }

    pub fn fail_clear(&self, err: MemoryError) {
        *self.clear_error.lock() = Some(err);
    }

    pub fn append_calls(&self) -> usize {
        *self.append_calls.lock()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl MessageStore for MockMessageStore {
    async fn append(&self, message: &Message) -> MemoryResult<()> {
        let call = {
            let mut calls = self.append_calls.lock();
            *calls += 1;
            *calls
        };
        if let Some((ok, err)) = &*self.append_failure.lock() {
            if call > *ok {
                return Err(err.clone());
            }
        }
        self.messages.lock().push(message.clone());
        Ok(())
    }

    async fn search(&self, query: &str, k: usize) -> MemoryResult<Vec<Message>> {
        let lowered = query.to_lowercase();
        let limit = if k == 0 { usize::MAX } else { k };
        fail_or(&self.all_error.lock(), || {
            self.messages
                .lock()
                .iter()
                .filter(|m| crate::stores::matches_query(m, &lowered))
                .take(limit)
                .cloned()
                .collect()
        })
    }

    async fn all(&self) -> MemoryResult<Vec<Message>> {
        fail_or(&self.all_error.lock(), || self.messages.lock().clone())
    }

    async fn clear(&self) -> MemoryResult<()> {
        fail_or(&self.clear_error.lock(), || self.messages.lock().clear())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// VectorStore
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockVectorStore {
    documents: Mutex<Vec<Document>>,
    add_calls: Mutex<usize>,
    last_search_k: Mutex<Option<usize>>,
    add_error: Mutex<Option<MemoryError>>,
    search_error: Mutex<Option<MemoryError>>,
}

impl MockVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_add(&self, err: MemoryError) {
        *self.add_error.lock() = Some(err);
    }

    pub fn fail_search(&self, err: MemoryError) {
        *self.search_error.lock() = Some(err);
    }

    pub fn documents(&self) -> Vec<Document> {
        self.documents.lock().clone()
    }

    pub fn add_calls(&self) -> usize {
        *self.add_calls.lock()
    }

    pub fn last_search_k(&self) -> Option<usize> {
        *self.last_search_k.lock()
    }
}

#[async_trait]
impl VectorStore for MockVectorStore {
    async fn add(&self, docs: &[Document], _embeddings: &[Vec<f32>]) -> MemoryResult<()> {
        *self.add_calls.lock() += 1;
        fail_or(&self.add_error.lock(), || {
            self.documents.lock().extend_from_slice(docs)
        })
    }

    async fn search(
        &self,
        _query: &[f32],
        k: usize,
        _options: SearchOptions,
    ) -> MemoryResult<Vec<Document>> {
        *self.last_search_k.lock() = Some(k);
        fail_or(&self.search_error.lock(), || {
            self.documents.lock().iter().take(k).cloned().collect()
        })
    }

    async fn delete(&self, ids: &[String]) -> MemoryResult<()> {
        self.documents.lock().retain(|d| !ids.contains(&d.id));
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Embedder
// ─────────────────────────────────────────────────────────────────────────────

/// Embeds every text as a constant vector of ones. Batch and single calls
/// are counted separately.
pub struct MockEmbedder {
    dimensions: usize,
    embed_calls: Mutex<usize>,
    embed_single_calls: Mutex<usize>,
    error: Mutex<Option<tiermem_core::Error>>,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            embed_calls: Mutex::new(0),
            embed_single_calls: Mutex::new(0),
            error: Mutex::new(None),
        }
    }

    pub fn fail_with(&self, err: tiermem_core::Error) {
        *self.error.lock() = Some(err);
    }

    pub fn embed_calls(&self) -> usize {
        *self.embed_calls.lock()
    }

    pub fn embed_single_calls(&self) -> usize {
        *self.embed_single_calls.lock()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, texts: &[String]) -> tiermem_core::Result<Vec<Vec<f32>>> {
        *self.embed_calls.lock() += 1;
        if let Some(err) = &*self.error.lock() {
            return Err(err.clone());
        }
        Ok(texts.iter().map(|_| vec![1.0; self.dimensions]).collect())
    }

    async fn embed_single(&self, _text: &str) -> tiermem_core::Result<Vec<f32>> {
        *self.embed_single_calls.lock() += 1;
        if let Some(err) = &*self.error.lock() {
            return Err(err.clone());
        }
        Ok(vec![1.0; self.dimensions])
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
