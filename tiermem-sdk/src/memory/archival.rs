//! Archival memory: embedded turns searchable by similarity.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tiermem_core::{Document, Embedder, Message};

use super::Memory;
use crate::vectorstore::{SearchOptions, VectorStore};
use crate::{MemoryError, MemoryResult};

/// Result count used when `search` is called with `k == 0`
pub const DEFAULT_ARCHIVAL_K: usize = 10;

/// Process-wide document sequence. Never reset, never persisted.
static ARCHIVAL_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Reserve `count` consecutive sequence numbers and return the first.
fn reserve_ids(count: usize) -> u64 {
    ARCHIVAL_SEQUENCE.fetch_add(count as u64, Ordering::SeqCst) + 1
}

/// Long-term memory backed by a [`VectorStore`] and an [`Embedder`].
///
/// Each non-empty message of a saved turn becomes a document with id
/// `archival-<n>` and `role` metadata.
pub struct ArchivalMemory {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
}

impl ArchivalMemory {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }
}

#[async_trait]
impl Memory for ArchivalMemory {
    async fn save(&self, input: &Message, output: &Message) -> MemoryResult<()> {
        let entries: Vec<(String, &Message)> = [input, output]
            .into_iter()
            .map(|m| (m.text(), m))
            .filter(|(text, _)| !text.is_empty())
            .collect();

        if entries.is_empty() {
            return Ok(());
        }

        let first = reserve_ids(entries.len());
        let (texts, docs): (Vec<String>, Vec<Document>) = entries
            .into_iter()
            .zip(first..)
            .map(|((text, message), seq)| {
                let doc = Document::new(format!("archival-{seq}"), text.clone())
                    .with_metadata("role", json!(message.role.as_str()));
                (text, doc)
            })
            .unzip();

        let embeddings = self
            .embedder
            .embed(&texts)
            .await
            .map_err(|e| MemoryError::dependency("memory/archival: embed", e))?;

        self.store
            .add(&docs, &embeddings)
            .await
            .map_err(|e| MemoryError::dependency("memory/archival: add", e))?;

        tracing::debug!(documents = docs.len(), first_id = %docs[0].id, "archived turn");
        Ok(())
    }

    async fn load(&self, _query: &str) -> MemoryResult<Vec<Message>> {
        Ok(Vec::new())
    }

    async fn search(&self, query: &str, k: usize) -> MemoryResult<Vec<Document>> {
        let k = if k == 0 { DEFAULT_ARCHIVAL_K } else { k };
        let vector = self
            .embedder
            .embed_single(query)
            .await
            .map_err(|e| MemoryError::dependency("memory/archival: embed", e))?;
        self.store.search(&vector, k, SearchOptions::default()).await
    }

    /// Vector store entries are left in place.
    async fn clear(&self) -> MemoryResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockEmbedder, MockVectorStore};
    use crate::vectorstore::InMemoryVectorStore;
    use tiermem_core::{ContentPart, HashEmbedder, Role};

    fn seq_of(id: &str) -> u64 {
        id.strip_prefix("archival-").unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn test_save_stores_two_consecutive_documents() {
        let store = Arc::new(MockVectorStore::new());
        let archival = ArchivalMemory::new(store.clone(), Arc::new(MockEmbedder::new(4)));

        archival
            .save(&Message::human("what is rust"), &Message::ai("a language"))
            .await
            .unwrap();

        let docs = store.documents();
        assert_eq!(docs.len(), 2);
        assert_eq!(seq_of(&docs[1].id), seq_of(&docs[0].id) + 1);
        assert_eq!(docs[0].content, "what is rust");
        assert_eq!(docs[0].metadata["role"], "human");
        assert_eq!(docs[1].metadata["role"], "ai");
        assert_eq!(store.add_calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_text_is_skipped() {
        let store = Arc::new(MockVectorStore::new());
        let embedder = Arc::new(MockEmbedder::new(4));
        let archival = ArchivalMemory::new(store.clone(), embedder.clone());

        let image_only = Message::new(
            Role::Human,
            vec![ContentPart::Image {
                url: "https://example.com/a.png".into(),
                mime_type: None,
            }],
        );
        archival.save(&image_only, &Message::ai("nice picture")).await.unwrap();
        let docs = store.documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].metadata["role"], "ai");

        archival.save(&Message::human(""), &Message::ai("")).await.unwrap();
        assert_eq!(store.add_calls(), 1);
        assert_eq!(embedder.embed_calls(), 1);
    }

    #[tokio::test]
    async fn test_embed_failure_adds_nothing() {
        let store = Arc::new(MockVectorStore::new());
        let embedder = Arc::new(MockEmbedder::new(4));
        embedder.fail_with(tiermem_core::Error::embedding("quota exceeded"));
        let archival = ArchivalMemory::new(store.clone(), embedder);

        let err = archival
            .save(&Message::human("a"), &Message::ai("b"))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("memory/archival: embed: "));
        assert!(matches!(err.root_cause(), MemoryError::Core(e) if e.is_embedding()));
        assert_eq!(store.add_calls(), 0);
    }

    #[tokio::test]
    async fn test_add_failure_is_wrapped() {
        let store = Arc::new(MockVectorStore::new());
        store.fail_add(MemoryError::backend("disk full"));
        let archival = ArchivalMemory::new(store, Arc::new(MockEmbedder::new(4)));

        let err = archival
            .save(&Message::human("a"), &Message::ai("b"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "memory/archival: add: backend error: disk full");
        assert!(matches!(err.root_cause(), MemoryError::Backend { .. }));
    }

    #[tokio::test]
    async fn test_search_defaults_k() {
        let store = Arc::new(MockVectorStore::new());
        let archival = ArchivalMemory::new(store.clone(), Arc::new(MockEmbedder::new(4)));

        archival.search("anything", 0).await.unwrap();
        assert_eq!(store.last_search_k(), Some(DEFAULT_ARCHIVAL_K));

        archival.search("anything", 3).await.unwrap();
        assert_eq!(store.last_search_k(), Some(3));
    }

    #[tokio::test]
    async fn test_search_embeds_query_individually() {
        let store = Arc::new(MockVectorStore::new());
        let embedder = Arc::new(MockEmbedder::new(4));
        let archival = ArchivalMemory::new(store.clone(), embedder.clone());

        archival.search("what did I say", 2).await.unwrap();
        assert_eq!(embedder.embed_single_calls(), 1);
        assert_eq!(embedder.embed_calls(), 0);

        archival
            .save(&Message::human("a"), &Message::ai("b"))
            .await
            .unwrap();
        assert_eq!(embedder.embed_single_calls(), 1);
        assert_eq!(embedder.embed_calls(), 1);
    }

    #[tokio::test]
    async fn test_search_embed_failure_skips_store() {
        let store = Arc::new(MockVectorStore::new());
        let embedder = Arc::new(MockEmbedder::new(4));
        embedder.fail_with(tiermem_core::Error::embedding("model offline"));
        let archival = ArchivalMemory::new(store.clone(), embedder);

        let err = archival.search("anything", 5).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "memory/archival: embed: embedding error: model offline"
        );
        assert!(matches!(err.root_cause(), MemoryError::Core(e) if e.is_embedding()));
        assert_eq!(store.last_search_k(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_get_consecutive_ids() {
        let store = Arc::new(MockVectorStore::new());
        let archival = Arc::new(ArchivalMemory::new(
            store.clone(),
            Arc::new(MockEmbedder::new(4)),
        ));

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let archival = archival.clone();
                tokio::spawn(async move {
                    archival
                        .save(
                            &Message::human(format!("question {i}")),
                            &Message::ai(format!("answer {i}")),
                        )
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let docs = store.documents();
        assert_eq!(docs.len(), 64);

        let mut seen = std::collections::HashSet::new();
        for i in 0..32 {
            let question = docs
                .iter()
                .find(|d| d.content == format!("question {i}"))
                .unwrap();
            let answer = docs
                .iter()
                .find(|d| d.content == format!("answer {i}"))
                .unwrap();
            assert_eq!(seq_of(&answer.id), seq_of(&question.id) + 1);
            assert!(seen.insert(question.id.clone()));
            assert!(seen.insert(answer.id.clone()));
        }
    }

    #[tokio::test]
    async fn test_search_finds_saved_turn() {
        let archival = ArchivalMemory::new(
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(HashEmbedder::new(256)),
        );
        archival
            .save(
                &Message::human("my favourite colour is teal"),
                &Message::ai("teal noted"),
            )
            .await
            .unwrap();
        archival
            .save(
                &Message::human("schedule dentist appointment"),
                &Message::ai("booked for friday"),
            )
            .await
            .unwrap();

        let hits = archival.search("favourite colour", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "my favourite colour is teal");
        assert!(hits[0].score > 0.0);
    }

    #[tokio::test]
    async fn test_load_and_clear_are_inert() {
        let store = Arc::new(InMemoryVectorStore::new());
        let archival = ArchivalMemory::new(store.clone(), Arc::new(HashEmbedder::default()));
        archival
            .save(&Message::human("keep me"), &Message::ai("kept"))
            .await
            .unwrap();

        assert!(archival.load("keep").await.unwrap().is_empty());
        archival.clear().await.unwrap();
        assert_eq!(store.len().await, 2);
    }
}
