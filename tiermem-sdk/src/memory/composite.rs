//! Composite memory: fan-out over the configured tiers.

use std::sync::Arc;

use async_trait::async_trait;
use tiermem_core::{Document, Message};

use super::{ArchivalMemory, CoreMemory, Memory, RecallMemory};
use crate::stores::GraphStore;
use crate::MemoryResult;

/// Aggregates up to one core, recall and archival tier behind [`Memory`].
///
/// Tier order is fixed and every operation stops at the first error:
///
/// | op     | tiers                               |
/// |--------|-------------------------------------|
/// | save   | recall, archival (core is never written) |
/// | load   | core, recall (results concatenated) |
/// | search | archival                            |
/// | clear  | core, recall, archival              |
///
/// The graph store is carried for callers but no operation touches it.
#[derive(Default, Clone)]
pub struct CompositeMemory {
    core: Option<Arc<CoreMemory>>,
    recall: Option<Arc<RecallMemory>>,
    archival: Option<Arc<ArchivalMemory>>,
    graph: Option<Arc<dyn GraphStore>>,
}

impl CompositeMemory {
    /// Composite with no tiers; every operation is a no-op.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_core(mut self, core: Arc<CoreMemory>) -> Self {
        self.core = Some(core);
        self
    }

    pub fn with_recall(mut self, recall: Arc<RecallMemory>) -> Self {
        self.recall = Some(recall);
        self
    }

    pub fn with_archival(mut self, archival: Arc<ArchivalMemory>) -> Self {
        self.archival = Some(archival);
        self
    }

    pub fn with_graph(mut self, graph: Arc<dyn GraphStore>) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn core(&self) -> Option<&Arc<CoreMemory>> {
        self.core.as_ref()
    }

    pub fn recall(&self) -> Option<&Arc<RecallMemory>> {
        self.recall.as_ref()
    }

    pub fn archival(&self) -> Option<&Arc<ArchivalMemory>> {
        self.archival.as_ref()
    }

    pub fn graph(&self) -> Option<&Arc<dyn GraphStore>> {
        self.graph.as_ref()
    }
}

#[async_trait]
impl Memory for CompositeMemory {
    async fn save(&self, input: &Message, output: &Message) -> MemoryResult<()> {
        if let Some(recall) = &self.recall {
            recall.save(input, output).await?;
        }
        if let Some(archival) = &self.archival {
            archival.save(input, output).await?;
        }
        Ok(())
    }

    async fn load(&self, query: &str) -> MemoryResult<Vec<Message>> {
        let mut messages = Vec::new();
        if let Some(core) = &self.core {
            messages.extend(core.load(query).await?);
        }
        if let Some(recall) = &self.recall {
            messages.extend(recall.load(query).await?);
        }
        Ok(messages)
    }

    async fn search(&self, query: &str, k: usize) -> MemoryResult<Vec<Document>> {
        match &self.archival {
            Some(archival) => archival.search(query, k).await,
            None => Ok(Vec::new()),
        }
    }

    async fn clear(&self) -> MemoryResult<()> {
        if let Some(core) = &self.core {
            core.clear().await?;
        }
        if let Some(recall) = &self.recall {
            recall.clear().await?;
        }
        if let Some(archival) = &self.archival {
            archival.clear().await?;
        }
        Ok(())
    }
}
