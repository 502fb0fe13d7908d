//! Core memory: bounded persona and human blocks.

use async_trait::async_trait;
use parking_lot::RwLock;
use tiermem_core::{Document, Message};

use super::Memory;
use crate::config::CoreConfig;
use crate::{MemoryError, MemoryResult};

#[derive(Debug, Default)]
struct Blocks {
    persona: String,
    human: String,
}

/// Always-in-context memory made of two bounded text blocks.
///
/// Block length is counted in characters. A write longer than the block's
/// limit fails with [`MemoryError::LimitExceeded`] and leaves the block as it
/// was.
#[derive(Debug)]
pub struct CoreMemory {
    blocks: RwLock<Blocks>,
    persona_limit: usize,
    human_limit: usize,
    self_editable: bool,
}

impl Default for CoreMemory {
    fn default() -> Self {
        Self::new(CoreConfig::default())
    }
}

impl CoreMemory {
    /// Create core memory with empty blocks. Seed text in `config` is ignored;
    /// use [`CoreMemory::try_new`] to apply it.
    pub fn new(config: CoreConfig) -> Self {
        Self {
            blocks: RwLock::new(Blocks::default()),
            persona_limit: config.persona_limit,
            human_limit: config.human_limit,
            self_editable: config.self_editable,
        }
    }

    /// Create core memory and seed both blocks from `config`.
    pub fn try_new(config: CoreConfig) -> MemoryResult<Self> {
        let memory = Self::new(config.clone());
        memory.set_persona(config.persona)?;
        memory.set_human(config.human)?;
        Ok(memory)
    }

    pub fn persona(&self) -> String {
        self.blocks.read().persona.clone()
    }

    pub fn human(&self) -> String {
        self.blocks.read().human.clone()
    }

    /// Replace the persona block
    pub fn set_persona(&self, text: impl Into<String>) -> MemoryResult<()> {
        let text = text.into();
        check_limit("persona", &text, self.persona_limit)?;
        self.blocks.write().persona = text;
        Ok(())
    }

    /// Replace the human block
    pub fn set_human(&self, text: impl Into<String>) -> MemoryResult<()> {
        let text = text.into();
        check_limit("human", &text, self.human_limit)?;
        self.blocks.write().human = text;
        Ok(())
    }

    pub fn persona_limit(&self) -> usize {
        self.persona_limit
    }

    pub fn human_limit(&self) -> usize {
        self.human_limit
    }

    /// Whether the agent is allowed to rewrite these blocks. Not enforced here.
    pub fn is_self_editable(&self) -> bool {
        self.self_editable
    }

    /// System messages for the non-empty blocks, persona first.
    pub fn to_messages(&self) -> Vec<Message> {
        let blocks = self.blocks.read();
        let mut messages = Vec::with_capacity(2);
        if !blocks.persona.is_empty() {
            messages.push(Message::system(format!("[Persona]\n{}", blocks.persona)));
        }
        if !blocks.human.is_empty() {
            messages.push(Message::system(format!("[Human]\n{}", blocks.human)));
        }
        messages
    }
}

fn check_limit(block: &str, text: &str, limit: usize) -> MemoryResult<()> {
    let len = text.chars().count();
    if len > limit {
        return Err(MemoryError::LimitExceeded {
            block: block.to_string(),
            len,
            limit,
        });
    }
    Ok(())
}

#[async_trait]
impl Memory for CoreMemory {
    /// Core is edited explicitly, never from conversation turns.
    async fn save(&self, _input: &Message, _output: &Message) -> MemoryResult<()> {
        Ok(())
    }

    async fn load(&self, _query: &str) -> MemoryResult<Vec<Message>> {
        Ok(self.to_messages())
    }

    async fn search(&self, _query: &str, _k: usize) -> MemoryResult<Vec<Document>> {
        Ok(Vec::new())
    }

    async fn clear(&self) -> MemoryResult<()> {
        let mut blocks = self.blocks.write();
        blocks.persona.clear();
        blocks.human.clear();
        Ok(())
    }
}
