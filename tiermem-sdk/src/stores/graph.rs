//! Entity/relation graph store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use crate::MemoryResult;

// ─────────────────────────────────────────────────────────────────────────────
// Graph Types
// ─────────────────────────────────────────────────────────────────────────────

/// A node in the knowledge graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, serde_json::Value>,
}

impl Entity {
    pub fn new(id: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

/// A directed, typed edge between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub relation_type: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, serde_json::Value>,
}

impl Relation {
    fn touches(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }

    fn other_end(&self, id: &str) -> &str {
        if self.from == id { &self.to } else { &self.from }
    }
}

/// Result of a graph query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphResult {
    pub entities: Vec<Entity>,
    pub relations: Vec<Relation>,
}

// ─────────────────────────────────────────────────────────────────────────────
// GraphStore Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Knowledge graph storage.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Insert an entity, replacing any entity with the same id.
    async fn add_entity(&self, entity: Entity) -> MemoryResult<()>;

    /// Append a relation. Duplicate edges are kept.
    async fn add_relation(
        &self,
        from: &str,
        to: &str,
        relation_type: &str,
        properties: HashMap<String, serde_json::Value>,
    ) -> MemoryResult<()>;

    /// Run a backend-specific query.
    async fn query(&self, query: &str) -> MemoryResult<Vec<GraphResult>>;

    /// Entities within `depth` hops of `entity_id` (in either direction) and
    /// the relations walked to reach them. A depth of 0 is treated as 1.
    async fn neighbors(
        &self,
        entity_id: &str,
        depth: usize,
    ) -> MemoryResult<(Vec<Entity>, Vec<Relation>)>;
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory implementation
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct GraphState {
    entities: HashMap<String, Entity>,
    order: Vec<String>,
    relations: Vec<Relation>,
}

impl GraphState {
    fn entities_in_order(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }
}

/// Graph held in process memory.
///
/// `query` understands `type:<name>` (case-insensitive entity type filter,
/// no relations); any other query returns the whole graph. Both forms always
/// yield exactly one [`GraphResult`].
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    state: RwLock<GraphState>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn add_entity(&self, entity: Entity) -> MemoryResult<()> {
        let mut state = self.state.write().await;
        if !state.entities.contains_key(&entity.id) {
            state.order.push(entity.id.clone());
        }
        state.entities.insert(entity.id.clone(), entity);
        Ok(())
    }

    async fn add_relation(
        &self,
        from: &str,
        to: &str,
        relation_type: &str,
        properties: HashMap<String, serde_json::Value>,
    ) -> MemoryResult<()> {
        self.state.write().await.relations.push(Relation {
            from: from.to_string(),
            to: to.to_string(),
            relation_type: relation_type.to_string(),
            properties,
        });
        Ok(())
    }

    async fn query(&self, query: &str) -> MemoryResult<Vec<GraphResult>> {
        let state = self.state.read().await;

        let result = match query.strip_prefix("type:") {
            Some(wanted) => GraphResult {
                entities: state
                    .entities_in_order()
                    .filter(|e| e.entity_type.eq_ignore_ascii_case(wanted))
                    .cloned()
                    .collect(),
                relations: Vec::new(),
            },
            None => GraphResult {
                entities: state.entities_in_order().cloned().collect(),
                relations: state.relations.clone(),
            },
        };

        Ok(vec![result])
    }

    async fn neighbors(
        &self,
        entity_id: &str,
        depth: usize,
    ) -> MemoryResult<(Vec<Entity>, Vec<Relation>)> {
        let depth = depth.max(1);
        let state = self.state.read().await;

        let mut visited: HashSet<String> = HashSet::from([entity_id.to_string()]);
        let mut frontier = vec![entity_id.to_string()];
        let mut entities = Vec::new();
        let mut relations = Vec::new();

        for _ in 0..depth {
            let mut next = Vec::new();
            for node in &frontier {
                for relation in state.relations.iter().filter(|r| r.touches(node)) {
                    relations.push(relation.clone());
                    let other = relation.other_end(node);
                    if visited.insert(other.to_string()) {
                        if let Some(entity) = state.entities.get(other) {
                            entities.push(entity.clone());
                        }
                        next.push(other.to_string());
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        tracing::trace!(
            entity_id,
            depth,
            entities = entities.len(),
            relations = relations.len(),
            "graph neighbors"
        );
        Ok((entities, relations))
    }
}
