//! SQLite-backed message store.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use tiermem_core::Message;
use tokio::sync::Mutex;

use super::migrations::run_migrations;
use super::{matches_query, MessageStore};
use crate::MemoryResult;

/// Message log persisted in SQLite.
///
/// Several stores can share one connection; each sees only the rows of its
/// own `namespace`.
pub struct SqliteMessageStore {
    db: Arc<Mutex<Connection>>,
    namespace: String,
}

impl SqliteMessageStore {
    /// Open (or create) a database file and run migrations
    pub async fn open(path: impl AsRef<Path>, namespace: impl Into<String>) -> MemoryResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(Arc::new(Mutex::new(conn)), namespace).await
    }

    /// Open a private in-memory database
    pub async fn open_in_memory(namespace: impl Into<String>) -> MemoryResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(Arc::new(Mutex::new(conn)), namespace).await
    }

    /// Use an existing shared connection, running migrations on it
    pub async fn with_connection(
        db: Arc<Mutex<Connection>>,
        namespace: impl Into<String>,
    ) -> MemoryResult<Self> {
        {
            let conn = db.lock().await;
            run_migrations(&conn)?;
        }
        Ok(Self {
            db,
            namespace: namespace.into(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn load_all(&self) -> MemoryResult<Vec<Message>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT message_json FROM tiermem_messages WHERE namespace = ?1 ORDER BY seq",
        )?;
        let rows = stmt
            .query_map(params![&self.namespace], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.iter()
            .map(|json| serde_json::from_str(json).map_err(Into::into))
            .collect()
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn append(&self, message: &Message) -> MemoryResult<()> {
        let json = serde_json::to_string(message)?;
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO tiermem_messages (namespace, role, content, message_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &self.namespace,
                message.role.as_str(),
                message.text(),
                &json,
                Utc::now().timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    async fn search(&self, query: &str, k: usize) -> MemoryResult<Vec<Message>> {
        let lowered = query.to_lowercase();
        let limit = if k == 0 { usize::MAX } else { k };
        let messages = self.load_all().await?;
        Ok(messages
            .into_iter()
            .filter(|m| matches_query(m, &lowered))
            .take(limit)
            .collect())
    }

    async fn all(&self) -> MemoryResult<Vec<Message>> {
        self.load_all().await
    }

    async fn clear(&self) -> MemoryResult<()> {
        let db = self.db.lock().await;
        let removed = db.execute(
            "DELETE FROM tiermem_messages WHERE namespace = ?1",
            params![&self.namespace],
        )?;
        tracing::debug!(namespace = %self.namespace, removed, "cleared message store");
        Ok(())
    }
}
