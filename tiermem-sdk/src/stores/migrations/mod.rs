//! Message store database migrations
//!
//! SQL migrations are embedded as strings and executed when a store opens.

use rusqlite::Connection;

use crate::MemoryResult;

/// Message tables SQL (001)
pub const MESSAGE_TABLES_SQL: &str = include_str!("001_message_tables.sql");

/// Run all message store migrations
pub fn run_migrations(conn: &Connection) -> MemoryResult<()> {
    conn.execute_batch(MESSAGE_TABLES_SQL)?;
    Ok(())
}
