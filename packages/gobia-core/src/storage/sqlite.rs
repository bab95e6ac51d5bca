//! # SQLite Backend
//!
//! Durable [`KeyValueStore`] on a single `kv_store` table.
//!
//! ```text
//!   Services ──► Storage ──► SqliteStore ──► rusqlite ──► file / :memory:
//! ```
//!
//! Statements are tiny and run while holding the connection mutex, so the
//! async methods complete without yielding.

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::sync::Arc;

use super::{schema, KeyValueStore};
use crate::error::{Error, Result};

/// SQLite-backed key-value store
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create a database
    ///
    /// If path is None, creates an in-memory database (useful for testing).
    pub async fn open(path: Option<&str>) -> Result<Self> {
        let conn = match path {
            Some(p) => Connection::open(p)
                .map_err(|e| Error::DatabaseError(format!("Failed to open database: {}", e)))?,
            None => Connection::open_in_memory().map_err(|e| {
                Error::DatabaseError(format!("Failed to create in-memory database: {}", e))
            })?,
        };

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;

        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        // Absent table reads as "fresh database"
        let version: Option<i32> = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
            .ok();

        match version {
            None => {
                conn.execute_batch(schema::CREATE_TABLES)
                    .map_err(|e| Error::DatabaseError(format!("Failed to create tables: {}", e)))?;
                conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?)",
                    params![schema::SCHEMA_VERSION],
                )
                .map_err(|e| Error::DatabaseError(format!("Failed to set schema version: {}", e)))?;

                tracing::info!("Database schema created (version {})", schema::SCHEMA_VERSION);
            }
            Some(v) if v > schema::SCHEMA_VERSION => {
                return Err(Error::DatabaseError(format!(
                    "Database schema version {} is newer than supported version {}",
                    v,
                    schema::SCHEMA_VERSION
                )));
            }
            Some(v) => {
                tracing::debug!("Database schema version: {}", v);
            }
        }

        Ok(())
    }

    /// All stored keys, sorted
    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT key FROM kv_store ORDER BY key")
            .map_err(|e| Error::StorageReadError(format!("Failed to list keys: {}", e)))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| Error::StorageReadError(format!("Failed to list keys: {}", e)))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::StorageReadError(format!("Failed to list keys: {}", e)))
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();

        let result = conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?",
            params![key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::StorageReadError(format!("Failed to get {}: {}", key, e))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock();
        let now = crate::time::now_timestamp_millis();

        conn.execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)",
            params![key, value, now],
        )
        .map_err(|e| Error::StorageWriteError(format!("Failed to set {}: {}", key, e)))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM kv_store WHERE key = ?", params![key])
            .map_err(|e| Error::StorageWriteError(format!("Failed to remove {}: {}", key, e)))?;

        Ok(())
    }

    async fn multi_set(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut conn = self.conn.lock();
        let now = crate::time::now_timestamp_millis();
        let tx = conn
            .transaction()
            .map_err(|e| Error::StorageWriteError(format!("Failed to begin transaction: {}", e)))?;

        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)",
                params![key, value, now],
            )
            .map_err(|e| Error::StorageWriteError(format!("Failed to set {}: {}", key, e)))?;
        }

        tx.commit()
            .map_err(|e| Error::StorageWriteError(format!("Failed to commit write: {}", e)))
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::StorageWriteError(format!("Failed to begin transaction: {}", e)))?;

        for key in keys {
            tx.execute("DELETE FROM kv_store WHERE key = ?", params![key])
                .map_err(|e| Error::StorageWriteError(format!("Failed to remove {}: {}", key, e)))?;
        }

        tx.commit()
            .map_err(|e| Error::StorageWriteError(format!("Failed to commit removal: {}", e)))
    }
}

// ============================================================================
// TESTS
// ============================================================================
