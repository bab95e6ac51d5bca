//! # Storage Module
//!
//! Key-value persistence underneath every Gobia collection.
//!
//! ## Storage Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         STORAGE SYSTEM                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Storage (handle shared by all services)                        │   │
//! │  │  ───────────────────────────────────────                         │   │
//! │  │                                                                 │   │
//! │  │  document(key) ──► Document: one JSON value under one key      │   │
//! │  │  lock(key)     ──► per-key async mutex for read-modify-write   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  KeyValueStore trait                                            │   │
//! │  │  ────────────────────                                            │   │
//! │  │  get / set / remove / multi_set(entries) / multi_remove(keys)  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │              │                                   │                      │
//! │              ▼                                   ▼                      │
//! │  ┌───────────────────────┐          ┌───────────────────────────┐      │
//! │  │  MemoryStore          │          │  SqliteStore              │      │
//! │  │  - tests              │          │  - kv_store table         │      │
//! │  │  - no storage path    │          │  - survives restarts      │      │
//! │  └───────────────────────┘          └───────────────────────────┘      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store has no knowledge of record shapes; each service owns the
//! layout of the single key it writes (see [`keys`]).

mod document;
mod memory;
mod schema;
mod sqlite;

#[cfg(test)]
pub(crate) mod testing;

pub use document::Document;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::error::Result;

/// Storage keys, one per collection
pub mod keys {
    /// Logged-in flag, raw `"true"` when set
    pub const IS_LOGGED_IN: &str = "@gobia_is_logged_in";

    /// Logged-in user, JSON
    pub const USER_DATA: &str = "@gobia_user_data";

    /// Opaque auth token, raw string
    pub const AUTH_TOKEN: &str = "@gobia_auth_token";

    /// Singleton profile record
    pub const PROFILE: &str = "@gobia_profile";

    /// Singleton settings record (possibly partial)
    pub const SETTINGS: &str = "@gobia_settings";

    /// Joined community ids
    pub const JOINED_COMMUNITIES: &str = "@gobia_joined_communities";

    /// Bookmarked posts, newest first
    pub const BOOKMARKED_POSTS: &str = "@gobia_bookmarked_posts";

    /// Bookmarked comments, newest first
    pub const BOOKMARKED_COMMENTS: &str = "@gobia_bookmarked_comments";

    /// Drafts
    pub const DRAFTS: &str = "@gobia_drafts";

    /// Every key written by Gobia Core
    pub const ALL: [&str; 9] = [
        IS_LOGGED_IN,
        USER_DATA,
        AUTH_TOKEN,
        PROFILE,
        SETTINGS,
        JOINED_COMMUNITIES,
        BOOKMARKED_POSTS,
        BOOKMARKED_COMMENTS,
        DRAFTS,
    ];
}

/// Asynchronous string-keyed, string-valued persistent store.
///
/// Implementations must return the most recent locally written value from
/// `get`. Durable implementations must keep writes across restarts.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing an absent key succeeds
    async fn remove(&self, key: &str) -> Result<()>;

    /// Write several keys in the given order, stopping at the first failure.
    ///
    /// Backends with transactions apply all of them or none; the default
    /// leaves every key before the failing one written, so callers put the
    /// key that marks the batch complete last.
    async fn multi_set(&self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value).await?;
        }
        Ok(())
    }

    /// Remove several keys, stopping at the first failure
    async fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// Path to the database file (None for in-memory)
    pub database_path: Option<String>,
}

/// Shared handle to the key-value backend.
///
/// Cloning is cheap; clones share the backend and the per-key lock table,
/// so writes to one key are serialized across every service instance.
#[derive(Clone)]
pub struct Storage {
    kv: Arc<dyn KeyValueStore>,
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl Storage {
    /// Wrap a backend
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// A storage handle over a fresh [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// The underlying backend
    pub fn kv(&self) -> &dyn KeyValueStore {
        self.kv.as_ref()
    }

    /// A typed JSON document bound to `key`
    pub fn document(&self, key: &'static str) -> Document {
        Document::new(key, self.kv.clone(), self.key_lock(key))
    }

    /// Acquire the write lock for `key`.
    ///
    /// Used by services that write raw values or several keys at once.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        self.key_lock(key).lock_owned().await
    }

    fn key_lock(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock();
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("locked_keys", &self.locks.lock().len())
            .finish()
    }
}

/// Open the storage system.
///
/// A configured path opens (or creates) a SQLite file; otherwise the data
/// lives in memory for the life of the process.
pub async fn open(config: &StorageConfig) -> Result<Storage> {
    match config.database_path.as_deref() {
        Some(path) => {
            let store = SqliteStore::open(Some(path)).await?;
            tracing::info!("Opened SQLite storage at {}", path);
            Ok(Storage::new(Arc::new(store)))
        }
        None => {
            tracing::info!("No storage path configured, using in-memory storage");
            Ok(Storage::in_memory())
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
