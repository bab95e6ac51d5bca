//! # Documents
//!
//! A [`Document`] is one JSON value stored under one key. Services never
//! talk to the backend with raw strings for structured data; they read a
//! document, or run a read-modify-write through [`Document::update`].
//!
//! ```text
//!   update(f)
//!     │
//!     ├─► lock(key)          per-key async mutex, shared across clones
//!     ├─► get(key)           absent → T::default()
//!     │                      unparseable → warn!, T::default()
//!     │                      I/O error → return Err (nothing written)
//!     ├─► f(&mut value)      false → no write
//!     └─► set(key, json)
//! ```
//!
//! List collections go through [`Document::update_entries`] instead, which
//! parses each array element on its own: one unreadable entry is skipped
//! and the rest of the list survives the next write.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

use super::KeyValueStore;
use crate::error::{Error, Result};

/// A typed JSON document bound to a storage key
#[derive(Clone)]
pub struct Document {
    key: &'static str,
    kv: Arc<dyn KeyValueStore>,
    lock: Arc<AsyncMutex<()>>,
}

impl Document {
    pub(super) fn new(
        key: &'static str,
        kv: Arc<dyn KeyValueStore>,
        lock: Arc<AsyncMutex<()>>,
    ) -> Self {
        Self { key, kv, lock }
    }

    /// The storage key this document lives under
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Read and parse the document.
    ///
    /// `Ok(None)` when the key is absent, [`Error::StorageCorrupted`] when
    /// the stored text is not a valid `T`.
    pub async fn load<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let raw = match self.kv.get(self.key).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| Error::StorageCorrupted {
                key: self.key.to_string(),
                reason: e.to_string(),
            })
    }

    /// Read a JSON array, keeping every element that parses as `T`.
    ///
    /// Unreadable elements are logged and skipped. The whole document is
    /// [`Error::StorageCorrupted`] only when it is not an array at all.
    pub async fn load_entries<T: DeserializeOwned>(&self) -> Result<Option<Vec<T>>> {
        let stored: Option<Vec<serde_json::Value>> = self.load().await?;
        Ok(stored.map(|entries| {
            entries
                .into_iter()
                .enumerate()
                .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::warn!(
                            key = self.key,
                            index,
                            error = %e,
                            "Skipping unreadable entry"
                        );
                        None
                    }
                })
                .collect()
        }))
    }

    /// Read a JSON array entry by entry, degrading any failure to empty.
    pub async fn read_entries<T: DeserializeOwned>(&self) -> Vec<T> {
        match self.load_entries().await {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "Read failed, using empty list");
                Vec::new()
            }
        }
    }

    /// Read the document, degrading any failure to `T::default()`.
    pub async fn read_or_default<T: DeserializeOwned + Default>(&self) -> T {
        match self.load().await {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "Read failed, using default");
                T::default()
            }
        }
    }

    /// Read the document, degrading any failure to `None`.
    pub async fn read_optional<T: DeserializeOwned>(&self) -> Option<T> {
        match self.load().await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "Read failed, treating as absent");
                None
            }
        }
    }

    /// Overwrite the document.
    pub async fn store<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.write(value).await
    }

    /// Read-modify-write under the key's lock.
    ///
    /// `mutate` returns whether it changed the value; nothing is written
    /// when it returns `false`. Returns the same flag.
    pub async fn update<T, F>(&self, mutate: F) -> Result<bool>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut T) -> bool,
    {
        let _guard = self.lock.lock().await;

        let loaded = self.load().await;
        let mut value: T = self.recover(loaded)?;

        if !mutate(&mut value) {
            return Ok(false);
        }

        self.write(&value).await?;
        Ok(true)
    }

    /// Read-modify-write of a JSON array under the key's lock.
    ///
    /// Like [`Document::update`], but elements are parsed one at a time
    /// (see [`Document::load_entries`]).
    pub async fn update_entries<T, F>(&self, mutate: F) -> Result<bool>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> bool,
    {
        let _guard = self.lock.lock().await;

        let loaded = self.load_entries().await;
        let mut entries: Vec<T> = self.recover(loaded)?;

        if !mutate(&mut entries) {
            return Ok(false);
        }

        self.write(&entries).await?;
        Ok(true)
    }

    /// Starting value for a read-modify-write. Corruption restarts from the
    /// default; backend failures abort.
    fn recover<T: Default>(&self, loaded: Result<Option<T>>) -> Result<T> {
        match loaded {
            Ok(value) => Ok(value.unwrap_or_default()),
            Err(e @ Error::StorageCorrupted { .. }) => {
                tracing::warn!(key = self.key, error = %e, "Discarding corrupted document");
                Ok(T::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Remove the document.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.kv.remove(self.key).await
    }

    async fn write<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.kv.set(self.key, &raw).await
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").field("key", &self.key).finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::super::testing::FlakyStore;
    use super::super::Storage;
    use std::sync::Arc;

    const KEY: &str = "@gobia_test_doc";

    #[tokio::test]
    async fn test_load_absent_is_none() {
        let storage = Storage::in_memory();
        let doc = storage.document(KEY);
        let value: Option<Vec<String>> = doc.load().await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_store_and_load() {
        let storage = Storage::in_memory();
        let doc = storage.document(KEY);

        doc.store(&vec!["a".to_string(), "b".to_string()]).await.unwrap();
        let value: Vec<String> = doc.load().await.unwrap().unwrap();
        assert_eq!(value, vec!["a", "b"]);
        assert_eq!(
            storage.kv().get(KEY).await.unwrap().as_deref(),
            Some(r#"["a","b"]"#)
        );
    }

    #[tokio::test]
    async fn test_corrupted_load_is_error() {
        let storage = Storage::in_memory();
        storage.kv().set(KEY, "{not json").await.unwrap();

        let result = storage.document(KEY).load::<Vec<String>>().await;
        assert_eq!(result.unwrap_err().code(), 403);
    }

    #[tokio::test]
    async fn test_update_skips_write_when_unchanged() {
        let storage = Storage::in_memory();
        let doc = storage.document(KEY);

        let changed = doc.update(|_: &mut Vec<String>| false).await.unwrap();
        assert!(!changed);
        assert!(storage.kv().get(KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_heals_corrupted_document() {
        let storage = Storage::in_memory();
        storage.kv().set(KEY, "][").await.unwrap();
        let doc = storage.document(KEY);

        doc.update(|list: &mut Vec<String>| {
            list.push("fresh".into());
            true
        })
        .await
        .unwrap();

        let value: Vec<String> = doc.load().await.unwrap().unwrap();
        assert_eq!(value, vec!["fresh"]);
    }

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Entry {
        id: String,
        score: u32,
    }

    #[tokio::test]
    async fn test_load_entries_skips_unreadable_entries() {
        let storage = Storage::in_memory();
        storage
            .kv()
            .set(KEY, r#"[{"id":"a","score":1},{"id":5},"junk",{"id":"b","score":2}]"#)
            .await
            .unwrap();
        let doc = storage.document(KEY);

        let entries: Vec<Entry> = doc.read_entries().await;
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        // Whole-document parsing would reject the list
        assert!(doc.load::<Vec<Entry>>().await.is_err());
    }

    #[tokio::test]
    async fn test_update_entries_keeps_readable_entries() {
        let storage = Storage::in_memory();
        storage
            .kv()
            .set(KEY, r#"[{"id":"a","score":1},{"id":5}]"#)
            .await
            .unwrap();
        let doc = storage.document(KEY);

        doc.update_entries(|entries: &mut Vec<Entry>| {
            entries.insert(0, Entry { id: "new".into(), score: 3 });
            true
        })
        .await
        .unwrap();

        let stored: Vec<Entry> = doc.load().await.unwrap().unwrap();
        assert_eq!(
            stored,
            vec![
                Entry { id: "new".into(), score: 3 },
                Entry { id: "a".into(), score: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_update_entries_restarts_when_not_an_array() {
        let storage = Storage::in_memory();
        storage.kv().set(KEY, r#"{"id":"a"}"#).await.unwrap();
        let doc = storage.document(KEY);

        doc.update_entries(|entries: &mut Vec<String>| {
            entries.push("fresh".into());
            true
        })
        .await
        .unwrap();

        let stored: Vec<String> = doc.load().await.unwrap().unwrap();
        assert_eq!(stored, vec!["fresh"]);
    }

    #[tokio::test]
    async fn test_update_propagates_read_failure_without_writing() {
        let flaky = Arc::new(FlakyStore::new());
        let storage = Storage::new(flaky.clone());
        let doc = storage.document(KEY);
        doc.store(&vec!["keep".to_string()]).await.unwrap();

        flaky.fail_reads(true);
        let result = doc
            .update(|list: &mut Vec<String>| {
                list.clear();
                true
            })
            .await;
        assert!(result.is_err());

        flaky.fail_reads(false);
        let value: Vec<String> = doc.load().await.unwrap().unwrap();
        assert_eq!(value, vec!["keep"]);
    }

    #[tokio::test]
    async fn test_read_or_default_on_failure() {
        let flaky = Arc::new(FlakyStore::new());
        let storage = Storage::new(flaky.clone());
        let doc = storage.document(KEY);
        doc.store(&vec!["x".to_string()]).await.unwrap();

        flaky.fail_reads(true);
        let value: Vec<String> = doc.read_or_default().await;
        assert!(value.is_empty());
        let value: Option<Vec<String>> = doc.read_optional().await;
        assert!(value.is_none());
    }
}
