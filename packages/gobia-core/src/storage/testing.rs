//! Test backend with switchable failures.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{KeyValueStore, MemoryStore};
use crate::error::{Error, Result};

/// A [`MemoryStore`] whose reads and writes can be made to fail
#[derive(Debug, Default)]
pub(crate) struct FlakyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_writes_to: Mutex<Option<String>>,
}

impl FlakyStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Fail writes to one key only; `None` clears it
    pub(crate) fn fail_writes_to(&self, key: Option<&str>) {
        *self.fail_writes_to.lock() = key.map(str::to_string);
    }

    fn check_write(&self, key: &str) -> Result<()> {
        let targeted = self.fail_writes_to.lock().as_deref() == Some(key);
        if targeted || self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::StorageWriteError(format!("simulated write failure: {}", key)));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::StorageReadError(format!("simulated read failure: {}", key)));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_write(key)?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check_write(key)?;
        self.inner.remove(key).await
    }
}
