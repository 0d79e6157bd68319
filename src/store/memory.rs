//! In-memory key-value store.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::KvStore;
use crate::error::StoreError;

/// Thread-safe in-memory store, ordered by key.
///
/// Cloning shares the same underlying map. Used for dry runs and as a test
/// double; [`set_available`](Self::set_available) simulates an outage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Debug)]
struct MemoryStoreInner {
    entries: BTreeMap<String, String>,
    available: bool,
}

impl Default for MemoryStoreInner {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            available: true,
        }
    }
}

impl MemoryStore {
    /// Create an empty, available store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the store reachable or unreachable.
    pub fn set_available(&self, available: bool) {
        self.inner.write().available = available;
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Keys starting with `prefix`, in order.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let inner = self.inner.read();
        inner
            .entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn check_available(inner: &MemoryStoreInner) -> Result<(), StoreError> {
        if inner.available {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store marked unavailable".into()))
        }
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        Self::check_available(&inner)?;
        debug!(key, "memory store put");
        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let inner = self.inner.read();
        Self::check_available(&inner)?;
        Ok(inner.entries.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();
        Self::check_available(&inner)?;
        let removed = inner.entries.remove(key).is_some();
        debug!(key, removed, "memory store delete");
        Ok(removed)
    }
}
