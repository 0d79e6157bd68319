//! Key-value stores the KV registrar writes host records into.

use async_trait::async_trait;

use crate::error::StoreError;

mod etcd;
mod memory;

pub use etcd::EtcdStore;
pub use memory::MemoryStore;

/// Minimal key-value capability needed to publish SkyDNS host records.
///
/// Single-key writes are atomic: a call that fails leaves the key as it was.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Write `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Remove `key`. Returns whether a value was removed; an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;
}
