//! Registrar writing SkyDNS host records into a key-value store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use super::{outcome, Registrar, DEFAULT_TTL};
use crate::codec;
use crate::error::{RegistrarError, StoreError};
use crate::metrics::{self, Operation, Timer};
use crate::store::KvStore;

/// Deadline for a single store write or delete.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Host record value stored under the SkyDNS key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvHostRecord {
    /// Address the name resolves to.
    pub host: String,
    /// Record TTL in seconds.
    pub ttl: u32,
}

/// Registrar backed by a shared [`KvStore`] handle.
///
/// The store is owned by the caller and never closed here. Every call gets
/// its own deadline; nothing is cached between calls.
pub struct KvRegistrar {
    store: Arc<dyn KvStore>,
    ttl: u32,
    write_timeout: Duration,
}

impl KvRegistrar {
    /// Create a registrar writing into `store`.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            ttl: DEFAULT_TTL,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Override the advertised TTL.
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Override the per-call deadline.
    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    fn key_for(domain: &str, suffix: &str) -> Result<String, RegistrarError> {
        let name = format!("{domain}{suffix}");
        if !codec::has_labels(&name) {
            return Err(RegistrarError::InvalidDomain(name));
        }
        Ok(codec::storage_key(&name))
    }

    /// Run one store call under the per-call deadline.
    ///
    /// An already-elapsed deadline fails before the store is touched.
    async fn bounded<T, F>(&self, call: F) -> Result<T, RegistrarError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        if self.write_timeout.is_zero() {
            return Err(RegistrarError::DeadlineExceeded(self.write_timeout));
        }

        match tokio::time::timeout(self.write_timeout, call).await {
            Ok(result) => result.map_err(RegistrarError::from),
            Err(_) => Err(RegistrarError::DeadlineExceeded(self.write_timeout)),
        }
    }

    async fn put_record(
        &self,
        domain: &str,
        address: &str,
        suffix: &str,
    ) -> Result<(), RegistrarError> {
        let key = Self::key_for(domain, suffix)?;
        let record = KvHostRecord {
            host: address.to_string(),
            ttl: self.ttl,
        };
        let value = serde_json::to_string(&record)?;

        info!(key = %key, value = %value, "put host record");
        let result = self.bounded(self.store.put(&key, &value)).await;
        if let Err(ref e) = result {
            error!(key = %key, value = %value, error = %e, "put host record failed");
        }
        result
    }

    async fn delete_record(&self, domain: &str, suffix: &str) -> Result<(), RegistrarError> {
        let key = Self::key_for(domain, suffix)?;

        info!(key = %key, "delete host record");
        match self.bounded(self.store.delete(&key)).await {
            Ok(removed) => {
                if !removed {
                    info!(key = %key, "host record already absent");
                }
                Ok(())
            }
            Err(e) => {
                error!(key = %key, error = %e, "delete host record failed");
                Err(e)
            }
        }
    }
}

#[async_trait]
impl Registrar for KvRegistrar {
    async fn update(
        &self,
        domain: &str,
        address: &str,
        suffix: &str,
    ) -> Result<(), RegistrarError> {
        let timer = Timer::start();
        let result = self.put_record(domain, address, suffix).await;
        metrics::record_operation(
            self.backend(),
            Operation::Update,
            outcome(&result),
            timer.elapsed(),
        );
        result
    }

    async fn delete(&self, domain: &str, suffix: &str) -> Result<(), RegistrarError> {
        let timer = Timer::start();
        let result = self.delete_record(domain, suffix).await;
        metrics::record_operation(
            self.backend(),
            Operation::Delete,
            outcome(&result),
            timer.elapsed(),
        );
        result
    }

    fn backend(&self) -> &'static str {
        "kv"
    }
}
