//! The registrar capability and its backends.
//!
//! A [`Registrar`] publishes (`update`) and retracts (`delete`) the A record
//! for `domain + suffix`. Two backends implement it:
//!
//! - [`KvRegistrar`] writes SkyDNS host records straight into a key-value store.
//! - [`RestRegistrar`] drives a dynamic-DNS management API over HTTP.
//!
//! The backend is picked once, at construction, by [`from_config`]. Retrying
//! is layered on top with [`RetryingRegistrar`] and never lives inside a backend.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::{BackendConfig, RegistrarConfig};
use crate::error::RegistrarError;
use crate::metrics::OperationResult;
use crate::store::{EtcdStore, MemoryStore};

pub mod kv;
pub mod rest;
pub mod retry;

pub use kv::{KvHostRecord, KvRegistrar};
pub use rest::{RestHostRecord, RestRegistrar};
pub use retry::{RetryPolicy, RetryingRegistrar};

/// TTL advertised for every published record, in seconds.
pub const DEFAULT_TTL: u32 = 3600;

/// Publish and retract host records for a service domain.
#[async_trait]
pub trait Registrar: Send + Sync {
    /// Publish `address` for `domain + suffix`, replacing any previous record.
    async fn update(
        &self,
        domain: &str,
        address: &str,
        suffix: &str,
    ) -> Result<(), RegistrarError>;

    /// Retract the record for `domain + suffix`. Retracting an absent record succeeds.
    async fn delete(&self, domain: &str, suffix: &str) -> Result<(), RegistrarError>;

    /// Short backend name used in logs and metrics.
    fn backend(&self) -> &'static str {
        "custom"
    }
}

#[async_trait]
impl<R: Registrar + ?Sized> Registrar for Arc<R> {
    async fn update(
        &self,
        domain: &str,
        address: &str,
        suffix: &str,
    ) -> Result<(), RegistrarError> {
        (**self).update(domain, address, suffix).await
    }

    async fn delete(&self, domain: &str, suffix: &str) -> Result<(), RegistrarError> {
        (**self).delete(domain, suffix).await
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}

/// Build the configured registrar, wrapped in the retry decorator.
pub fn from_config(config: &RegistrarConfig) -> Result<Arc<dyn Registrar>, RegistrarError> {
    let policy = RetryPolicy::from(&config.retry);

    let registrar: Arc<dyn Registrar> = match &config.backend {
        BackendConfig::Etcd {
            endpoint,
            write_timeout_ms,
        } => {
            info!(endpoint = %endpoint, "using etcd registrar");
            let store = EtcdStore::new(endpoint, Duration::from_millis(*write_timeout_ms))?;
            let registrar = KvRegistrar::new(Arc::new(store))
                .with_ttl(config.ttl)
                .with_write_timeout(Duration::from_millis(*write_timeout_ms));
            Arc::new(RetryingRegistrar::new(registrar, policy))
        }
        BackendConfig::Rest {
            address,
            request_timeout_ms,
        } => {
            info!(address = %address, "using REST registrar");
            let registrar =
                RestRegistrar::with_timeout(address, Duration::from_millis(*request_timeout_ms))?
                    .with_ttl(config.ttl);
            Arc::new(RetryingRegistrar::new(registrar, policy))
        }
        BackendConfig::Memory { write_timeout_ms } => {
            info!("using in-memory registrar");
            let registrar = KvRegistrar::new(Arc::new(MemoryStore::new()))
                .with_ttl(config.ttl)
                .with_write_timeout(Duration::from_millis(*write_timeout_ms));
            Arc::new(RetryingRegistrar::new(registrar, policy))
        }
    };

    Ok(registrar)
}

/// Classify a call result for metrics.
pub(crate) fn outcome(result: &Result<(), RegistrarError>) -> OperationResult {
    match result {
        Ok(()) => OperationResult::Success,
        Err(RegistrarError::InvalidZone(_) | RegistrarError::InvalidDomain(_)) => {
            OperationResult::Invalid
        }
        Err(RegistrarError::DeadlineExceeded(_)) => OperationResult::Timeout,
        Err(_) => OperationResult::Error,
    }
}
