//! Retry decorator for any [`Registrar`].

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use super::Registrar;
use crate::config::RetryConfig;
use crate::error::RegistrarError;
use crate::metrics::{self, Operation};

/// Exponential backoff policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero behaves like one.
    pub max_attempts: u32,
    /// Delay before the first retry, capped at `max_backoff`.
    pub initial_backoff: Duration,
    /// Upper bound for the doubling delay.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }
}

/// Wraps a registrar and retries transient failures with backoff.
///
/// Only errors for which [`RegistrarError::is_transient`] holds are retried;
/// the last error is returned once attempts run out.
pub struct RetryingRegistrar<R> {
    inner: R,
    policy: RetryPolicy,
}

impl<R: Registrar> RetryingRegistrar<R> {
    /// Wrap `inner` with `policy`.
    pub fn new(inner: R, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped registrar.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    async fn run<F, Fut>(&self, operation: Operation, mut call: F) -> Result<(), RegistrarError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<(), RegistrarError>> + Send,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut backoff = self.policy.initial_backoff.min(self.policy.max_backoff);
        let mut attempt = 1;

        loop {
            match call().await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    warn!(
                        backend = self.inner.backend(),
                        operation = operation.as_str(),
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "registrar call failed, retrying"
                    );
                    metrics::record_retry(operation);
                    sleep(backoff).await;
                    backoff = backoff.saturating_mul(2).min(self.policy.max_backoff);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl<R: Registrar> Registrar for RetryingRegistrar<R> {
    async fn update(
        &self,
        domain: &str,
        address: &str,
        suffix: &str,
    ) -> Result<(), RegistrarError> {
        self.run(Operation::Update, move || self.inner.update(domain, address, suffix))
            .await
    }

    async fn delete(&self, domain: &str, suffix: &str) -> Result<(), RegistrarError> {
        self.run(Operation::Delete, move || self.inner.delete(domain, suffix))
            .await
    }

    fn backend(&self) -> &'static str {
        self.inner.backend()
    }
}
