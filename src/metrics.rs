//! Metrics instrumentation for dns-registrar.
//!
//! All metrics are prefixed with `dns_registrar.`

use metrics::counter;
use metrics::histogram;
use std::time::Instant;

/// Registrar operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Publish or overwrite a host record.
    Update,
    /// Retract a host record.
    Delete,
}

impl Operation {
    /// Label value used in metrics and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// Outcome of a registrar operation.
#[derive(Debug, Clone, Copy)]
pub enum OperationResult {
    /// Backend acknowledged the write.
    Success,
    /// Input rejected before reaching the backend.
    Invalid,
    /// Per-call deadline elapsed.
    Timeout,
    /// Backend or transport failure.
    Error,
}

/// Record one registrar operation.
pub fn record_operation(
    backend: &'static str,
    operation: Operation,
    result: OperationResult,
    duration: std::time::Duration,
) {
    let result_str = match result {
        OperationResult::Success => "success",
        OperationResult::Invalid => "invalid",
        OperationResult::Timeout => "timeout",
        OperationResult::Error => "error",
    };

    counter!(
        "dns_registrar.operation.count",
        "backend" => backend,
        "operation" => operation.as_str(),
        "result" => result_str
    )
    .increment(1);
    histogram!(
        "dns_registrar.operation.duration.seconds",
        "backend" => backend,
        "operation" => operation.as_str()
    )
    .record(duration.as_secs_f64());
}

/// Record a retry issued by the retry decorator.
pub fn record_retry(operation: Operation) {
    counter!("dns_registrar.retry.count", "operation" => operation.as_str()).increment(1);
}

/// Record one exporter request and whether the actuator answered.
pub fn record_exporter_request(success: bool, providers: usize) {
    let result = if success { "success" } else { "error" };
    counter!("dns_registrar.exporter.request.count", "result" => result).increment(1);
    if success {
        histogram!("dns_registrar.exporter.providers").record(providers as f64);
    }
}

/// Helper for timing operations.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration since timer start.
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}
