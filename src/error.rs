//! Error types for dns-registrar.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by a [`Registrar`](crate::registrar::Registrar).
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// Zone suffix is empty or made only of dots.
    #[error("Invalid zone {0:?}: zone must contain at least one label")]
    InvalidZone(String),

    /// Domain has no labels to publish.
    #[error("Invalid domain {0:?}: domain must contain at least one label")]
    InvalidDomain(String),

    /// The per-call deadline elapsed before the backend acknowledged.
    #[error("Deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// Key-value store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// HTTP transport error talking to the DNS management API.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// DNS management API answered with a non-success status.
    #[error("DNS API returned {status} for {method} {url}: {body}")]
    HttpStatus {
        /// Request method.
        method: String,
        /// Request URL.
        url: String,
        /// Response status.
        status: StatusCode,
        /// Response body, possibly empty.
        body: String,
    },

    /// Record could not be serialized.
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl RegistrarError {
    /// Whether a caller may reasonably retry the same call.
    ///
    /// Validation and encoding failures are permanent. Deadlines, transport
    /// failures, store outages, `429` and `5xx` responses are transient.
    pub fn is_transient(&self) -> bool {
        match self {
            RegistrarError::DeadlineExceeded(_) | RegistrarError::Http(_) => true,
            RegistrarError::Store(e) => e.is_transient(),
            RegistrarError::HttpStatus { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            RegistrarError::InvalidZone(_)
            | RegistrarError::InvalidDomain(_)
            | RegistrarError::Encode(_)
            | RegistrarError::Config(_) => false,
        }
    }
}

/// Errors returned by a [`KvStore`](crate::store::KvStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store cannot be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// HTTP transport error talking to the store gateway.
    #[error("Store transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Store gateway answered with a non-success status.
    #[error("Store returned {status}: {body}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Response body, possibly empty.
        body: String,
    },

    /// Store response could not be decoded.
    #[error("Store decode error: {0}")]
    Decode(String),

    /// Store endpoint is not a usable URL.
    #[error("Invalid store endpoint: {0}")]
    InvalidEndpoint(String),
}

impl StoreError {
    /// Whether the failure may clear up on its own.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Unavailable(_) | StoreError::Transport(_) => true,
            StoreError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            StoreError::Decode(_) | StoreError::InvalidEndpoint(_) => false,
        }
    }
}

/// Errors raised while serving the RPC interface exporter.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// IO error (bind, accept).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Actuator request failed.
    #[error("Actuator request failed: {0}")]
    Actuator(#[from] reqwest::Error),

    /// Actuator answered with a non-success status.
    #[error("Actuator returned {0}")]
    ActuatorStatus(StatusCode),

    /// Actuator body was not the expected JSON.
    #[error("Malformed actuator response: {0}")]
    Malformed(#[from] serde_json::Error),
}
