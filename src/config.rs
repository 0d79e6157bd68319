//! Configuration types for dns-registrar.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::exporter::{DEFAULT_ACTUATOR_URL, DEFAULT_SERIALIZATION};
use crate::registrar::kv::DEFAULT_WRITE_TIMEOUT;
use crate::registrar::rest::DEFAULT_REQUEST_TIMEOUT;
use crate::registrar::DEFAULT_TTL;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Registrar configuration.
    pub registrar: RegistrarConfig,

    /// RPC interface exporter configuration.
    #[serde(default)]
    pub exporter: ExporterConfig,

    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Registrar configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrarConfig {
    /// Backend the records are published to.
    pub backend: BackendConfig,

    /// TTL for published records in seconds.
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Retry policy applied around the backend.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Registrar backend selection. Exactly one backend serves a deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// SkyDNS host records written into etcd through its JSON gateway.
    Etcd {
        /// etcd gateway address (e.g., "127.0.0.1:2379").
        endpoint: String,

        /// Deadline for a single write or delete, in milliseconds.
        #[serde(default = "default_write_timeout_ms")]
        write_timeout_ms: u64,
    },

    /// Dynamic-DNS management API.
    Rest {
        /// API address (e.g., "10.0.0.5:9053" or "http://dns-api:9053").
        address: String,

        /// Per-request timeout, in milliseconds.
        #[serde(default = "default_request_timeout_ms")]
        request_timeout_ms: u64,
    },

    /// Process-local store, for dry runs.
    Memory {
        /// Deadline for a single write or delete, in milliseconds.
        #[serde(default = "default_write_timeout_ms")]
        write_timeout_ms: u64,
    },
}

/// Retry policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Cap for the doubling delay, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// RPC interface exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Address the exporter listens on.
    #[serde(default = "default_exporter_addr")]
    pub listen_addr: SocketAddr,

    /// Local actuator endpoint listing the exported services.
    #[serde(default = "default_actuator_url")]
    pub actuator_url: String,

    /// Serialization reported for providers that leave it empty.
    #[serde(default = "default_serialization")]
    pub default_serialization: String,

    /// Timeout for one actuator request, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_exporter_addr(),
            actuator_url: default_actuator_url(),
            default_serialization: default_serialization(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level filter (e.g., "info", "debug", "dns_registrar=debug,warn").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Prometheus metrics exporter address.
    #[serde(default)]
    pub prometheus_addr: Option<SocketAddr>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            prometheus_addr: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_write_timeout_ms() -> u64 {
    DEFAULT_WRITE_TIMEOUT.as_millis() as u64
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_millis() as u64
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    200
}

fn default_max_backoff_ms() -> u64 {
    5000
}

fn default_exporter_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 10006))
}

fn default_actuator_url() -> String {
    DEFAULT_ACTUATOR_URL.to_string()
}

fn default_serialization() -> String {
    DEFAULT_SERIALIZATION.to_string()
}
