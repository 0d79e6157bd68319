//! dns-registrar - Publish DNS host records for services outside the mesh registry.
//!
//! Legacy RPC providers are not tracked by the mesh's own service registry, but
//! their endpoints still have to resolve through DNS. This crate publishes and
//! retracts A records for them through one of two interchangeable backends.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                          dns-registrar                            │
//! │                                                                   │
//! │  caller ──▶ RetryingRegistrar ──▶ dyn Registrar                   │
//! │                                      │                            │
//! │                 ┌────────────────────┴──────────────┐             │
//! │                 ▼                                   ▼             │
//! │       ┌──────────────────┐                ┌──────────────────┐    │
//! │       │   KvRegistrar    │                │  RestRegistrar   │    │
//! │       │ codec::storage_  │                │ zone::normalize_ │    │
//! │       │      key         │                │      zone        │    │
//! │       └────────┬─────────┘                └────────┬─────────┘    │
//! │                ▼                                   ▼              │
//! │        KvStore (etcd)                    PUT/DELETE /dynapi       │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Record layout
//!
//! ```text
//! update("svc", "10.0.0.1", ".ns.svc.cluster.local")
//!   KV:   /skydns/local/cluster/svc/ns/svc = {"host":"10.0.0.1","ttl":3600}
//!   REST: PUT /dynapi {"zone":"ns.svc.cluster.local.","name":"svc","type":"A",...}
//! ```
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dns_registrar::registrar::{KvRegistrar, Registrar};
//! use dns_registrar::store::EtcdStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = EtcdStore::new("127.0.0.1:2379", std::time::Duration::from_secs(1)).unwrap();
//!     let registrar = KvRegistrar::new(Arc::new(store));
//!
//!     registrar.update("svc", "10.0.0.1", ".ns.svc.cluster.local").await.unwrap();
//!     registrar.delete("svc", ".ns.svc.cluster.local").await.unwrap();
//! }
//! ```

#![warn(missing_docs)]

pub mod codec;
pub mod config;
pub mod error;
pub mod exporter;
pub mod http;
pub mod metrics;
pub mod registrar;
pub mod store;
pub mod telemetry;
pub mod zone;

// Re-export main types
pub use codec::storage_key;
pub use config::{BackendConfig, Config, ExporterConfig, RegistrarConfig, TelemetryConfig};
pub use error::{ExporterError, RegistrarError, StoreError};
pub use exporter::RpcInfoExporter;
pub use registrar::{KvRegistrar, Registrar, RestRegistrar, RetryingRegistrar};
pub use store::{EtcdStore, KvStore, MemoryStore};
pub use zone::normalize_zone;
