//! etcd v3 store reached through its JSON gRPC gateway.
//!
//! The gateway takes base64 keys and values:
//!
//! ```text
//! POST /v3/kv/put          {"key": "<b64>", "value": "<b64>"}
//! POST /v3/kv/range        {"key": "<b64>"}   → {"kvs": [{"key", "value"}]}
//! POST /v3/kv/deleterange  {"key": "<b64>"}   → {"deleted": "1"}
//! ```

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::KvStore;
use crate::error::StoreError;
use crate::http;

#[derive(Serialize)]
struct PutRequest {
    key: String,
    value: String,
}

#[derive(Serialize)]
struct KeyRequest {
    key: String,
}

#[derive(Deserialize)]
struct RangeResponse {
    #[serde(default)]
    kvs: Vec<KeyValue>,
}

#[derive(Deserialize)]
struct KeyValue {
    #[serde(default)]
    value: String,
}

#[derive(Deserialize)]
struct DeleteRangeResponse {
    /// int64 fields come back as JSON strings from the gateway.
    #[serde(default)]
    deleted: Option<serde_json::Value>,
}

/// Shared handle to an etcd cluster.
///
/// Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct EtcdStore {
    client: reqwest::Client,
    endpoint: String,
}

impl EtcdStore {
    /// Connect to the gateway at `endpoint` (`host:port` or URL).
    pub fn new(endpoint: &str, connect_timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Self::with_client(client, endpoint)
    }

    /// Build a store on top of an existing HTTP client.
    pub fn with_client(client: reqwest::Client, endpoint: &str) -> Result<Self, StoreError> {
        Ok(Self {
            client,
            endpoint: http::base_url(endpoint).map_err(StoreError::InvalidEndpoint)?,
        })
    }

    /// Gateway base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<String, StoreError> {
        let url = format!("{}{}", self.endpoint, path);
        let response = self.client.post(&url).json(body).send().await?;
        let (status, text) = http::drain(response).await;
        if !status.is_success() {
            return Err(StoreError::Status { status, body: text });
        }
        Ok(text)
    }
}

fn decode_count(value: Option<serde_json::Value>) -> Result<u64, StoreError> {
    match value {
        None => Ok(0),
        Some(serde_json::Value::String(s)) => s
            .parse()
            .map_err(|_| StoreError::Decode(format!("invalid count {s:?}"))),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| StoreError::Decode(format!("invalid count {n}"))),
        Some(other) => Err(StoreError::Decode(format!("invalid count {other}"))),
    }
}

#[async_trait]
impl KvStore for EtcdStore {
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let request = PutRequest {
            key: BASE64.encode(key),
            value: BASE64.encode(value),
        };
        self.call("/v3/kv/put", &request).await?;
        debug!(key, "etcd put acknowledged");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let request = KeyRequest {
            key: BASE64.encode(key),
        };
        let body = self.call("/v3/kv/range", &request).await?;
        let response: RangeResponse =
            serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))?;

        let Some(kv) = response.kvs.into_iter().next() else {
            return Ok(None);
        };
        let bytes = BASE64
            .decode(kv.value.as_bytes())
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        let value = String::from_utf8(bytes).map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(Some(value))
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let request = KeyRequest {
            key: BASE64.encode(key),
        };
        let body = self.call("/v3/kv/deleterange", &request).await?;
        let response: DeleteRangeResponse =
            serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))?;
        let deleted = decode_count(response.deleted)?;
        debug!(key, deleted, "etcd delete acknowledged");
        Ok(deleted > 0)
    }
}
