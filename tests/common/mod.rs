//! Shared test infrastructure: in-process mock backends served by axum.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use tokio::net::TcpListener;

// --- Constants ---

pub const SUFFIX: &str = ".ns.svc.cluster.local";
pub const SVC_KEY: &str = "/skydns/local/cluster/svc/ns/svc";

// --- Server plumbing ---

/// Serve `router` on an ephemeral loopback port. Returns the bound address.
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock server");
    let addr = listener.local_addr().expect("failed to get local addr");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("mock server failed");
    });
    addr
}

// --- Dynamic-DNS API mock ---

/// A request received by [`MockDnsApi`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub body: Value,
}

/// Dynamic-DNS API double that records request bodies and keeps the
/// resulting `(zone, name) -> address` table.
///
/// Deleting an absent record answers `404`, like the real API.
#[derive(Clone, Default)]
pub struct MockDnsApi {
    inner: Arc<Mutex<MockDnsApiInner>>,
}

#[derive(Default)]
struct MockDnsApiInner {
    requests: Vec<RecordedRequest>,
    records: HashMap<(String, String), String>,
    fail_next: VecDeque<StatusCode>,
    delay: Duration,
}

impl MockDnsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start serving; returns the `host:port` address to hand to the registrar.
    pub async fn start(&self) -> String {
        let router = Router::new()
            .route("/dynapi", put(dynapi_put).delete(dynapi_delete))
            .with_state(self.clone());
        spawn_server(router).await.to_string()
    }

    /// Answer the next request with `status` without touching the table.
    pub fn fail_next(&self, status: StatusCode) {
        self.inner.lock().unwrap().fail_next.push_back(status);
    }

    /// Hold every response for `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().delay = delay;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn lookup(&self, zone: &str, name: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .records
            .get(&(zone.to_string(), name.to_string()))
            .cloned()
    }

    pub fn record_count(&self) -> usize {
        self.inner.lock().unwrap().records.len()
    }
}

fn record_key(body: &Value) -> (String, String) {
    (
        body["zone"].as_str().unwrap_or_default().to_string(),
        body["name"].as_str().unwrap_or_default().to_string(),
    )
}

async fn respond_after_delay(api: &MockDnsApi) {
    let delay = api.inner.lock().unwrap().delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

async fn dynapi_put(State(api): State<MockDnsApi>, Json(body): Json<Value>) -> StatusCode {
    respond_after_delay(&api).await;
    let mut inner = api.inner.lock().unwrap();
    inner.requests.push(RecordedRequest {
        method: "PUT",
        body: body.clone(),
    });
    if let Some(status) = inner.fail_next.pop_front() {
        return status;
    }

    let address = body["address"].as_str().unwrap_or_default().to_string();
    inner.records.insert(record_key(&body), address);
    StatusCode::OK
}

async fn dynapi_delete(State(api): State<MockDnsApi>, Json(body): Json<Value>) -> StatusCode {
    respond_after_delay(&api).await;
    let mut inner = api.inner.lock().unwrap();
    inner.requests.push(RecordedRequest {
        method: "DELETE",
        body: body.clone(),
    });
    if let Some(status) = inner.fail_next.pop_front() {
        return status;
    }

    match inner.records.remove(&record_key(&body)) {
        Some(_) => StatusCode::OK,
        None => StatusCode::NOT_FOUND,
    }
}

// --- etcd JSON gateway mock ---

/// etcd v3 gateway double backed by an ordered map.
#[derive(Clone, Default)]
pub struct MockEtcd {
    inner: Arc<Mutex<MockEtcdInner>>,
}

#[derive(Default)]
struct MockEtcdInner {
    entries: BTreeMap<String, String>,
    unavailable: bool,
}

impl MockEtcd {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start serving; returns the `host:port` address of the gateway.
    pub async fn start(&self) -> String {
        let router = Router::new()
            .route("/v3/kv/put", post(etcd_put))
            .route("/v3/kv/range", post(etcd_range))
            .route("/v3/kv/deleterange", post(etcd_delete_range))
            .with_state(self.clone());
        spawn_server(router).await.to_string()
    }

    /// Make every request answer `503`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unwrap().unavailable = unavailable;
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().unwrap().entries.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }
}

fn decode_field(body: &Value, field: &str) -> Result<String, StatusCode> {
    let encoded = body[field].as_str().ok_or(StatusCode::BAD_REQUEST)?;
    let bytes = BASE64
        .decode(encoded)
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    String::from_utf8(bytes).map_err(|_| StatusCode::BAD_REQUEST)
}

async fn etcd_put(
    State(etcd): State<MockEtcd>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let key = decode_field(&body, "key")?;
    let value = decode_field(&body, "value")?;

    let mut inner = etcd.inner.lock().unwrap();
    if inner.unavailable {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    inner.entries.insert(key, value);
    Ok(Json(json!({ "header": { "revision": "1" } })))
}

async fn etcd_range(
    State(etcd): State<MockEtcd>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let key = decode_field(&body, "key")?;

    let inner = etcd.inner.lock().unwrap();
    if inner.unavailable {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    // The gateway omits empty and zero-valued fields.
    match inner.entries.get(&key) {
        Some(value) => Ok(Json(json!({
            "header": {},
            "kvs": [{ "key": BASE64.encode(&key), "value": BASE64.encode(value) }],
            "count": "1"
        }))),
        None => Ok(Json(json!({ "header": {} }))),
    }
}

async fn etcd_delete_range(
    State(etcd): State<MockEtcd>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let key = decode_field(&body, "key")?;

    let mut inner = etcd.inner.lock().unwrap();
    if inner.unavailable {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    match inner.entries.remove(&key) {
        Some(_) => Ok(Json(json!({ "header": {}, "deleted": "1" }))),
        None => Ok(Json(json!({ "header": {} }))),
    }
}

// --- RPC actuator mock ---

/// Serve `body` with `status` at the actuator services path.
/// Returns the full actuator URL.
pub async fn start_actuator(status: StatusCode, body: Value) -> String {
    let router = Router::new().route(
        "/actuator/dubbo/services",
        axum::routing::get(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );
    let addr = spawn_server(router).await;
    format!("http://{addr}/actuator/dubbo/services")
}
