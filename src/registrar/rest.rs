//! Registrar driving a dynamic-DNS management API over HTTP.
//!
//! ```text
//! PUT    <base>/dynapi  {"zone":"example.com.","name":"foo","type":"A","address":"1.2.3.4","ttl":3600}
//! DELETE <base>/dynapi  {"zone":"example.com.","name":"foo","type":"A","ttl":3600}
//! ```
//!
//! Any non-2xx answer is an [`RegistrarError::HttpStatus`], except `404` on
//! `DELETE`, which means the record is already gone.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use super::{outcome, Registrar, DEFAULT_TTL};
use crate::codec;
use crate::error::RegistrarError;
use crate::http;
use crate::metrics::{self, Operation, Timer};
use crate::zone;

/// Path of the dynamic-DNS endpoint under the base address.
pub const DYNAPI_PATH: &str = "/dynapi";

/// Per-request timeout, covering connect, send and response.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Record type published by this registrar.
pub const RECORD_TYPE_A: &str = "A";

/// Request body understood by the dynamic-DNS API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestHostRecord {
    /// Canonical zone, e.g. `example.com.`.
    pub zone: String,
    /// Lower-case record name relative to the zone.
    pub name: String,
    /// Record type, always `A`.
    #[serde(rename = "type")]
    pub record_type: String,
    /// Address; omitted on delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Record TTL in seconds.
    pub ttl: u32,
}

impl RestHostRecord {
    /// Build a normalized record for `domain` under the `suffix` zone.
    pub fn new(
        domain: &str,
        suffix: &str,
        address: Option<&str>,
        ttl: u32,
    ) -> Result<Self, RegistrarError> {
        if !codec::has_labels(domain) {
            return Err(RegistrarError::InvalidDomain(domain.to_string()));
        }

        Ok(Self {
            zone: zone::normalize_zone(suffix)?,
            name: zone::normalize_name(domain),
            record_type: RECORD_TYPE_A.to_string(),
            address: address.map(str::to_string),
            ttl,
        })
    }
}

/// Registrar talking to a dynamic-DNS API at a fixed base address.
///
/// One pooled HTTP client is reused across calls.
#[derive(Debug, Clone)]
pub struct RestRegistrar {
    client: reqwest::Client,
    url: String,
    ttl: u32,
}

impl RestRegistrar {
    /// Create a registrar for the API at `address` (`host:port` or URL).
    pub fn new(address: &str) -> Result<Self, RegistrarError> {
        Self::with_timeout(address, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a registrar with an explicit per-request timeout.
    pub fn with_timeout(address: &str, timeout: Duration) -> Result<Self, RegistrarError> {
        if address.trim().is_empty() {
            return Err(RegistrarError::Config(
                "DNS API address must not be empty".to_string(),
            ));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, address)
    }

    /// Create a registrar on top of an existing HTTP client.
    pub fn with_client(client: reqwest::Client, address: &str) -> Result<Self, RegistrarError> {
        let base = http::base_url(address).map_err(RegistrarError::Config)?;
        info!(address, "new dynamic-DNS registrar");
        Ok(Self {
            client,
            url: format!("{base}{DYNAPI_PATH}"),
            ttl: DEFAULT_TTL,
        })
    }

    /// Override the advertised TTL.
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Full endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send(&self, method: Method, record: &RestHostRecord) -> Result<(), RegistrarError> {
        let data = serde_json::to_string(record)?;
        info!(url = %self.url, method = %method, data = %data, "dynamic-DNS request");

        let response = self
            .client
            .request(method.clone(), &self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(data)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.url, method = %method, error = %e, "dynamic-DNS request failed");
                RegistrarError::from(e)
            })?;

        let (status, body) = http::drain(response).await;
        if status.is_success() {
            return Ok(());
        }
        if method == Method::DELETE && status == StatusCode::NOT_FOUND {
            info!(name = %record.name, zone = %record.zone, "record already absent");
            return Ok(());
        }

        error!(
            url = %self.url,
            method = %method,
            status = %status,
            body = %body,
            "dynamic-DNS request rejected"
        );
        Err(RegistrarError::HttpStatus {
            method: method.to_string(),
            url: self.url.clone(),
            status,
            body,
        })
    }
}

#[async_trait]
impl Registrar for RestRegistrar {
    async fn update(
        &self,
        domain: &str,
        address: &str,
        suffix: &str,
    ) -> Result<(), RegistrarError> {
        let timer = Timer::start();
        let result = match RestHostRecord::new(domain, suffix, Some(address), self.ttl) {
            Ok(record) => self.send(Method::PUT, &record).await,
            Err(e) => Err(e),
        };
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
        let result = match RestHostRecord::new(domain, suffix, None, self.ttl) {
            Ok(record) => self.send(Method::DELETE, &record).await,
            Err(e) => Err(e),
        };
        metrics::record_operation(
            self.backend(),
            Operation::Delete,
            outcome(&result),
            timer.elapsed(),
        );
        result
    }

    fn backend(&self) -> &'static str {
        "rest"
    }
}
