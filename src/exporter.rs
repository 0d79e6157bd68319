//! RPC interface exporter.
//!
//! Republishes the provider interfaces a local RPC actuator reports, so the
//! component deciding what to register can discover them over HTTP:
//!
//! ```text
//! GET /rpc/interfaces
//!   → GET http://localhost:8081/actuator/dubbo/services
//!   ← {"success": true, "data": {"protocol": "DUBBO", "providers": [...]}}
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::config::ExporterConfig;
use crate::error::ExporterError;
use crate::http;
use crate::metrics;

/// Default actuator endpoint listing exported services.
pub const DEFAULT_ACTUATOR_URL: &str = "http://localhost:8081/actuator/dubbo/services";

/// Serialization reported when a provider leaves it empty.
pub const DEFAULT_SERIALIZATION: &str = "hessian2";

/// Protocol reported for every provider list.
pub const RPC_PROTOCOL: &str = "DUBBO";

/// Route serving the provider list.
pub const INTERFACES_PATH: &str = "/rpc/interfaces";

/// One exported provider interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInterface {
    /// Fully-qualified interface name.
    #[serde(rename = "interface", default, deserialize_with = "null_as_empty")]
    pub interface_name: String,
    /// Provider group.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub group: String,
    /// Serialization codec.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub serialization: String,
    /// Interface version.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub version: String,
}

/// Actuators report unset attributes as `null`; treat them like missing ones.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Provider list served to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfacesDto {
    /// RPC protocol name.
    pub protocol: String,
    /// Exported providers, sorted by interface, group and version.
    pub providers: Vec<ProviderInterface>,
}

/// Polls the local actuator on every request.
#[derive(Debug, Clone)]
pub struct RpcInfoExporter {
    client: reqwest::Client,
    actuator_url: String,
    default_serialization: String,
}

impl RpcInfoExporter {
    /// Create an exporter from configuration.
    pub fn new(config: &ExporterConfig) -> Result<Self, ExporterError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            actuator_url: config.actuator_url.clone(),
            default_serialization: config.default_serialization.clone(),
        })
    }

    /// Fetch the provider list from the actuator.
    pub async fn fetch_interfaces(&self) -> Result<InterfacesDto, ExporterError> {
        debug!(url = %self.actuator_url, "polling local RPC actuator");
        let response = self.client.get(&self.actuator_url).send().await?;
        let (status, body) = http::drain(response).await;
        if status != reqwest::StatusCode::OK {
            return Err(ExporterError::ActuatorStatus(status));
        }

        let info: HashMap<String, ProviderInterface> = serde_json::from_str(&body)?;
        Ok(self.to_dto(info))
    }

    fn to_dto(&self, info: HashMap<String, ProviderInterface>) -> InterfacesDto {
        let mut providers: Vec<ProviderInterface> = info
            .into_values()
            .map(|mut provider| {
                if provider.serialization.is_empty() {
                    provider.serialization = self.default_serialization.clone();
                }
                provider
            })
            .collect();
        providers.sort_by(|a, b| {
            (&a.interface_name, &a.group, &a.version).cmp(&(
                &b.interface_name,
                &b.group,
                &b.version,
            ))
        });

        InterfacesDto {
            protocol: RPC_PROTOCOL.to_string(),
            providers,
        }
    }

    /// Build the HTTP router serving [`INTERFACES_PATH`].
    pub fn router(self) -> Router {
        Router::new()
            .route(INTERFACES_PATH, get(get_interfaces))
            .with_state(Arc::new(self))
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ExporterError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        info!(%addr, actuator_url = %self.actuator_url, "RPC interface exporter listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("RPC interface exporter stopped");
        Ok(())
    }
}

async fn get_interfaces(State(exporter): State<Arc<RpcInfoExporter>>) -> Response {
    match exporter.fetch_interfaces().await {
        Ok(data) => {
            metrics::record_exporter_request(true, data.providers.len());
            (StatusCode::OK, Json(json!({ "success": true, "data": data }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "get local RPC info failed");
            metrics::record_exporter_request(false, 0);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "success": false, "message": e.to_string() })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(interface: &str, serialization: &str) -> ProviderInterface {
        ProviderInterface {
            interface_name: interface.to_string(),
            group: String::new(),
            serialization: serialization.to_string(),
            version: "1.0.0".to_string(),
        }
    }

    #[test]
    fn test_empty_serialization_defaults() {
        let exporter = RpcInfoExporter::new(&ExporterConfig::default()).unwrap();
        let info = HashMap::from([
            ("b".to_string(), provider("com.example.B", "")),
            ("a".to_string(), provider("com.example.A", "kryo")),
        ]);

        let dto = exporter.to_dto(info);
        assert_eq!(dto.protocol, "DUBBO");
        assert_eq!(
            dto.providers,
            vec![
                provider("com.example.A", "kryo"),
                provider("com.example.B", "hessian2"),
            ]
        );
    }

    #[test]
    fn test_provider_parses_actuator_fields() {
        let parsed: HashMap<String, ProviderInterface> = serde_json::from_str(
            r#"{"ServiceBean:com.example.Greeter:1.0.0":
                {"interface":"com.example.Greeter","group":"g","version":"1.0.0","timeout":3000}}"#,
        )
        .unwrap();

        let greeter = &parsed["ServiceBean:com.example.Greeter:1.0.0"];
        assert_eq!(greeter.interface_name, "com.example.Greeter");
        assert_eq!(greeter.group, "g");
        assert!(greeter.serialization.is_empty());
    }

    #[test]
    fn test_null_fields_parse_as_empty() {
        let parsed: HashMap<String, ProviderInterface> = serde_json::from_str(
            r#"{"k":{"interface":"com.example.Greeter","group":null,
                "serialization":null,"version":"1.0.0"}}"#,
        )
        .unwrap();
        let exporter = RpcInfoExporter::new(&ExporterConfig::default()).unwrap();

        let dto = exporter.to_dto(parsed);
        assert_eq!(
            dto.providers,
            vec![ProviderInterface {
                interface_name: "com.example.Greeter".to_string(),
                group: String::new(),
                serialization: "hessian2".to_string(),
                version: "1.0.0".to_string(),
            }]
        );
    }
}
