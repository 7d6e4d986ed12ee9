//! Collaborators
//!
//! Interfaces of the services hosted fields depends on but does not
//! implement: the gateway client, deferred client creation, and
//! analytics.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Gateway configuration as exposed by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub analytics_metadata: AnalyticsMetadata,
    pub gateway_configuration: GatewayConfiguration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsMetadata {
    pub sdk_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfiguration {
    pub assets_url: String,
}

/// Gateway client. Read-only from the component's perspective.
pub trait Client {
    fn get_configuration(&self) -> Configuration;
}

/// Creates a client from an authorization (tokenization key or client
/// token) when the merchant did not pass one
pub trait ClientFactory {
    fn create(&self, authorization: &str) -> Result<Rc<dyn Client>, Box<dyn std::error::Error>>;
}

/// Where the component gets its client from
#[derive(Clone)]
pub enum ClientSource {
    Client(Rc<dyn Client>),
    Authorization(String),
}

impl std::fmt::Debug for ClientSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientSource::Client(_) => f.write_str("ClientSource::Client"),
            ClientSource::Authorization(_) => f.write_str("ClientSource::Authorization(..)"),
        }
    }
}

/// Analytics sink
pub trait Analytics {
    fn send_event(&self, client: &dyn Client, event: &str);
}

/// Reports analytics events as `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

impl Analytics for TracingAnalytics {
    fn send_event(&self, client: &dyn Client, event: &str) {
        let configuration = client.get_configuration();
        tracing::info!(
            target: "hf_fields::analytics",
            sdk_version = %configuration.analytics_metadata.sdk_version,
            "{}",
            event
        );
    }
}

/// Client with a fixed configuration
#[derive(Debug, Clone)]
pub struct StaticClient {
    configuration: Configuration,
}

impl StaticClient {
    /// Client for this SDK version serving frames from `assets_url`
    pub fn new(assets_url: &str) -> Self {
        Self::with_version(assets_url, crate::VERSION)
    }

    pub fn with_version(assets_url: &str, sdk_version: &str) -> Self {
        Self {
            configuration: Configuration {
                analytics_metadata: AnalyticsMetadata {
                    sdk_version: sdk_version.to_string(),
                    session_id: None,
                },
                gateway_configuration: GatewayConfiguration {
                    assets_url: assets_url.to_string(),
                },
            },
        }
    }
}

impl Client for StaticClient {
    fn get_configuration(&self) -> Configuration {
        self.configuration.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_configuration_wire_names() {
        let configuration: Configuration = serde_json::from_value(json!({
            "analyticsMetadata": { "sdkVersion": "0.1.0", "sessionId": "s" },
            "gatewayConfiguration": { "assetsUrl": "https://assets.example.com" }
        }))
        .unwrap();

        assert_eq!(configuration.analytics_metadata.sdk_version, "0.1.0");
        assert_eq!(configuration.gateway_configuration.assets_url, "https://assets.example.com");
    }

    #[test]
    fn test_static_client_uses_crate_version() {
        let client = StaticClient::new("https://assets.example.com");
        assert_eq!(client.get_configuration().analytics_metadata.sdk_version, crate::VERSION);
    }
}
