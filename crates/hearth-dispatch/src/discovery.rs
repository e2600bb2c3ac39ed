//! Static discovery manifest.
//!
//! The capability set is fixed at configuration time; nothing here
//! consults runtime device state. Keep the manifest in sync with the
//! actions the device controller actually implements.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::alexa_response::{AlexaResponse, ResponseEnvelope};
use crate::directive_envelope::{
    NAMESPACE_DISCOVERY, NAMESPACE_PLAYBACK_CONTROLLER, NAMESPACE_POWER_CONTROLLER,
    NAMESPACE_STEP_SPEAKER,
};

const CAPABILITY_TYPE: &str = "AlexaInterface";
const CAPABILITY_VERSION: &str = "3";

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Endpoint descriptor reported by discovery.
pub struct DiscoveryConfig {
    pub endpoint_id: String,
    pub friendly_name: String,
    pub manufacturer_name: String,
    pub description: String,
    pub display_categories: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            endpoint_id: "ps3-tv".to_string(),
            friendly_name: "TV".to_string(),
            manufacturer_name: "Sony".to_string(),
            description: "PlayStation 3 TV connected with Raspberry Pi".to_string(),
            display_categories: vec!["TV".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// One advertised interface capability.
pub struct EndpointCapability {
    #[serde(rename = "type")]
    pub capability_type: String,
    pub interface: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<CapabilityProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_operations: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Declared state properties for a capability.
pub struct CapabilityProperties {
    pub supported: Vec<SupportedProperty>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupportedProperty {
    pub name: String,
}

fn capability(interface: &str) -> EndpointCapability {
    EndpointCapability {
        capability_type: CAPABILITY_TYPE.to_string(),
        interface: interface.to_string(),
        version: CAPABILITY_VERSION.to_string(),
        properties: None,
        supported_operations: None,
    }
}

fn capability_with_properties(interface: &str, supported: &[&str]) -> EndpointCapability {
    EndpointCapability {
        properties: Some(CapabilityProperties {
            supported: supported
                .iter()
                .map(|name| SupportedProperty {
                    name: (*name).to_string(),
                })
                .collect(),
        }),
        ..capability(interface)
    }
}

fn capability_with_operations(interface: &str, operations: &[&str]) -> EndpointCapability {
    EndpointCapability {
        supported_operations: Some(operations.iter().map(|op| (*op).to_string()).collect()),
        ..capability(interface)
    }
}

/// Builds the `Discover.Response` envelope for the single configured
/// endpoint.
pub fn build_discovery_response(config: &DiscoveryConfig) -> ResponseEnvelope {
    let capabilities = vec![
        capability("Alexa"),
        capability_with_properties(NAMESPACE_POWER_CONTROLLER, &["powerState"]),
        capability(NAMESPACE_STEP_SPEAKER),
        capability_with_operations(NAMESPACE_PLAYBACK_CONTROLLER, &["Play", "Pause", "Stop"]),
    ];
    let endpoint = json!({
        "endpointId": config.endpoint_id,
        "friendlyName": config.friendly_name,
        "manufacturerName": config.manufacturer_name,
        "description": config.description,
        "displayCategories": config.display_categories,
        "capabilities": capabilities,
    });
    AlexaResponse::new()
        .namespace(NAMESPACE_DISCOVERY)
        .name("Discover.Response")
        .payload(json!({ "endpoints": [endpoint] }))
        .build()
}
