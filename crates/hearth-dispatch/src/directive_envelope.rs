//! Inbound directive envelope model and classification.
//!
//! Envelope structs mirror the Smart Home v3 wire shape (camelCase
//! field names). Classification turns the two-level string key
//! (namespace, name) into an exhaustive sum type so the dispatcher
//! cannot leave an unrecognized directive without a response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use hearth_channel::{PlaybackAction, PowerState};

pub const SUPPORTED_PAYLOAD_VERSION: &str = "3";

pub const NAMESPACE_AUTHORIZATION: &str = "Alexa.Authorization";
pub const NAMESPACE_DISCOVERY: &str = "Alexa.Discovery";
pub const NAMESPACE_POWER_CONTROLLER: &str = "Alexa.PowerController";
pub const NAMESPACE_STEP_SPEAKER: &str = "Alexa.StepSpeaker";
pub const NAMESPACE_PLAYBACK_CONTROLLER: &str = "Alexa.PlaybackController";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Top-level request wrapper; a valid request carries `directive`.
pub struct DirectiveRequest {
    pub directive: Option<Directive>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One inbound Smart Home directive.
pub struct Directive {
    pub header: DirectiveHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<DirectiveEndpoint>,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Directive header: the routing key plus protocol metadata.
pub struct DirectiveHeader {
    pub namespace: String,
    pub name: String,
    pub payload_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Target device reference carried by device-facing directives.
pub struct DirectiveEndpoint {
    pub endpoint_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
/// Classified directive, one variant per dispatchable operation.
pub enum DirectiveKind {
    AcceptGrant {
        grant_code: Option<String>,
        grantee_token: Option<String>,
    },
    Discover,
    Power(PowerState),
    AdjustVolume {
        volume_steps: i64,
    },
    Playback(PlaybackAction),
    /// Recognized namespace, name outside its accepted set.
    UnsupportedName {
        namespace: String,
        name: String,
    },
    /// Recognized namespace and name, payload missing a required field.
    MalformedPayload {
        namespace: String,
        name: String,
        detail: String,
    },
    /// Namespace outside the capability set entirely.
    UnrecognizedNamespace {
        namespace: String,
        name: String,
    },
}

/// Maps (namespace, name) onto the accepted operation set. The match
/// is mutually exclusive; the protocol never places one request in
/// two namespaces.
pub fn classify_directive(directive: &Directive) -> DirectiveKind {
    let namespace = directive.header.namespace.as_str();
    let name = directive.header.name.as_str();
    match namespace {
        NAMESPACE_AUTHORIZATION => match name {
            "AcceptGrant" => DirectiveKind::AcceptGrant {
                grant_code: payload_string(&directive.payload, &["grant", "code"]),
                grantee_token: payload_string(&directive.payload, &["grantee", "token"]),
            },
            _ => unsupported(namespace, name),
        },
        NAMESPACE_DISCOVERY => match name {
            "Discover" => DirectiveKind::Discover,
            _ => unsupported(namespace, name),
        },
        NAMESPACE_POWER_CONTROLLER => match name {
            "TurnOn" => DirectiveKind::Power(PowerState::On),
            "TurnOff" => DirectiveKind::Power(PowerState::Off),
            _ => unsupported(namespace, name),
        },
        NAMESPACE_STEP_SPEAKER => match name {
            "AdjustVolume" => match directive.payload.get("volumeSteps").and_then(Value::as_i64) {
                Some(volume_steps) => DirectiveKind::AdjustVolume { volume_steps },
                None => DirectiveKind::MalformedPayload {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                    detail: "payload is missing integer field 'volumeSteps'".to_string(),
                },
            },
            _ => unsupported(namespace, name),
        },
        NAMESPACE_PLAYBACK_CONTROLLER => match name {
            "Play" => DirectiveKind::Playback(PlaybackAction::Play),
            "Pause" => DirectiveKind::Playback(PlaybackAction::Pause),
            "Stop" => DirectiveKind::Playback(PlaybackAction::Stop),
            _ => unsupported(namespace, name),
        },
        _ => DirectiveKind::UnrecognizedNamespace {
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
    }
}

fn unsupported(namespace: &str, name: &str) -> DirectiveKind {
    DirectiveKind::UnsupportedName {
        namespace: namespace.to_string(),
        name: name.to_string(),
    }
}

fn payload_string(payload: &Value, path: &[&str]) -> Option<String> {
    let mut current = payload;
    for key in path {
        current = current.get(key)?;
    }
    current.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn directive(namespace: &str, name: &str, payload: Value) -> Directive {
        Directive {
            header: DirectiveHeader {
                namespace: namespace.to_string(),
                name: name.to_string(),
                payload_version: SUPPORTED_PAYLOAD_VERSION.to_string(),
                correlation_token: None,
                message_id: None,
            },
            endpoint: None,
            payload,
        }
    }

    #[test]
    fn unit_classify_accept_grant_extracts_grant_fields() {
        let kind = classify_directive(&directive(
            NAMESPACE_AUTHORIZATION,
            "AcceptGrant",
            json!({"grant": {"code": "auth-code"}, "grantee": {"token": "tok"}}),
        ));
        assert_eq!(
            kind,
            DirectiveKind::AcceptGrant {
                grant_code: Some("auth-code".to_string()),
                grantee_token: Some("tok".to_string()),
            }
        );
    }

    #[test]
    fn unit_classify_accept_grant_tolerates_missing_grant_fields() {
        let kind = classify_directive(&directive(NAMESPACE_AUTHORIZATION, "AcceptGrant", json!({})));
        assert_eq!(
            kind,
            DirectiveKind::AcceptGrant {
                grant_code: None,
                grantee_token: None,
            }
        );
    }

    #[test]
    fn unit_classify_power_names_map_to_explicit_states() {
        assert_eq!(
            classify_directive(&directive(NAMESPACE_POWER_CONTROLLER, "TurnOn", json!({}))),
            DirectiveKind::Power(PowerState::On)
        );
        assert_eq!(
            classify_directive(&directive(NAMESPACE_POWER_CONTROLLER, "TurnOff", json!({}))),
            DirectiveKind::Power(PowerState::Off)
        );
    }

    #[test]
    fn regression_classify_unknown_power_name_is_not_silently_on() {
        let kind = classify_directive(&directive(NAMESPACE_POWER_CONTROLLER, "Toggle", json!({})));
        assert_eq!(
            kind,
            DirectiveKind::UnsupportedName {
                namespace: NAMESPACE_POWER_CONTROLLER.to_string(),
                name: "Toggle".to_string(),
            }
        );
    }

    #[test]
    fn unit_classify_adjust_volume_preserves_signed_steps() {
        let kind = classify_directive(&directive(
            NAMESPACE_STEP_SPEAKER,
            "AdjustVolume",
            json!({"volumeSteps": -5}),
        ));
        assert_eq!(kind, DirectiveKind::AdjustVolume { volume_steps: -5 });
    }

    #[test]
    fn unit_classify_adjust_volume_without_steps_is_malformed() {
        let kind = classify_directive(&directive(NAMESPACE_STEP_SPEAKER, "AdjustVolume", json!({})));
        assert!(matches!(kind, DirectiveKind::MalformedPayload { .. }));
    }

    #[test]
    fn unit_classify_step_speaker_set_mute_is_unsupported() {
        let kind = classify_directive(&directive(NAMESPACE_STEP_SPEAKER, "SetMute", json!({})));
        assert_eq!(
            kind,
            DirectiveKind::UnsupportedName {
                namespace: NAMESPACE_STEP_SPEAKER.to_string(),
                name: "SetMute".to_string(),
            }
        );
    }

    #[test]
    fn unit_classify_playback_names() {
        assert_eq!(
            classify_directive(&directive(NAMESPACE_PLAYBACK_CONTROLLER, "Play", json!({}))),
            DirectiveKind::Playback(PlaybackAction::Play)
        );
        assert_eq!(
            classify_directive(&directive(NAMESPACE_PLAYBACK_CONTROLLER, "Rewind", json!({}))),
            DirectiveKind::UnsupportedName {
                namespace: NAMESPACE_PLAYBACK_CONTROLLER.to_string(),
                name: "Rewind".to_string(),
            }
        );
    }

    #[test]
    fn unit_classify_unknown_namespace_is_explicit() {
        let kind = classify_directive(&directive("Alexa.ThermostatController", "SetTargetTemperature", json!({})));
        assert_eq!(
            kind,
            DirectiveKind::UnrecognizedNamespace {
                namespace: "Alexa.ThermostatController".to_string(),
                name: "SetTargetTemperature".to_string(),
            }
        );
    }

    #[test]
    fn functional_directive_deserializes_from_wire_shape() {
        let raw = json!({
            "header": {
                "namespace": "Alexa.StepSpeaker",
                "name": "AdjustVolume",
                "payloadVersion": "3",
                "correlationToken": "corr-1",
                "messageId": "msg-1"
            },
            "endpoint": {"endpointId": "ps3-tv"},
            "payload": {"volumeSteps": 2}
        });
        let directive: Directive = serde_json::from_value(raw).expect("deserialize");
        assert_eq!(directive.header.payload_version, "3");
        assert_eq!(
            directive.header.correlation_token.as_deref(),
            Some("corr-1")
        );
        assert_eq!(
            directive.endpoint.as_ref().map(|e| e.endpoint_id.as_str()),
            Some("ps3-tv")
        );
    }
}
