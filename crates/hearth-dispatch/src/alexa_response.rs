//! Response envelope construction.
//!
//! Builds the `{context, event}` response shape the Smart Home caller
//! expects. Context properties are additive and keep insertion order.
//! Error payloads draw from the fixed `{type, message}` vocabulary.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::directive_envelope::SUPPORTED_PAYLOAD_VERSION;

const CONTEXT_UNCERTAINTY_MS: u64 = 200;

static MESSAGE_ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `ErrorType` values.
pub enum ErrorType {
    InvalidDirective,
    InternalError,
    EndpointUnreachable,
}

impl ErrorType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidDirective => "INVALID_DIRECTIVE",
            Self::InternalError => "INTERNAL_ERROR",
            Self::EndpointUnreachable => "ENDPOINT_UNREACHABLE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Complete response envelope returned to the caller.
pub struct ResponseEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ResponseContext>,
    pub event: ResponseEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Ordered property reports attached to a success response.
pub struct ResponseContext {
    pub properties: Vec<ContextProperty>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// One reported current-state value.
pub struct ContextProperty {
    pub namespace: String,
    pub name: String,
    pub value: Value,
    pub time_of_sample: String,
    pub uncertainty_in_milliseconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Event section: header, optional endpoint echo, payload.
pub struct ResponseEvent {
    pub header: ResponseHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<ResponseEndpoint>,
    pub payload: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Response header with a freshly generated message id.
pub struct ResponseHeader {
    pub namespace: String,
    pub name: String,
    pub message_id: String,
    pub payload_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Endpoint reference echoed back on device-facing responses.
pub struct ResponseEndpoint {
    pub endpoint_id: String,
}

#[derive(Debug, Clone)]
/// Builder for response envelopes. Defaults match the protocol's
/// generic success header (`Alexa` / `Response`).
pub struct AlexaResponse {
    namespace: String,
    name: String,
    correlation_token: Option<String>,
    endpoint_id: Option<String>,
    payload: Value,
    properties: Vec<ContextProperty>,
}

impl Default for AlexaResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl AlexaResponse {
    pub fn new() -> Self {
        Self {
            namespace: "Alexa".to_string(),
            name: "Response".to_string(),
            correlation_token: None,
            endpoint_id: None,
            payload: json!({}),
            properties: Vec::new(),
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn correlation_token(mut self, token: Option<String>) -> Self {
        self.correlation_token = token;
        self
    }

    pub fn endpoint_id(mut self, endpoint_id: Option<String>) -> Self {
        self.endpoint_id = endpoint_id;
        self
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Appends one property report; repeated calls accumulate in order.
    pub fn add_context_property(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: Value,
    ) -> Self {
        self.properties.push(ContextProperty {
            namespace: namespace.into(),
            name: name.into(),
            value,
            time_of_sample: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            uncertainty_in_milliseconds: CONTEXT_UNCERTAINTY_MS,
        });
        self
    }

    pub fn build(self) -> ResponseEnvelope {
        ResponseEnvelope {
            context: if self.properties.is_empty() {
                None
            } else {
                Some(ResponseContext {
                    properties: self.properties,
                })
            },
            event: ResponseEvent {
                header: ResponseHeader {
                    namespace: self.namespace,
                    name: self.name,
                    message_id: next_message_id(),
                    payload_version: SUPPORTED_PAYLOAD_VERSION.to_string(),
                    correlation_token: self.correlation_token,
                },
                endpoint: self
                    .endpoint_id
                    .map(|endpoint_id| ResponseEndpoint { endpoint_id }),
                payload: self.payload,
            },
        }
    }
}

/// Bare error envelope: `Alexa`/`ErrorResponse` with `{type, message}`.
pub fn error_response(error_type: ErrorType, message: impl Into<String>) -> ResponseEnvelope {
    AlexaResponse::new()
        .name("ErrorResponse")
        .payload(json!({
            "type": error_type.as_str(),
            "message": message.into(),
        }))
        .build()
}

fn next_message_id() -> String {
    let unix_ms = Utc::now().timestamp_millis().max(0) as u64;
    let sequence = MESSAGE_ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("msg-{unix_ms:x}-{sequence:04x}")
}
