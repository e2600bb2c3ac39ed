//! Directive dispatcher.
//!
//! `handle` is the system boundary: it takes the raw request value and
//! always returns a well-formed envelope. Transport and lookup faults
//! are logged with detail and collapsed to `ENDPOINT_UNREACHABLE`; the
//! cause never crosses the trust boundary.

use std::sync::Arc;

use serde_json::{json, Value};

use hearth_channel::{ActionForwarder, DeviceAction, ForwardError};

use crate::alexa_response::{error_response, AlexaResponse, ErrorType, ResponseEnvelope};
use crate::directive_envelope::{
    classify_directive, Directive, DirectiveKind, DirectiveRequest, NAMESPACE_AUTHORIZATION,
    NAMESPACE_PLAYBACK_CONTROLLER, NAMESPACE_POWER_CONTROLLER, NAMESPACE_STEP_SPEAKER,
    SUPPORTED_PAYLOAD_VERSION,
};
use crate::discovery::{build_discovery_response, DiscoveryConfig};

const MESSAGE_MISSING_DIRECTIVE: &str =
    "Missing key: directive, Is the request a valid Alexa Directive?";
const MESSAGE_UNSUPPORTED_VERSION: &str =
    "This skill only supports Smart Home API version 3";
const MESSAGE_ENDPOINT_ERROR: &str = "There was an error with the endpoint.";
const MESSAGE_ENDPOINT_UNREACHABLE: &str = "Unable to reach endpoint.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Grant-handling policy. The reference behavior accepts any grant
/// without validating or persisting it; `Reject` lets a deployment
/// refuse grants until a real token exchange is wired in.
pub enum GrantPolicy {
    #[default]
    AcceptAll,
    Reject,
}

#[derive(Debug, Clone, Default)]
/// Dispatcher configuration: discovery manifest plus grant policy.
pub struct DispatcherConfig {
    pub discovery: DiscoveryConfig,
    pub grant_policy: GrantPolicy,
}

/// Routes validated directives to device actions and builds the
/// response envelope. The forwarder is injected so tests substitute
/// doubles at the seam.
pub struct DirectiveDispatcher {
    forwarder: Arc<dyn ActionForwarder>,
    config: DispatcherConfig,
}

impl DirectiveDispatcher {
    pub fn new(forwarder: Arc<dyn ActionForwarder>, config: DispatcherConfig) -> Self {
        Self { forwarder, config }
    }

    /// Handles one inbound request. Never returns an Err and never
    /// panics; every failure path resolves to an error envelope.
    pub async fn handle(&self, request: &Value) -> ResponseEnvelope {
        let envelope: DirectiveRequest = match serde_json::from_value(request.clone()) {
            Ok(envelope) => envelope,
            Err(error) => {
                tracing::warn!(error = %error, "directive envelope failed to deserialize");
                return error_response(ErrorType::InvalidDirective, MESSAGE_MISSING_DIRECTIVE);
            }
        };
        let Some(directive) = envelope.directive else {
            return error_response(ErrorType::InvalidDirective, MESSAGE_MISSING_DIRECTIVE);
        };

        if directive.header.payload_version != SUPPORTED_PAYLOAD_VERSION {
            return error_response(ErrorType::InternalError, MESSAGE_UNSUPPORTED_VERSION);
        }

        match classify_directive(&directive) {
            DirectiveKind::AcceptGrant {
                grant_code,
                grantee_token,
            } => self.handle_accept_grant(grant_code, grantee_token),
            DirectiveKind::Discover => build_discovery_response(&self.config.discovery),
            DirectiveKind::Power(state) => {
                self.handle_device_action(
                    &directive,
                    DeviceAction::TogglePower { state },
                    NAMESPACE_POWER_CONTROLLER,
                    "powerState",
                    json!(state.as_str()),
                )
                .await
            }
            DirectiveKind::AdjustVolume { volume_steps } => {
                self.handle_device_action(
                    &directive,
                    DeviceAction::VolumeStep { volume_steps },
                    NAMESPACE_STEP_SPEAKER,
                    "volumeSteps",
                    json!(volume_steps),
                )
                .await
            }
            DirectiveKind::Playback(playback_action) => {
                self.handle_device_action(
                    &directive,
                    DeviceAction::PlaybackController { playback_action },
                    NAMESPACE_PLAYBACK_CONTROLLER,
                    "action",
                    json!(playback_action.as_str()),
                )
                .await
            }
            DirectiveKind::UnsupportedName { namespace, name } => {
                tracing::warn!(namespace = %namespace, name = %name, "unsupported directive name");
                error_response(ErrorType::InternalError, MESSAGE_ENDPOINT_ERROR)
            }
            DirectiveKind::MalformedPayload {
                namespace,
                name,
                detail,
            } => {
                tracing::warn!(
                    namespace = %namespace,
                    name = %name,
                    detail = %detail,
                    "malformed directive payload"
                );
                error_response(ErrorType::InternalError, MESSAGE_ENDPOINT_ERROR)
            }
            DirectiveKind::UnrecognizedNamespace { namespace, name } => {
                tracing::warn!(namespace = %namespace, name = %name, "unrecognized namespace");
                error_response(
                    ErrorType::InvalidDirective,
                    format!("Unsupported directive namespace '{namespace}'"),
                )
            }
        }
    }

    fn handle_accept_grant(
        &self,
        grant_code: Option<String>,
        grantee_token: Option<String>,
    ) -> ResponseEnvelope {
        // The grant is read for diagnostics but never validated or
        // persisted; token exchange belongs to the external account
        // linking flow.
        tracing::debug!(
            grant_code_present = grant_code.is_some(),
            grantee_token_present = grantee_token.is_some(),
            "accept-grant directive"
        );
        match self.config.grant_policy {
            GrantPolicy::AcceptAll => AlexaResponse::new()
                .namespace(NAMESPACE_AUTHORIZATION)
                .name("AcceptGrant.Response")
                .build(),
            GrantPolicy::Reject => error_response(
                ErrorType::InvalidDirective,
                "AcceptGrant rejected by grant policy",
            ),
        }
    }

    async fn handle_device_action(
        &self,
        directive: &Directive,
        action: DeviceAction,
        context_namespace: &str,
        context_name: &str,
        context_value: Value,
    ) -> ResponseEnvelope {
        if let Err(error) = self.forwarder.forward(&action).await {
            return self.unreachable_endpoint(&error);
        }
        AlexaResponse::new()
            .correlation_token(directive.header.correlation_token.clone())
            .endpoint_id(
                directive
                    .endpoint
                    .as_ref()
                    .map(|endpoint| endpoint.endpoint_id.clone()),
            )
            .add_context_property(context_namespace, context_name, context_value)
            .build()
    }

    fn unreachable_endpoint(&self, error: &ForwardError) -> ResponseEnvelope {
        tracing::warn!(
            kind = error.kind.as_str(),
            detail = %error.detail,
            "forwarding failed, answering ENDPOINT_UNREACHABLE"
        );
        error_response(ErrorType::EndpointUnreachable, MESSAGE_ENDPOINT_UNREACHABLE)
    }
}
