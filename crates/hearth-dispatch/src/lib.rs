//! Smart Home directive dispatch for the hearth device bridge.
//!
//! Validates inbound Alexa Smart Home v3 directive envelopes, classifies
//! them by namespace and name, forwards device actions through the
//! channel forwarder seam, and builds success or error response
//! envelopes. Every failure path resolves locally into a well-formed
//! error envelope; nothing propagates as a fault to the caller.

pub mod alexa_response;
pub mod directive_dispatch;
pub mod directive_envelope;
pub mod discovery;

pub use alexa_response::{AlexaResponse, ErrorType, ResponseEnvelope};
pub use directive_dispatch::{DirectiveDispatcher, DispatcherConfig, GrantPolicy};
pub use directive_envelope::{classify_directive, Directive, DirectiveKind, DirectiveRequest};
pub use discovery::{build_discovery_response, DiscoveryConfig};
