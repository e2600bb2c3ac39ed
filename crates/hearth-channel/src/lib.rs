//! Channel resolution and push forwarding for the hearth device bridge.
//!
//! Resolves the live push-channel handle for a device from an external
//! registry and delivers encoded device actions through a push-delivery
//! client. All state lives in the registry; each forwarding call is a
//! single resolve-then-send attempt with no retry or queueing.

pub mod channel_forward;
pub mod channel_registry;
pub mod device_action;
pub mod push_http;

pub use channel_forward::{ActionForwarder, ChannelForwarder, ForwardError, ForwardErrorKind, PushDelivery};
pub use channel_registry::{ChannelRecord, ChannelRegistry, FileChannelRegistry};
pub use device_action::{DeviceAction, PlaybackAction, PowerState};
pub use push_http::{DryRunPushDelivery, HttpPushDelivery, PushDeliveryConfig};
