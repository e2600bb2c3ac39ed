//! Single-attempt action forwarding.
//!
//! `ChannelForwarder` resolves the current channel handle for its
//! device key, encodes the action payload, and makes exactly one
//! delivery attempt. Failures are classified so the dispatcher can
//! pattern-match the kind without seeing transport internals.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::channel_registry::ChannelRegistry;
use crate::device_action::DeviceAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `ForwardErrorKind` values.
pub enum ForwardErrorKind {
    /// The registry itself could not be read.
    RegistryUnavailable,
    /// The registry has no channel handle for the device key.
    HandleMissing,
    /// The push delivery call failed (stale handle, transport fault).
    DeliveryFailed,
}

impl ForwardErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RegistryUnavailable => "registry_unavailable",
            Self::HandleMissing => "handle_missing",
            Self::DeliveryFailed => "delivery_failed",
        }
    }
}

#[derive(Debug, Error)]
#[error("forward failed: kind={} detail={detail}", .kind.as_str())]
/// Classified forwarding failure surfaced to the dispatcher.
pub struct ForwardError {
    pub kind: ForwardErrorKind,
    pub detail: String,
}

impl ForwardError {
    fn new(kind: ForwardErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

#[async_trait]
/// Push-delivery seam: deliver encoded bytes to a channel handle.
pub trait PushDelivery: std::fmt::Debug + Send + Sync {
    async fn send(&self, connection_handle: &str, payload: &[u8]) -> Result<()>;
}

#[async_trait]
/// Dispatcher-facing forwarding seam, substitutable with test doubles.
pub trait ActionForwarder: Send + Sync {
    async fn forward(&self, action: &DeviceAction) -> Result<(), ForwardError>;
}

/// Resolves the channel handle for one device key and pushes action
/// payloads through the injected delivery client.
pub struct ChannelForwarder {
    registry: Arc<dyn ChannelRegistry>,
    delivery: Arc<dyn PushDelivery>,
    device_key: String,
}

impl ChannelForwarder {
    pub fn new(
        registry: Arc<dyn ChannelRegistry>,
        delivery: Arc<dyn PushDelivery>,
        device_key: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            delivery,
            device_key: device_key.into(),
        }
    }

    pub fn device_key(&self) -> &str {
        &self.device_key
    }
}

#[async_trait]
impl ActionForwarder for ChannelForwarder {
    async fn forward(&self, action: &DeviceAction) -> Result<(), ForwardError> {
        let record = self
            .registry
            .resolve(&self.device_key)
            .await
            .map_err(|error| {
                ForwardError::new(ForwardErrorKind::RegistryUnavailable, format!("{error:#}"))
            })?;
        let Some(record) = record else {
            return Err(ForwardError::new(
                ForwardErrorKind::HandleMissing,
                format!("no channel handle registered for '{}'", self.device_key),
            ));
        };

        let payload = serde_json::to_vec(action).map_err(|error| {
            ForwardError::new(ForwardErrorKind::DeliveryFailed, error.to_string())
        })?;
        tracing::debug!(
            device_key = %self.device_key,
            connection_handle = %record.connection_handle,
            action = action.as_str(),
            payload = %String::from_utf8_lossy(&payload),
            "forwarding device action"
        );

        self.delivery
            .send(&record.connection_handle, &payload)
            .await
            .map_err(|error| {
                ForwardError::new(ForwardErrorKind::DeliveryFailed, format!("{error:#}"))
            })
    }
}
