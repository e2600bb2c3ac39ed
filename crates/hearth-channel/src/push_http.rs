//! Push delivery clients.
//!
//! `HttpPushDelivery` posts encoded payloads to the connection
//! management endpoint of the push gateway; a stale handle shows up as
//! an HTTP 410 and is reported like any other delivery failure.
//! `DryRunPushDelivery` logs and succeeds without touching the network.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use crate::channel_forward::PushDelivery;

const DEFAULT_PUSH_HTTP_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone)]
/// Configuration for the HTTP push delivery client.
pub struct PushDeliveryConfig {
    pub api_base: String,
    pub http_timeout_ms: u64,
}

impl Default for PushDeliveryConfig {
    fn default() -> Self {
        Self {
            api_base: "https://push.gateway.invalid".to_string(),
            http_timeout_ms: DEFAULT_PUSH_HTTP_TIMEOUT_MS,
        }
    }
}

/// Delivers payloads with a single bounded-timeout POST per send.
#[derive(Debug)]
pub struct HttpPushDelivery {
    client: reqwest::Client,
    api_base: String,
}

impl HttpPushDelivery {
    pub fn new(config: PushDeliveryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms.max(1)))
            .build()
            .context("failed to build push delivery http client")?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn connection_endpoint(&self, connection_handle: &str) -> String {
        format!("{}/connections/{}", self.api_base, connection_handle)
    }
}

#[async_trait]
impl PushDelivery for HttpPushDelivery {
    async fn send(&self, connection_handle: &str, payload: &[u8]) -> Result<()> {
        let endpoint = self.connection_endpoint(connection_handle);
        let response = self
            .client
            .post(&endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload.to_vec())
            .send()
            .await
            .with_context(|| format!("push delivery request to {endpoint} failed"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("push delivery to {endpoint} returned status {status}");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op delivery used for local verification of the dispatch path.
pub struct DryRunPushDelivery;

#[async_trait]
impl PushDelivery for DryRunPushDelivery {
    async fn send(&self, connection_handle: &str, payload: &[u8]) -> Result<()> {
        tracing::info!(
            connection_handle = %connection_handle,
            payload = %String::from_utf8_lossy(payload),
            "dry-run push delivery"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_connection_endpoint_joins_base_and_handle() {
        let delivery = HttpPushDelivery::new(PushDeliveryConfig {
            api_base: "https://push.example.com/prod/".to_string(),
            http_timeout_ms: 100,
        })
        .expect("client");
        assert_eq!(
            delivery.connection_endpoint("conn-abc123"),
            "https://push.example.com/prod/connections/conn-abc123"
        );
    }

    #[tokio::test]
    async fn unit_dry_run_delivery_always_succeeds() {
        let delivery = DryRunPushDelivery;
        delivery
            .send("conn-abc123", br#"{"action":"toggle_power","state":"ON"}"#)
            .await
            .expect("dry-run send");
    }

    #[tokio::test]
    async fn regression_http_delivery_fails_fast_on_unreachable_gateway() {
        let delivery = HttpPushDelivery::new(PushDeliveryConfig {
            // Reserved TEST-NET-1 address, nothing listens there.
            api_base: "http://192.0.2.1:9".to_string(),
            http_timeout_ms: 200,
        })
        .expect("client");
        let error = delivery
            .send("conn-abc123", b"{}")
            .await
            .expect_err("unreachable gateway should fail");
        assert!(format!("{error:#}").contains("push delivery request"));
    }
}
