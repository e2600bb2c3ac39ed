//! Local invocation harness for the hearth directive bridge.
//!
//! Reads one directive envelope from a file or stdin, wires the
//! file-backed channel registry and the selected push delivery client
//! into the dispatcher, and prints the response envelope as JSON.
//! Protocol failures are payload, not process failures: the exit code
//! is zero whenever a well-formed envelope was produced.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::io::AsyncReadExt;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use hearth_channel::{
    ActionForwarder, ChannelForwarder, DryRunPushDelivery, FileChannelRegistry, HttpPushDelivery,
    PushDelivery, PushDeliveryConfig,
};
use hearth_dispatch::{DirectiveDispatcher, DispatcherConfig, DiscoveryConfig, GrantPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PushMode {
    DryRun,
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GrantPolicyArg {
    AcceptAll,
    Reject,
}

impl From<GrantPolicyArg> for GrantPolicy {
    fn from(value: GrantPolicyArg) -> Self {
        match value {
            GrantPolicyArg::AcceptAll => GrantPolicy::AcceptAll,
            GrantPolicyArg::Reject => GrantPolicy::Reject,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "hearth", about = "Dispatch one Smart Home directive envelope")]
struct Cli {
    /// Directive envelope JSON; reads stdin when omitted.
    #[arg(long)]
    directive_file: Option<PathBuf>,

    /// Channel registry file written by the connection lifecycle process.
    #[arg(long, env = "HEARTH_REGISTRY_FILE", default_value = "channel-registry.json")]
    registry_file: PathBuf,

    /// Device key resolved against the registry.
    #[arg(long, env = "HEARTH_DEVICE_KEY", default_value = "living-room-tv")]
    device_key: String,

    /// Push delivery mode.
    #[arg(long, value_enum, default_value_t = PushMode::DryRun)]
    push_mode: PushMode,

    /// Push gateway base URL (http mode).
    #[arg(long, env = "HEARTH_PUSH_API_BASE")]
    push_api_base: Option<String>,

    /// Push request timeout in milliseconds (http mode).
    #[arg(long, default_value_t = 5_000)]
    push_timeout_ms: u64,

    /// AcceptGrant handling policy.
    #[arg(long, value_enum, default_value_t = GrantPolicyArg::AcceptAll)]
    grant_policy: GrantPolicyArg,
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn build_push_delivery(cli: &Cli) -> Result<Arc<dyn PushDelivery>> {
    match cli.push_mode {
        PushMode::DryRun => Ok(Arc::new(DryRunPushDelivery)),
        PushMode::Http => {
            let api_base = cli
                .push_api_base
                .clone()
                .context("--push-api-base is required when --push-mode is http")?;
            let delivery = HttpPushDelivery::new(PushDeliveryConfig {
                api_base,
                http_timeout_ms: cli.push_timeout_ms,
            })?;
            Ok(Arc::new(delivery))
        }
    }
}

async fn read_directive(cli: &Cli) -> Result<serde_json::Value> {
    let raw = match &cli.directive_file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read directive file {}", path.display()))?,
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("failed to read directive from stdin")?;
            raw
        }
    };
    serde_json::from_str(&raw).context("directive input is not valid JSON")
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let request = read_directive(&cli).await?;
    let registry = Arc::new(FileChannelRegistry::new(&cli.registry_file));
    let delivery = build_push_delivery(&cli)?;
    let forwarder: Arc<dyn ActionForwarder> = Arc::new(ChannelForwarder::new(
        registry,
        delivery,
        cli.device_key.clone(),
    ));
    let dispatcher = DirectiveDispatcher::new(
        forwarder,
        DispatcherConfig {
            discovery: DiscoveryConfig::default(),
            grant_policy: cli.grant_policy.into(),
        },
    );

    let response = dispatcher.handle(&request).await;
    let rendered =
        serde_json::to_string_pretty(&response).context("failed to serialize response envelope")?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn unit_cli_defaults_to_dry_run_and_fixed_device_key() {
        let cli = Cli::parse_from(["hearth"]);
        assert_eq!(cli.push_mode, PushMode::DryRun);
        assert_eq!(cli.device_key, "living-room-tv");
        assert_eq!(cli.grant_policy, GrantPolicyArg::AcceptAll);
    }

    #[test]
    fn unit_http_mode_requires_api_base() {
        let cli = Cli::parse_from(["hearth", "--push-mode", "http"]);
        let error = build_push_delivery(&cli).expect_err("missing api base should fail");
        assert!(error.to_string().contains("--push-api-base"));
    }

    #[test]
    fn unit_http_mode_builds_delivery_with_api_base() {
        let cli = Cli::parse_from([
            "hearth",
            "--push-mode",
            "http",
            "--push-api-base",
            "https://push.example.com/prod",
        ]);
        build_push_delivery(&cli).expect("http delivery");
    }

    #[tokio::test]
    async fn functional_read_directive_parses_file_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("directive.json");
        std::fs::write(&path, r#"{"directive": null}"#).expect("write directive");
        let cli = Cli::parse_from([
            "hearth",
            "--directive-file",
            path.to_str().expect("utf8 path"),
        ]);
        let value = read_directive(&cli).await.expect("read directive");
        assert!(value.get("directive").is_some());
    }

    #[tokio::test]
    async fn regression_read_directive_rejects_non_json_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("directive.json");
        std::fs::write(&path, "not json").expect("write directive");
        let cli = Cli::parse_from([
            "hearth",
            "--directive-file",
            path.to_str().expect("utf8 path"),
        ]);
        let error = read_directive(&cli).await.expect_err("should fail");
        assert!(error.to_string().contains("not valid JSON"));
    }
}
