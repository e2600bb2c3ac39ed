//! Connection registry lookup.
//!
//! The registry maps a logical device key to the latest known push
//! channel handle. It is written by the external connection lifecycle
//! process and only ever read here; a resolved handle may already be
//! stale by the time delivery is attempted.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Registry record for one device: the latest known channel handle.
pub struct ChannelRecord {
    pub connection_handle: String,
    #[serde(default)]
    pub updated_unix_ms: u64,
}

#[async_trait]
/// Read-only registry seam. No freshness validation happens here.
pub trait ChannelRegistry: Send + Sync {
    async fn resolve(&self, device_key: &str) -> Result<Option<ChannelRecord>>;
}

#[derive(Debug, Clone)]
/// File-backed registry: a JSON map of device key to channel record,
/// re-read on every resolve so external updates are always picked up.
pub struct FileChannelRegistry {
    path: PathBuf,
}

impl FileChannelRegistry {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ChannelRegistry for FileChannelRegistry {
    async fn resolve(&self, device_key: &str) -> Result<Option<ChannelRecord>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(error).with_context(|| {
                    format!("failed to read channel registry {}", self.path.display())
                })
            }
        };
        let records: BTreeMap<String, ChannelRecord> = serde_json::from_str(&raw)
            .with_context(|| {
                format!("failed to parse channel registry {}", self.path.display())
            })?;
        Ok(records.get(device_key).cloned())
    }
}
