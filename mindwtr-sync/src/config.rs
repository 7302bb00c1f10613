//! Sync configuration.

use crate::error::{SyncError, SyncResult};
use crate::service::SyncOptions;
use crate::store::{FileStore, SnapshotStore, WebDavConfig, WebDavStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Where snapshots are exchanged with other devices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TargetConfig {
    /// A JSON file in a shared folder.
    File { path: PathBuf },
    /// A JSON resource on a WebDAV server.
    WebDav(WebDavConfig),
}

impl TargetConfig {
    /// Builds the storage for this target.
    pub fn build(&self, pretty: bool) -> SyncResult<Arc<dyn SnapshotStore>> {
        let store: Arc<dyn SnapshotStore> = match self {
            Self::File { path } => Arc::new(FileStore::new(path).with_pretty(pretty)),
            Self::WebDav(config) => {
                if config.url.trim().is_empty() {
                    return Err(SyncError::Config("WebDAV URL is not configured".to_string()));
                }
                Arc::new(WebDavStore::new(config.clone())?)
            }
        };
        Ok(store)
    }
}

fn default_true() -> bool {
    true
}

/// Configuration for one device's sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// The device's own data file.
    pub local_path: PathBuf,
    /// The shared target.
    pub target: TargetConfig,
    /// Upload the local snapshot when the target holds nothing yet.
    #[serde(default = "default_true")]
    pub seed_empty_target: bool,
    /// Pretty-print JSON written to files.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            local_path: PathBuf::from("data.json"),
            target: TargetConfig::File {
                path: PathBuf::from("sync/data.json"),
            },
            seed_empty_target: true,
            pretty: true,
        }
    }
}

impl SyncConfig {
    /// Loads configuration from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SyncError::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| SyncError::Config(format!("failed to parse {}: {e}", path.display())))?;

        debug!("Loaded sync config from {:?}", path);
        Ok(config)
    }

    /// Builds the local store.
    pub fn build_local(&self) -> Arc<dyn SnapshotStore> {
        Arc::new(FileStore::new(&self.local_path).with_pretty(self.pretty))
    }

    /// Builds the target store.
    pub fn build_target(&self) -> SyncResult<Arc<dyn SnapshotStore>> {
        self.target.build(self.pretty)
    }

    /// Options for the sync service.
    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            seed_empty_target: self.seed_empty_target,
        }
    }
}
