//! Snapshot stored as a JSON file.
//!
//! Serves both as the device's local data file and as a sync target on a
//! shared folder (Syncthing, iCloud Drive, a mounted network share).

use super::SnapshotStore;
use crate::codec::{decode_snapshot, encode_snapshot};
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use mindwtr_types::Snapshot;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// A snapshot in a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    pretty: bool,
}

impl FileStore {
    /// Creates a store for the file at `path`. Writes are pretty-printed.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
        }
    }

    /// Sets whether writes are pretty-printed.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for FileStore {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn read(&self) -> SyncResult<Option<Snapshot>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => {
                return Err(SyncError::Storage(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        debug!("Read {} bytes from {:?}", bytes.len(), self.path);
        decode_snapshot(&bytes).map(Some)
    }

    async fn write(&self, snapshot: &Snapshot) -> SyncResult<()> {
        let bytes = encode_snapshot(snapshot, self.pretty)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| SyncError::Storage(format!("failed to create {}: {e}", parent.display())))?;
                info!("Created snapshot folder: {:?}", parent);
            }
        }

        // Write beside the target and rename so readers never see a partial file.
        let temp = self.temp_path();
        fs::write(&temp, &bytes)
            .await
            .map_err(|e| SyncError::Storage(format!("failed to write {}: {e}", temp.display())))?;
        if let Err(e) = fs::rename(&temp, &self.path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(SyncError::Storage(format!(
                "failed to replace {}: {e}",
                self.path.display()
            )));
        }

        debug!("Wrote {} bytes to {:?}", bytes.len(), self.path);
        Ok(())
    }
}
