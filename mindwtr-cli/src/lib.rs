//! Library half of the `mindwtr-sync` binary.
//!
//! Kept separate from `main.rs` so the file handling can be tested without
//! spawning the process.

use anyhow::{Context, Result};
use mindwtr_merge::{merge_snapshots_with_stats, MergeResult};
use mindwtr_sync::{
    decode_snapshot, encode_snapshot, FileStore, SnapshotStore, SyncConfig, SyncOutcome,
    SyncService, TargetConfig,
};
use mindwtr_types::Snapshot;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Reads and decodes a snapshot file.
pub async fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let snapshot =
        decode_snapshot(&bytes).with_context(|| format!("failed to decode {}", path.display()))?;

    debug!(
        "Read {} tasks and {} projects from {:?}",
        snapshot.tasks.len(),
        snapshot.projects.len(),
        path
    );
    Ok(snapshot)
}

/// Merges two snapshot files, `local` winning ties.
pub async fn merge_files(local: &Path, incoming: &Path) -> Result<MergeResult> {
    let local = read_snapshot(local).await?;
    let incoming = read_snapshot(incoming).await?;
    Ok(merge_snapshots_with_stats(&local, &incoming))
}

/// Writes a merged snapshot to `output`, or returns the encoded bytes when
/// no output path is given.
pub async fn write_merged(
    snapshot: &Snapshot,
    output: Option<&Path>,
    pretty: bool,
) -> Result<Option<Vec<u8>>> {
    match output {
        Some(path) => {
            FileStore::new(path)
                .with_pretty(pretty)
                .write(snapshot)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote merged snapshot to {:?}", path);
            Ok(None)
        }
        None => Ok(Some(encode_snapshot(snapshot, pretty)?)),
    }
}

/// Command-line overrides applied on top of a config file.
#[derive(Debug, Clone, Default)]
pub struct SyncOverrides {
    pub local: Option<PathBuf>,
    /// Replaces the configured target with a file target.
    pub target: Option<PathBuf>,
    pub no_seed: bool,
}

/// Loads the sync config, or starts from defaults, and applies overrides.
pub async fn resolve_config(path: Option<&Path>, overrides: SyncOverrides) -> Result<SyncConfig> {
    let mut config = match path {
        Some(path) => SyncConfig::load(path).await?,
        None => SyncConfig::default(),
    };

    if let Some(local) = overrides.local {
        config.local_path = local;
    }
    if let Some(target) = overrides.target {
        config.target = TargetConfig::File { path: target };
    }
    if overrides.no_seed {
        config.seed_empty_target = false;
    }
    Ok(config)
}

/// Runs one sync cycle.
pub async fn run_sync(config: &SyncConfig) -> Result<SyncOutcome> {
    let service = SyncService::from_config(config).context("failed to set up sync")?;
    debug!("Using {:?}", service);
    Ok(service.sync().await)
}

/// One-line summary of a sync outcome.
pub fn describe_outcome(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Merged { at, stats } => format!("synced at {at}: {stats}"),
        SyncOutcome::Seeded { at } => format!("seeded empty target at {at}"),
        SyncOutcome::NothingToMerge => "nothing to merge: target is empty".to_string(),
        SyncOutcome::Failed {
            error,
            local_written: true,
            ..
        } => format!("sync failed after local data was updated: {error}"),
        SyncOutcome::Failed { error, .. } => format!("sync failed: {error}"),
    }
}
