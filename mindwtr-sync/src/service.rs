//! The sync workflow.
//!
//! One cycle reads the local snapshot, reads the target, merges the two,
//! then writes the result locally and to the target. The local store is
//! only overwritten after a merge has been computed. If the target write
//! fails after the local write succeeded the local store has advanced;
//! that state is reported, not rolled back.
//!
//! At most one cycle runs per service. A `sync()` call made while a cycle
//! is in flight joins it and receives the same outcome.

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::store::SnapshotStore;
use futures::future::{BoxFuture, FutureExt, Shared};
use mindwtr_merge::{merge_snapshots_with_stats, MergeResult, MergeStats};
use mindwtr_types::{Snapshot, Timestamp};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Sync behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Upload the local snapshot when the target holds nothing yet.
    pub seed_empty_target: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            seed_empty_target: true,
        }
    }
}

/// How a sync cycle ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Both sides merged and written.
    Merged { at: Timestamp, stats: MergeStats },
    /// The target was empty and now holds the local snapshot.
    Seeded { at: Timestamp },
    /// The target was empty and seeding is disabled.
    NothingToMerge,
    /// The cycle stopped on an error.
    Failed {
        at: Timestamp,
        error: String,
        /// Whether the local store had already been overwritten.
        local_written: bool,
    },
}

impl SyncOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Merge stats, for a cycle that merged.
    #[must_use]
    pub fn stats(&self) -> Option<&MergeStats> {
        match self {
            Self::Merged { stats, .. } => Some(stats),
            _ => None,
        }
    }

    /// The error message, for a failed cycle.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error, .. } => Some(error.as_str()),
            _ => None,
        }
    }
}

type SharedCycle = Shared<BoxFuture<'static, SyncOutcome>>;

struct Inner {
    local: Arc<dyn SnapshotStore>,
    target: Arc<dyn SnapshotStore>,
    options: SyncOptions,
    in_flight: Mutex<Option<SharedCycle>>,
    last_outcome: Mutex<Option<SyncOutcome>>,
}

/// Syncs one device's local store with a shared target.
///
/// Cheap to clone; clones share the in-flight cycle.
#[derive(Clone)]
pub struct SyncService {
    inner: Arc<Inner>,
}

impl SyncService {
    /// Creates a sync service.
    pub fn new(
        local: Arc<dyn SnapshotStore>,
        target: Arc<dyn SnapshotStore>,
        options: SyncOptions,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                local,
                target,
                options,
                in_flight: Mutex::new(None),
                last_outcome: Mutex::new(None),
            }),
        }
    }

    /// Creates a sync service from configuration.
    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        Ok(Self::new(
            config.build_local(),
            config.build_target()?,
            config.options(),
        ))
    }

    /// Runs a sync cycle, or joins the one already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn sync(&self) -> SyncOutcome {
        let cycle = {
            let mut slot = lock(&self.inner.in_flight);
            match slot.as_ref() {
                Some(cycle) => {
                    debug!("Sync already in progress, joining it");
                    cycle.clone()
                }
                None => {
                    let cycle = self.start_cycle();
                    *slot = Some(cycle.clone());
                    cycle
                }
            }
        };
        cycle.await
    }

    /// Whether a cycle is currently running.
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        lock(&self.inner.in_flight).is_some()
    }

    /// The outcome of the most recently finished cycle.
    #[must_use]
    pub fn last_outcome(&self) -> Option<SyncOutcome> {
        lock(&self.inner.last_outcome).clone()
    }

    fn start_cycle(&self) -> SharedCycle {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn({
            let inner = Arc::clone(&inner);
            async move {
                // Declared first so it is dropped last, panics included.
                let _release = ReleaseSlot(Arc::clone(&inner));
                let outcome = inner.run_cycle().await;
                *lock(&inner.last_outcome) = Some(outcome.clone());
                outcome
            }
        });

        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let outcome = SyncOutcome::Failed {
                        at: Timestamp::now(),
                        error: format!("sync task failed: {e}"),
                        local_written: false,
                    };
                    warn!("Sync task aborted: {e}");
                    *lock(&inner.last_outcome) = Some(outcome.clone());
                    outcome
                }
            }
        }
        .boxed()
        .shared()
    }
}

impl std::fmt::Debug for SyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncService")
            .field("local", &self.inner.local.describe())
            .field("target", &self.inner.target.describe())
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

/// Empties the in-flight slot when the cycle task ends.
struct ReleaseSlot(Arc<Inner>);

impl Drop for ReleaseSlot {
    fn drop(&mut self) {
        lock(&self.0.in_flight).take();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Inner {
    async fn run_cycle(&self) -> SyncOutcome {
        info!(
            "Syncing {} with {}",
            self.local.describe(),
            self.target.describe()
        );

        let mut local_written = false;
        match self.try_cycle(&mut local_written).await {
            Ok(outcome) => {
                match &outcome {
                    SyncOutcome::Merged { stats, .. } => info!("Sync complete: {stats}"),
                    SyncOutcome::Seeded { .. } => info!("Seeded {}", self.target.describe()),
                    _ => info!("Nothing to merge at {}", self.target.describe()),
                }
                outcome
            }
            Err(e) => {
                let at = Timestamp::now();
                let error = e.to_string();
                warn!("Sync failed (local written: {local_written}): {error}");
                self.record_failure(at, &error).await;
                SyncOutcome::Failed {
                    at,
                    error,
                    local_written,
                }
            }
        }
    }

    async fn try_cycle(&self, local_written: &mut bool) -> SyncResult<SyncOutcome> {
        let local = self.local.read().await?.unwrap_or_default();

        let Some(remote) = self.target.read().await? else {
            if !self.options.seed_empty_target {
                return Ok(SyncOutcome::NothingToMerge);
            }

            let at = Timestamp::now();
            let mut seeded = local;
            seeded.settings.record_success(at, None);
            self.local.write(&seeded).await?;
            *local_written = true;
            self.target.write(&seeded).await?;
            return Ok(SyncOutcome::Seeded { at });
        };

        let MergeResult { mut data, stats } = merge_snapshots_with_stats(&local, &remote);
        debug!(
            "Merged {} tasks and {} projects",
            data.tasks.len(),
            data.projects.len()
        );

        let at = Timestamp::now();
        data.settings
            .record_success(at, Some(serde_json::to_value(&stats)?));

        self.local.write(&data).await?;
        *local_written = true;
        self.target.write(&data).await?;

        Ok(SyncOutcome::Merged { at, stats })
    }

    /// Stamps the failure into local settings, if the local store allows it.
    async fn record_failure(&self, at: Timestamp, error: &str) {
        let mut snapshot: Snapshot = match self.local.read().await {
            Ok(snapshot) => snapshot.unwrap_or_default(),
            Err(e) => {
                warn!("Could not record sync failure locally: {e}");
                return;
            }
        };

        snapshot.settings.record_failure(at, error);
        if let Err(e) = self.local.write(&snapshot).await {
            warn!("Could not record sync failure locally: {e}");
        }
    }
}
