//! In-memory snapshot store, for embedding and tests.

use super::SnapshotStore;
use crate::error::SyncResult;
use async_trait::async_trait;
use mindwtr_types::Snapshot;
use tokio::sync::RwLock;

/// Holds at most one snapshot in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: RwLock<Option<Snapshot>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `snapshot`.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot)),
        }
    }

    /// Returns a copy of the stored snapshot.
    pub async fn get(&self) -> Option<Snapshot> {
        self.snapshot.read().await.clone()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn read(&self) -> SyncResult<Option<Snapshot>> {
        Ok(self.get().await)
    }

    async fn write(&self, snapshot: &Snapshot) -> SyncResult<()> {
        *self.snapshot.write().await = Some(snapshot.clone());
        Ok(())
    }
}
