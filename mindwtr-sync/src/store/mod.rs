//! Snapshot storage.
//!
//! The sync workflow only needs to read and write whole snapshots, so local
//! storage and every remote target share one trait.

pub mod file;
pub mod memory;
pub mod webdav;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use webdav::{WebDavConfig, WebDavStore};

use crate::error::SyncResult;
use async_trait::async_trait;
use mindwtr_types::Snapshot;

/// A place a snapshot can be read from and written to.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Human-readable location, for logs and status messages.
    fn describe(&self) -> String;

    /// Reads the stored snapshot. `None` means nothing has been stored yet.
    async fn read(&self) -> SyncResult<Option<Snapshot>>;

    /// Replaces the stored snapshot.
    async fn write(&self, snapshot: &Snapshot) -> SyncResult<()>;
}
