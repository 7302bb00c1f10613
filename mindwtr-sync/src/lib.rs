//! Sync workflow for Mindwtr.
//!
//! Every device keeps its whole state in one local snapshot and exchanges
//! it with a shared target. A sync cycle merges the two with
//! [`mindwtr_merge`] and writes the result to both sides.
//!
//! # Targets
//!
//! - [`FileStore`]: a JSON file, typically in a folder synced by another tool
//! - [`WebDavStore`]: a JSON resource on a WebDAV server
//! - [`MemoryStore`]: in-process, for embedding and tests

pub mod codec;
pub mod config;
pub mod error;
pub mod service;
pub mod store;

pub use codec::{decode_snapshot, encode_snapshot};
pub use config::{SyncConfig, TargetConfig};
pub use error::{SyncError, SyncResult};
pub use service::{SyncOptions, SyncOutcome, SyncService};
pub use store::{FileStore, MemoryStore, SnapshotStore, WebDavConfig, WebDavStore};
