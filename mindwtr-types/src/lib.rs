//! Core type definitions for the Mindwtr sync core.
//!
//! This crate defines the values that flow between devices:
//! - Records ([`Task`], [`Project`], [`Attachment`]) and the [`Record`] trait
//!   the merge engine is written against
//! - The [`Snapshot`] a device exchanges with its sync target, and its
//!   device-local [`Settings`]
//! - Wall-clock [`Timestamp`]s parsed from ISO-8601 strings
//!
//! Everything here is plain data. Merging lives in `mindwtr-merge`,
//! persistence and transport in `mindwtr-sync`.

mod ids;
mod record;
mod snapshot;
mod timestamp;

pub use ids::{is_valid_id, new_id};
pub use record::{Attachment, AttachmentKind, HasAttachments, Project, Record, Task};
pub use snapshot::{Settings, Snapshot, SyncStatus};
pub use timestamp::Timestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
