//! Snapshot reconciliation for Mindwtr.
//!
//! Devices edit their own replica offline and later exchange whole
//! snapshots. This crate combines two snapshots deterministically:
//!
//! - [`merge_entities_with_stats`]: last-write-wins over any collection of
//!   [`Record`](mindwtr_types::Record)s, with soft-delete tombstones
//! - [`merge_snapshots_with_stats`]: runs the engine over tasks and
//!   projects, merges attachment lists of overlapping records, keeps local
//!   settings
//! - [`EntityMergeStats`] / [`MergeStats`]: what the merge did, for display
//!
//! Rules for an id present on both sides:
//! - The strictly newer `updatedAt` wins; exact ties keep the local record
//! - Unparsable timestamps count as the epoch
//! - Deletion is not sticky: a later edit revives a deleted record
//!
//! This is not a CRDT. Merges trust device clocks and are commutative per
//! id only when timestamps differ.
//!
//! Everything here is pure: no I/O, no errors, no shared state.

mod engine;
mod snapshot;
mod stats;

pub use engine::{
    filter_deleted, merge_entities, merge_entities_resolving, merge_entities_with_stats,
    ConflictResolver, EntityMerge, KeepWinner, Overlap, Side,
};
pub use snapshot::{merge_snapshots, merge_snapshots_with_stats, AttachmentMerge, MergeResult};
pub use stats::{EntityMergeStats, MergeStats, MAX_CONFLICT_IDS};
