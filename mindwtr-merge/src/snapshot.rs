//! Whole-snapshot merge.
//!
//! Tasks and projects are merged independently with the entity engine.
//! For every record present on both sides, the attachment lists of the two
//! versions are merged as well, unless the winner is a tombstone. Settings
//! are device-local and always come from the local snapshot.

use crate::engine::{merge_entities, merge_entities_resolving, ConflictResolver, Overlap};
use crate::stats::MergeStats;
use mindwtr_types::{Attachment, HasAttachments, Snapshot};

/// A merged snapshot and the stats describing it.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    pub data: Snapshot,
    pub stats: MergeStats,
}

/// Resolver that folds the loser's attachments into the winner.
///
/// Attachments are records themselves, so they are merged with the same
/// last-write-wins rules, the winner's list playing the local side.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachmentMerge;

impl<T> ConflictResolver<T> for AttachmentMerge
where
    T: HasAttachments + Clone,
{
    fn resolve(&self, overlap: Overlap<'_, T>) -> T {
        let winner = overlap.winner();
        let mut resolved = winner.clone();
        if winner.is_deleted() {
            return resolved;
        }

        if let Some(attachments) =
            merge_attachments(winner.attachments(), overlap.loser().attachments())
        {
            resolved.set_attachments(attachments);
        }
        resolved
    }
}

fn merge_attachments(winner: &[Attachment], loser: &[Attachment]) -> Option<Vec<Attachment>> {
    if winner.is_empty() && loser.is_empty() {
        return None;
    }
    let merged = merge_entities(winner, loser);
    (!merged.is_empty()).then_some(merged)
}

/// Merges two snapshots and reports what happened.
#[must_use]
pub fn merge_snapshots_with_stats(local: &Snapshot, incoming: &Snapshot) -> MergeResult {
    let tasks = merge_entities_resolving(&local.tasks, &incoming.tasks, &AttachmentMerge);
    let projects = merge_entities_resolving(&local.projects, &incoming.projects, &AttachmentMerge);

    MergeResult {
        data: Snapshot {
            tasks: tasks.merged,
            projects: projects.merged,
            settings: local.settings.clone(),
        },
        stats: MergeStats {
            tasks: tasks.stats,
            projects: projects.stats,
        },
    }
}

/// Merges two snapshots, discarding the stats.
#[must_use]
pub fn merge_snapshots(local: &Snapshot, incoming: &Snapshot) -> Snapshot {
    merge_snapshots_with_stats(local, incoming).data
}
