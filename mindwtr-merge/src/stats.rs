//! Merge statistics.
//!
//! Computed fresh by every merge call. Serialized in camelCase because the
//! sync workflow stores them in `settings.lastSyncStats`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of conflicting ids kept for diagnostics.
pub const MAX_CONFLICT_IDS: usize = 20;

/// What a merge did to one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMergeStats {
    /// Records in the local input.
    pub local_total: usize,
    /// Records in the incoming input.
    pub incoming_total: usize,
    /// Records in the merged output.
    pub merged_total: usize,
    pub local_only: usize,
    pub incoming_only: usize,
    /// Same-id pairs whose timestamps or deletion states disagreed.
    pub conflicts: usize,
    pub resolved_using_local: usize,
    pub resolved_using_incoming: usize,
    /// Conflicts whose winner was a tombstone.
    pub deletions_won: usize,
    /// The first [`MAX_CONFLICT_IDS`] conflicting ids, in iteration order.
    pub conflict_ids: Vec<String>,
}

impl EntityMergeStats {
    /// Creates empty stats for inputs of the given sizes.
    #[must_use]
    pub fn new(local_total: usize, incoming_total: usize) -> Self {
        Self {
            local_total,
            incoming_total,
            ..Self::default()
        }
    }

    pub(crate) fn record_conflict(&mut self, id: &str) {
        self.conflicts += 1;
        if self.conflict_ids.len() < MAX_CONFLICT_IDS {
            self.conflict_ids.push(id.to_string());
        }
    }

    #[must_use]
    pub fn has_conflicts(&self) -> bool {
        self.conflicts > 0
    }
}

impl fmt::Display for EntityMergeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} merged from {} local + {} incoming ({} local-only, {} incoming-only, {} conflicts, {} deletions won)",
            self.merged_total,
            self.local_total,
            self.incoming_total,
            self.local_only,
            self.incoming_only,
            self.conflicts,
            self.deletions_won,
        )
    }
}

/// Per-collection stats for a whole snapshot merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    pub tasks: EntityMergeStats,
    pub projects: EntityMergeStats,
}

impl MergeStats {
    /// Conflicts across all collections.
    #[must_use]
    pub fn total_conflicts(&self) -> usize {
        self.tasks.conflicts + self.projects.conflicts
    }
}

impl fmt::Display for MergeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tasks: {}; projects: {}", self.tasks, self.projects)
    }
}
