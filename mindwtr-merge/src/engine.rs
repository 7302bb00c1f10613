//! Last-write-wins merge over collections of records.
//!
//! Two collections of the same record type are combined id by id:
//! - An id on one side only is kept verbatim
//! - An id on both sides keeps the record with the strictly newer
//!   `updatedAt`; on a tie the local record is kept
//!
//! Tombstones take part like any other edit, so a deletion can lose to a
//! later edit made elsewhere before the deletion was seen.
//!
//! Output order is first-seen order: local ids in input order, then
//! incoming ids not already emitted.

use crate::stats::EntityMergeStats;
use mindwtr_types::Record;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Which input a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Local,
    Incoming,
}

/// Both versions of a record present on both sides, plus the side that won.
#[derive(Debug)]
pub struct Overlap<'a, T> {
    pub local: &'a T,
    pub incoming: &'a T,
    pub winner: Side,
}

impl<'a, T> Overlap<'a, T> {
    /// The version chosen by last-write-wins.
    #[must_use]
    pub fn winner(&self) -> &'a T {
        match self.winner {
            Side::Local => self.local,
            Side::Incoming => self.incoming,
        }
    }

    /// The version that lost.
    #[must_use]
    pub fn loser(&self) -> &'a T {
        match self.winner {
            Side::Local => self.incoming,
            Side::Incoming => self.local,
        }
    }
}

impl<T> Clone for Overlap<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Overlap<'_, T> {}

/// Post-processes the winner of an overlapping pair.
///
/// Called once for every id present on both sides, after the winner has
/// been chosen and counted. The returned record is what gets emitted.
pub trait ConflictResolver<T> {
    fn resolve(&self, overlap: Overlap<'_, T>) -> T;
}

/// Emits the winner unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepWinner;

impl<T: Clone> ConflictResolver<T> for KeepWinner {
    fn resolve(&self, overlap: Overlap<'_, T>) -> T {
        overlap.winner().clone()
    }
}

impl<T, F> ConflictResolver<T> for F
where
    F: Fn(Overlap<'_, T>) -> T,
{
    fn resolve(&self, overlap: Overlap<'_, T>) -> T {
        self(overlap)
    }
}

/// Merged records plus the stats describing how they were chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMerge<T> {
    pub merged: Vec<T>,
    pub stats: EntityMergeStats,
}

/// Merges two collections, emitting winners unchanged.
#[must_use]
pub fn merge_entities_with_stats<T>(local: &[T], incoming: &[T]) -> EntityMerge<T>
where
    T: Record + Clone,
{
    merge_entities_resolving(local, incoming, &KeepWinner)
}

/// Merges two collections, discarding the stats.
#[must_use]
pub fn merge_entities<T>(local: &[T], incoming: &[T]) -> Vec<T>
where
    T: Record + Clone,
{
    merge_entities_with_stats(local, incoming).merged
}

/// Merges two collections, passing every overlapping pair through `resolver`.
///
/// If an id appears more than once in one input, the last occurrence is
/// the one merged; input totals still count every occurrence.
pub fn merge_entities_resolving<T, R>(local: &[T], incoming: &[T], resolver: &R) -> EntityMerge<T>
where
    T: Record + Clone,
    R: ConflictResolver<T> + ?Sized,
{
    let local_by_id: HashMap<&str, &T> = local.iter().map(|r| (r.id(), r)).collect();
    let incoming_by_id: HashMap<&str, &T> = incoming.iter().map(|r| (r.id(), r)).collect();

    let mut stats = EntityMergeStats::new(local.len(), incoming.len());
    let mut merged = Vec::with_capacity(local_by_id.len() + incoming_by_id.len());
    let mut seen: HashSet<&str> = HashSet::with_capacity(merged.capacity());

    for id in local.iter().chain(incoming).map(Record::id) {
        if !seen.insert(id) {
            continue;
        }

        match (local_by_id.get(id), incoming_by_id.get(id)) {
            (Some(&l), None) => {
                stats.local_only += 1;
                stats.resolved_using_local += 1;
                merged.push(l.clone());
            }
            (None, Some(&i)) => {
                stats.incoming_only += 1;
                stats.resolved_using_incoming += 1;
                merged.push(i.clone());
            }
            (Some(&l), Some(&i)) => {
                merged.push(resolve_overlap(l, i, resolver, &mut stats));
            }
            // Every id was read from one of the two inputs.
            (None, None) => {}
        }
    }

    stats.merged_total = merged.len();
    EntityMerge { merged, stats }
}

fn resolve_overlap<T, R>(local: &T, incoming: &T, resolver: &R, stats: &mut EntityMergeStats) -> T
where
    T: Record,
    R: ConflictResolver<T> + ?Sized,
{
    let local_time = local.modified_at();
    let incoming_time = incoming.modified_at();

    let deletion_differs = local.is_deleted() != incoming.is_deleted();
    let conflict = local_time != incoming_time || deletion_differs;
    if conflict {
        stats.record_conflict(local.id());
    }

    // Local wins ties.
    let winner = match incoming_time.cmp(&local_time) {
        Ordering::Greater => Side::Incoming,
        Ordering::Less | Ordering::Equal => Side::Local,
    };
    match winner {
        Side::Local => stats.resolved_using_local += 1,
        Side::Incoming => stats.resolved_using_incoming += 1,
    }

    let overlap = Overlap {
        local,
        incoming,
        winner,
    };

    // A tombstone both sides already agreed on is not a win.
    if overlap.winner().is_deleted() && (deletion_differs || conflict) {
        stats.deletions_won += 1;
    }

    resolver.resolve(overlap)
}

/// Returns the records that are not soft-deleted, for display.
#[must_use]
pub fn filter_deleted<T>(items: &[T]) -> Vec<T>
where
    T: Record + Clone,
{
    items.iter().filter(|r| !r.is_deleted()).cloned().collect()
}
