use mindwtr_merge::{
    filter_deleted, merge_entities, merge_entities_resolving, merge_entities_with_stats,
    EntityMergeStats, KeepWinner, Overlap, Side, MAX_CONFLICT_IDS,
};
use mindwtr_types::{Record, Task};
use pretty_assertions::assert_eq;
use serde_json::Map;

fn task(id: &str, updated_at: &str, deleted_at: Option<&str>) -> Task {
    Task {
        id: id.to_string(),
        title: format!("Task {id}"),
        status: "inbox".to_string(),
        project_id: None,
        attachments: None,
        created_at: Some("2023-01-01T00:00:00.000Z".to_string()),
        updated_at: updated_at.to_string(),
        deleted_at: deleted_at.map(str::to_string),
        extra: Map::new(),
    }
}

fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(Record::id).collect()
}

// ── One-sided records ────────────────────────────────────────────

#[test]
fn local_only_is_kept_verbatim() {
    let local = vec![task("1", "2023-01-01", None)];
    let result = merge_entities_with_stats(&local, &[]);

    assert_eq!(result.merged, local);
    assert_eq!(result.stats.local_only, 1);
    assert_eq!(result.stats.resolved_using_local, 1);
    assert_eq!(result.stats.conflicts, 0);
}

#[test]
fn incoming_only_is_kept_verbatim() {
    let incoming = vec![task("1", "2023-01-01", Some("2023-01-01"))];
    let result = merge_entities_with_stats(&[], &incoming);

    assert_eq!(result.merged, incoming);
    assert_eq!(result.stats.incoming_only, 1);
    assert_eq!(result.stats.resolved_using_incoming, 1);
    assert_eq!(result.stats.deletions_won, 0);
}

#[test]
fn empty_inputs_produce_empty_output() {
    let result = merge_entities_with_stats::<Task>(&[], &[]);
    assert!(result.merged.is_empty());
    assert_eq!(result.stats, EntityMergeStats::default());
}

// ── Last-write-wins ──────────────────────────────────────────────

#[test]
fn newer_incoming_wins() {
    let local = vec![task("1", "2023-01-01", None)];
    let incoming = vec![task("1", "2023-01-02", None)];
    let result = merge_entities_with_stats(&local, &incoming);

    assert_eq!(result.merged, incoming);
    assert_eq!(result.stats.conflicts, 1);
    assert_eq!(result.stats.resolved_using_incoming, 1);
    assert_eq!(result.stats.conflict_ids, vec!["1".to_string()]);
}

#[test]
fn newer_local_wins() {
    let local = vec![task("1", "2023-01-02", None)];
    let incoming = vec![task("1", "2023-01-01", None)];
    let result = merge_entities_with_stats(&local, &incoming);

    assert_eq!(result.merged, local);
    assert_eq!(result.stats.conflicts, 1);
    assert_eq!(result.stats.resolved_using_local, 1);
}

#[test]
fn tie_keeps_local() {
    let mut local = task("1", "2023-01-01", None);
    local.title = "local title".into();
    let mut incoming = task("1", "2023-01-01", None);
    incoming.title = "incoming title".into();

    let result = merge_entities_with_stats(&[local.clone()], &[incoming]);
    assert_eq!(result.merged, vec![local]);
    assert_eq!(result.stats.conflicts, 0);
    assert_eq!(result.stats.resolved_using_local, 1);
}

#[test]
fn equivalent_instants_in_different_notation_tie() {
    let local = vec![task("1", "2023-01-01", None)];
    let incoming = vec![task("1", "2023-01-01T00:00:00.000Z", None)];
    let result = merge_entities_with_stats(&local, &incoming);

    assert_eq!(result.merged, local);
    assert_eq!(result.stats.conflicts, 0);
}

#[test]
fn offsets_are_compared_as_instants() {
    // 01:00+02:00 is 23:00 UTC the previous day.
    let local = vec![task("1", "2023-01-01T01:00:00+02:00", None)];
    let incoming = vec![task("1", "2023-01-01T00:00:00Z", None)];
    let result = merge_entities_with_stats(&local, &incoming);

    assert_eq!(result.merged, incoming);
}

#[test]
fn malformed_timestamp_never_beats_valid_one() {
    let local = vec![task("1", "not-a-date", None)];
    let incoming = vec![task("1", "1970-01-01T00:00:00.001Z", None)];
    let result = merge_entities_with_stats(&local, &incoming);

    assert_eq!(result.merged, incoming);
    assert_eq!(result.stats.conflicts, 1);
}

#[test]
fn two_malformed_timestamps_tie_to_local() {
    let local = vec![task("1", "", None)];
    let incoming = vec![task("1", "garbage", None)];
    let result = merge_entities_with_stats(&local, &incoming);

    assert_eq!(result.merged, local);
    assert_eq!(result.stats.conflicts, 0);
}

// ── Tombstones ───────────────────────────────────────────────────

#[test]
fn newer_incoming_deletion_wins() {
    let local = vec![task("1", "2023-01-01", None)];
    let incoming = vec![task("1", "2023-01-02", Some("2023-01-02"))];
    let result = merge_entities_with_stats(&local, &incoming);

    assert_eq!(result.merged[0].deleted_at.as_deref(), Some("2023-01-02"));
    assert_eq!(result.stats.deletions_won, 1);
}

#[test]
fn newer_local_deletion_wins() {
    let local = vec![task("1", "2023-01-02", Some("2023-01-02"))];
    let incoming = vec![task("1", "2023-01-01", None)];
    let result = merge_entities_with_stats(&local, &incoming);

    assert!(result.merged[0].is_deleted());
    assert_eq!(result.stats.deletions_won, 1);
    assert_eq!(result.stats.resolved_using_local, 1);
}

#[test]
fn later_edit_revives_deleted_record() {
    let local = vec![task("1", "2023-01-01", Some("2023-01-01"))];
    let incoming = vec![task("1", "2023-01-02", None)];
    let result = merge_entities_with_stats(&local, &incoming);

    assert_eq!(result.merged[0].deleted_at, None);
    assert_eq!(result.merged[0].updated_at, "2023-01-02");
    assert_eq!(result.stats.deletions_won, 0);
}

#[test]
fn deletion_disagreement_on_equal_timestamps_is_a_conflict() {
    let local = vec![task("1", "2023-01-01", Some("2023-01-01"))];
    let incoming = vec![task("1", "2023-01-01", None)];
    let result = merge_entities_with_stats(&local, &incoming);

    assert_eq!(result.stats.conflicts, 1);
    // Tie keeps the local tombstone, which counts as a won deletion.
    assert!(result.merged[0].is_deleted());
    assert_eq!(result.stats.deletions_won, 1);
}

#[test]
fn tie_keeps_live_local_over_incoming_tombstone() {
    let local = vec![task("1", "2023-01-01", None)];
    let incoming = vec![task("1", "2023-01-01", Some("2023-01-01"))];
    let result = merge_entities_with_stats(&local, &incoming);

    assert_eq!(result.stats.conflicts, 1);
    assert!(!result.merged[0].is_deleted());
    assert_eq!(result.stats.deletions_won, 0);
}

#[test]
fn agreed_deletion_is_not_a_win() {
    let local = vec![task("1", "2023-01-01", Some("2023-01-01"))];
    let incoming = vec![task("1", "2023-01-01", Some("2023-01-01"))];
    let result = merge_entities_with_stats(&local, &incoming);

    assert_eq!(result.stats.conflicts, 0);
    assert_eq!(result.stats.deletions_won, 0);
}

#[test]
fn deleted_on_both_sides_with_different_times_counts_as_win() {
    let local = vec![task("1", "2023-01-01", Some("2023-01-01"))];
    let incoming = vec![task("1", "2023-01-03", Some("2023-01-03"))];
    let result = merge_entities_with_stats(&local, &incoming);

    assert_eq!(result.stats.conflicts, 1);
    assert_eq!(result.stats.deletions_won, 1);
    assert_eq!(result.merged[0].updated_at, "2023-01-03");
}

#[test]
fn empty_tombstone_counts_as_live() {
    let local = vec![task("1", "2023-01-01", Some(""))];
    let incoming = vec![task("1", "2023-01-01", None)];
    let result = merge_entities_with_stats(&local, &incoming);

    assert_eq!(result.stats.conflicts, 0);
}

// ── Ordering and totals ──────────────────────────────────────────

#[test]
fn output_follows_first_seen_order() {
    let local = vec![task("b", "2023-01-01", None), task("a", "2023-01-01", None)];
    let incoming = vec![
        task("c", "2023-01-01", None),
        task("a", "2023-01-02", None),
        task("d", "2023-01-01", None),
    ];
    let result = merge_entities_with_stats(&local, &incoming);

    assert_eq!(ids(&result.merged), vec!["b", "a", "c", "d"]);
    assert_eq!(result.stats.local_total, 2);
    assert_eq!(result.stats.incoming_total, 3);
    assert_eq!(result.stats.merged_total, 4);
}

#[test]
fn duplicate_ids_within_one_side_keep_last_occurrence() {
    let local = vec![
        task("1", "2023-01-01", None),
        task("2", "2023-01-01", None),
        task("1", "2023-01-05", None),
    ];
    let result = merge_entities_with_stats(&local, &[]);

    assert_eq!(ids(&result.merged), vec!["1", "2"]);
    assert_eq!(result.merged[0].updated_at, "2023-01-05");
    assert_eq!(result.stats.local_total, 3);
    assert_eq!(result.stats.merged_total, 2);
    assert_eq!(result.stats.local_only, 2);
}

#[test]
fn conflict_ids_are_capped() {
    let local: Vec<Task> = (0..30)
        .map(|i| task(&i.to_string(), "2023-01-01", None))
        .collect();
    let incoming: Vec<Task> = (0..30)
        .map(|i| task(&i.to_string(), "2023-01-02", None))
        .collect();
    let result = merge_entities_with_stats(&local, &incoming);

    assert_eq!(result.stats.conflicts, 30);
    assert_eq!(result.stats.conflict_ids.len(), MAX_CONFLICT_IDS);
    assert_eq!(result.stats.conflict_ids[0], "0");
    assert_eq!(result.stats.conflict_ids[19], "19");
}

#[test]
fn merge_entities_discards_stats() {
    let local = vec![task("1", "2023-01-01", None)];
    let incoming = vec![task("2", "2023-01-01", None)];
    assert_eq!(ids(&merge_entities(&local, &incoming)), vec!["1", "2"]);
}

// ── Resolvers ────────────────────────────────────────────────────

#[test]
fn keep_winner_matches_default() {
    let local = vec![task("1", "2023-01-01", None)];
    let incoming = vec![task("1", "2023-01-02", None)];
    assert_eq!(
        merge_entities_resolving(&local, &incoming, &KeepWinner),
        merge_entities_with_stats(&local, &incoming)
    );
}

#[test]
fn resolver_sees_both_versions_and_winner() {
    let local = vec![task("1", "2023-01-01", None), task("2", "2023-01-01", None)];
    let incoming = vec![task("1", "2023-01-02", None)];

    let resolver = |overlap: Overlap<'_, Task>| {
        assert_eq!(overlap.winner, Side::Incoming);
        assert_eq!(overlap.loser().updated_at, "2023-01-01");
        let mut t = overlap.winner().clone();
        t.title = format!("{} / {}", overlap.local.title, overlap.incoming.title);
        t
    };
    let result = merge_entities_resolving(&local, &incoming, &resolver);

    assert_eq!(result.merged[0].title, "Task 1 / Task 1");
    assert_eq!(result.merged[1].title, "Task 2");
    assert_eq!(result.stats.resolved_using_incoming, 1);
}

#[test]
fn resolver_runs_for_identical_pairs_too() {
    use std::cell::Cell;

    let calls = Cell::new(0);
    let records = vec![task("1", "2023-01-01", None)];
    let resolver = |overlap: Overlap<'_, Task>| {
        calls.set(calls.get() + 1);
        overlap.winner().clone()
    };
    merge_entities_resolving(&records, &records, &resolver);
    assert_eq!(calls.get(), 1);
}

// ── filter_deleted ───────────────────────────────────────────────

#[test]
fn filter_deleted_drops_tombstones() {
    let tasks = vec![
        task("1", "2023-01-01", None),
        task("2", "2023-01-01", Some("2023-01-01")),
    ];
    let filtered = filter_deleted(&tasks);
    assert_eq!(ids(&filtered), vec!["1"]);
}
