//! Property tests for change batching.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use proptest::prelude::*;

use watch_rebuild::watcher::{ChangeKind, WatcherState, MAX_WAIT_MS};

const DEBOUNCE: Duration = Duration::from_millis(100);

fn kind() -> impl Strategy<Value = ChangeKind> {
    prop_oneof![
        Just(ChangeKind::Add),
        Just(ChangeKind::Change),
        Just(ChangeKind::Unlink),
    ]
}

fn file_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z]{1,8}\\.ts").unwrap()
}

/// Drive the state machine the way the loop does: feed changes at their
/// offsets, and flush a batch whenever the quiet period has elapsed.
fn count_batches(changes: &[(u64, String, ChangeKind)]) -> usize {
    let start = Instant::now();
    let mut state = WatcherState::new(DEBOUNCE);
    let mut batches = 0;

    for (offset_ms, name, kind) in changes {
        let at = start + Duration::from_millis(*offset_ms);
        if state.should_build_at(at) {
            state.take_changes();
            batches += 1;
        }
        state.add_change_at(PathBuf::from(name), *kind, at);
    }

    let end = changes
        .last()
        .map(|(offset_ms, _, _)| start + Duration::from_millis(offset_ms + 1_000))
        .unwrap_or(start);
    if state.should_build_at(end) {
        state.take_changes();
        batches += 1;
    }
    batches
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Changes separated by more than the debounce window yield one batch each.
    #[test]
    fn property_separated_changes_batch_individually(
        events in proptest::collection::vec((file_name(), kind()), 0..=12),
        gap_ms in 101u64..500,
    ) {
        let changes: Vec<_> = events
            .into_iter()
            .enumerate()
            .map(|(i, (name, kind))| (i as u64 * gap_ms, name, kind))
            .collect();

        prop_assert_eq!(count_batches(&changes), changes.len());
    }

    /// PROPERTY: A burst inside the debounce window, shorter than the max wait,
    /// collapses to a single batch.
    #[test]
    fn property_burst_collapses_to_one_batch(
        events in proptest::collection::vec((file_name(), kind()), 1..=20),
        gap_ms in 0u64..100,
    ) {
        let changes: Vec<_> = events
            .into_iter()
            .enumerate()
            .map(|(i, (name, kind))| (i as u64 * gap_ms, name, kind))
            .collect();

        prop_assert_eq!(count_batches(&changes), 1);
    }

    /// PROPERTY: A never-ending stream of changes still releases a batch at
    /// least every `MAX_WAIT_MS`.
    #[test]
    fn property_continuous_stream_is_bounded_by_max_wait(
        gap_ms in 1u64..100,
        count in 50usize..200,
    ) {
        let start = Instant::now();
        let mut state = WatcherState::new(DEBOUNCE);
        let mut oldest: Option<u64> = None;

        for i in 0..count as u64 {
            let offset = i * gap_ms;
            let at = start + Duration::from_millis(offset);
            if state.should_build_at(at) {
                state.take_changes();
                oldest = None;
            }
            if let Some(first) = oldest {
                prop_assert!(offset - first < MAX_WAIT_MS + gap_ms);
            }
            state.add_change_at(PathBuf::from("gen.ts"), ChangeKind::Change, at);
            oldest.get_or_insert(offset);
        }
    }

    /// PROPERTY: A batch holds each path once, with its latest kind, sorted.
    #[test]
    fn property_batch_keeps_latest_kind_per_path(
        events in proptest::collection::vec((file_name(), kind()), 1..=24),
    ) {
        let now = Instant::now();
        let mut state = WatcherState::new(DEBOUNCE);
        for (name, kind) in &events {
            state.add_change_at(PathBuf::from(name), *kind, now);
        }

        let batch = state.take_changes();
        prop_assert!(!state.has_pending());
        prop_assert!(batch.windows(2).all(|w| w[0].0 < w[1].0));

        for (path, kind) in &batch {
            let latest = events
                .iter()
                .rev()
                .find(|(name, _)| PathBuf::from(name) == *path)
                .map(|(_, kind)| *kind);
            prop_assert_eq!(Some(*kind), latest);
        }
    }
}
