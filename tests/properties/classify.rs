//! Property tests for notify event classification.

use std::path::PathBuf;

use notify::event::{
    AccessKind, CreateKind, DataChange, EventKind, MetadataKind, ModifyKind, RemoveKind,
    RenameMode,
};
use proptest::prelude::*;

use watch_rebuild::watcher::{classify, ChangeKind};

fn event_kind() -> impl Strategy<Value = EventKind> {
    prop_oneof![
        Just(EventKind::Any),
        Just(EventKind::Other),
        Just(EventKind::Access(AccessKind::Any)),
        Just(EventKind::Create(CreateKind::File)),
        Just(EventKind::Create(CreateKind::Folder)),
        Just(EventKind::Modify(ModifyKind::Data(DataChange::Content))),
        Just(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any))),
        Just(EventKind::Modify(ModifyKind::Name(RenameMode::From))),
        Just(EventKind::Modify(ModifyKind::Name(RenameMode::To))),
        Just(EventKind::Modify(ModifyKind::Name(RenameMode::Both))),
        Just(EventKind::Modify(ModifyKind::Name(RenameMode::Any))),
        Just(EventKind::Remove(RemoveKind::File)),
    ]
}

fn paths() -> impl Strategy<Value = Vec<PathBuf>> {
    proptest::collection::vec(
        proptest::string::string_regex("/nonexistent/[a-z]{1,6}/[a-z]{1,6}\\.ts")
            .unwrap()
            .prop_map(PathBuf::from),
        0..=4,
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Classification never panics and only reports paths from the event.
    #[test]
    fn property_classify_reports_only_event_paths(kind in event_kind(), paths in paths()) {
        let changes = classify(&kind, &paths);

        prop_assert!(changes.len() <= paths.len());
        for (path, _) in &changes {
            prop_assert!(paths.contains(path));
        }
    }

    /// PROPERTY: Access and metadata-only events never qualify.
    #[test]
    fn property_non_content_events_are_dropped(paths in paths()) {
        prop_assert!(classify(&EventKind::Access(AccessKind::Any), &paths).is_empty());
        prop_assert!(
            classify(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)), &paths)
                .is_empty()
        );
    }

    /// PROPERTY: A path that no longer exists is never reported as added or changed
    /// by an ambiguous event.
    #[test]
    fn property_missing_paths_resolve_to_unlink(paths in paths()) {
        for kind in [EventKind::Any, EventKind::Modify(ModifyKind::Any)] {
            for (_, change) in classify(&kind, &paths) {
                prop_assert_eq!(change, ChangeKind::Unlink);
            }
        }
    }
}
