//! Property tests for watch-set scoping.

use proptest::prelude::*;
use tempfile::TempDir;

use watch_rebuild::watcher::PathFilter;

fn segment() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9_-]{0,7}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Paths under a root are accepted; paths beside it never are.
    #[test]
    fn property_scoping_follows_roots(
        inside in proptest::collection::vec(segment(), 1..=4),
        outside in proptest::collection::vec(segment(), 1..=4),
    ) {
        let project = TempDir::new().unwrap();
        let pages = project.path().join("src/pages");
        let dist = project.path().join("dist");
        std::fs::create_dir_all(&pages).unwrap();
        std::fs::create_dir_all(&dist).unwrap();

        let filter = PathFilter::new(&[pages.clone()], &[]).unwrap();
        let root = filter.roots()[0].clone();

        let mut accepted = root.clone();
        for s in &inside {
            accepted.push(s);
        }
        accepted.set_extension("ts");

        let mut rejected = dist.canonicalize().unwrap();
        for s in &outside {
            rejected.push(s);
        }

        prop_assert!(filter.accepts(&accepted));
        prop_assert!(!filter.accepts(&rejected));
        prop_assert!(!filter.accepts(&root));
    }

    /// PROPERTY: Compiling arbitrary pattern text never panics.
    #[test]
    fn property_ignore_patterns_never_panic(
        patterns in proptest::collection::vec("(?s).{0,24}", 0..=6),
    ) {
        let project = TempDir::new().unwrap();
        let _ = PathFilter::new(&[project.path().to_path_buf()], &patterns);
    }
}
