mod common;

use std::collections::BTreeMap;

use proptest::prelude::*;
use tempfile::tempdir;

use treesync::merge_trees;
use treesync_test_utils::builders::{list_tree, read_tree_file, TreeBuilder};

fn file_map() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z]{1,6}", "[ -~]{0,32}", 1..6)
}

fn build_tree(root: std::path::PathBuf, files: &BTreeMap<String, String>) -> std::path::PathBuf {
    let mut builder = TreeBuilder::new(root);
    for (rel, contents) in files {
        builder = builder.file(rel, contents);
    }
    builder.build()
}

proptest! {
    // Each case touches the real filesystem; keep the count modest.
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Merging two flat trees yields their union, with the later merge
    /// winning wherever both trees carry the same name.
    #[test]
    fn merge_applies_later_sources_last(left in file_map(), right in file_map()) {
        common::init_tracing();

        let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
        rt.block_on(async {
            let tmp = tempdir().expect("tempdir");
            let left_root = build_tree(tmp.path().join("left"), &left);
            let right_root = build_tree(tmp.path().join("right"), &right);
            let dest = tmp.path().join("out");

            merge_trees(&left_root, &dest).await.expect("first merge");
            merge_trees(&right_root, &dest).await.expect("second merge");

            let mut expected = left.clone();
            expected.extend(right.clone());

            let listed = list_tree(&dest);
            prop_assert_eq!(listed.len(), expected.len());

            for (rel, contents) in &expected {
                prop_assert_eq!(&read_tree_file(&dest, rel), contents);
            }

            // Sources were never written through links.
            for (rel, contents) in &left {
                prop_assert_eq!(&read_tree_file(&left_root, rel), contents);
            }

            Ok(())
        })?;
    }
}
