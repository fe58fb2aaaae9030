mod common;

use crate::common::init_tracing;

use std::error::Error;
use std::path::PathBuf;

use tempfile::tempdir;

use treesync::merge_trees;
use treesync_test_utils::builders::{list_tree, read_tree_file, TreeBuilder};

type TestResult = Result<(), Box<dyn Error>>;

fn paths(rels: &[&str]) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = rels.iter().map(PathBuf::from).collect();
    out.sort();
    out
}

#[tokio::test]
async fn merge_is_additive_across_disjoint_trees() -> TestResult {
    init_tracing();

    let tmp = tempdir()?;
    let left = TreeBuilder::new(tmp.path().join("left"))
        .file("a/x.md", "x")
        .build();
    let right = TreeBuilder::new(tmp.path().join("right"))
        .file("b/y.md", "y")
        .build();
    let dest = tmp.path().join("out");

    merge_trees(&left, &dest).await?;
    merge_trees(&right, &dest).await?;

    assert_eq!(list_tree(&dest), paths(&["a/x.md", "b/y.md"]));

    Ok(())
}

#[tokio::test]
async fn merge_overwrites_conflicting_file() -> TestResult {
    init_tracing();

    let tmp = tempdir()?;
    let first = TreeBuilder::new(tmp.path().join("first"))
        .file("foo.md", "1")
        .build();
    let second = TreeBuilder::new(tmp.path().join("second"))
        .file("foo.md", "2")
        .build();
    let dest = tmp.path().join("out");

    merge_trees(&first, &dest).await?;
    merge_trees(&second, &dest).await?;

    assert_eq!(read_tree_file(&dest, "foo.md"), "2");
    // Overwriting the destination must not reach back through any link into
    // the earlier source.
    assert_eq!(read_tree_file(&first, "foo.md"), "1");

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn symlinked_destination_is_repaired_before_merging() -> TestResult {
    init_tracing();

    let tmp = tempdir()?;
    let original = TreeBuilder::new(tmp.path().join("original"))
        .file("p.md", "p")
        .file("q.md", "q")
        .build();
    let source = TreeBuilder::new(tmp.path().join("source"))
        .file("r.md", "r")
        .build();

    let dest = tmp.path().join("out");
    std::os::unix::fs::symlink(&original, &dest)?;

    merge_trees(&source, &dest).await?;

    // The destination is now a real directory holding the union.
    let meta = std::fs::symlink_metadata(&dest)?;
    assert!(!meta.file_type().is_symlink());
    assert!(meta.is_dir());
    assert_eq!(list_tree(&dest), paths(&["p.md", "q.md", "r.md"]));

    // The symlink's old target was only read, never written.
    assert_eq!(list_tree(&original), paths(&["p.md", "q.md"]));
    assert_eq!(read_tree_file(&original, "p.md"), "p");
    assert_eq!(read_tree_file(&original, "q.md"), "q");

    Ok(())
}

#[tokio::test]
async fn merge_unions_nested_directories() -> TestResult {
    init_tracing();

    let tmp = tempdir()?;
    let foo = TreeBuilder::new(tmp.path().join("foo"))
        .file("foo.md", "foo")
        .file("bar.md", "bar")
        .file("dir/a.md", "a")
        .build();
    let bar = TreeBuilder::new(tmp.path().join("bar"))
        .file("baz.md", "baz")
        .file("dir/b.md", "b")
        .build();
    let dest = tmp.path().join("out");

    merge_trees(&foo, &dest).await?;
    merge_trees(&bar, &dest).await?;

    assert_eq!(
        list_tree(&dest),
        paths(&["bar.md", "baz.md", "dir/a.md", "dir/b.md", "foo.md"])
    );

    // Directories union: merging bar/dir did not evict foo's dir/a.md, and
    // foo's own dir/ still holds only its original file.
    assert_eq!(read_tree_file(&dest, "dir/a.md"), "a");
    assert_eq!(read_tree_file(&dest, "dir/b.md"), "b");
    assert_eq!(list_tree(&foo.join("dir")), paths(&["a.md"]));

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn missing_destination_links_subtree_wholesale() -> TestResult {
    init_tracing();

    let tmp = tempdir()?;
    let source = TreeBuilder::new(tmp.path().join("source"))
        .file("deep/tree/file.md", "contents")
        .build();
    let dest = tmp.path().join("out");

    merge_trees(&source, &dest).await?;

    // An untouched subtree is linked, not copied.
    let meta = std::fs::symlink_metadata(&dest)?;
    assert!(meta.file_type().is_symlink());
    assert_eq!(read_tree_file(&dest, "deep/tree/file.md"), "contents");

    Ok(())
}

#[tokio::test]
async fn merge_accepts_single_files() -> TestResult {
    init_tracing();

    let tmp = tempdir()?;
    let file = tmp.path().join("single.md");
    std::fs::write(&file, "just me")?;

    let dest_dir = TreeBuilder::new(tmp.path().join("out")).build();
    let dest = dest_dir.join("single.md");

    merge_trees(&file, &dest).await?;
    assert_eq!(read_tree_file(&dest_dir, "single.md"), "just me");

    Ok(())
}
