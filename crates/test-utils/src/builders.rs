#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Builder that lays out a fixture tree on disk.
///
/// Relative paths use `/` separators; parent directories are created as
/// needed.
pub struct TreeBuilder {
    root: PathBuf,
}

impl TreeBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        std::fs::create_dir_all(&root).expect("creating fixture root");
        Self { root }
    }

    pub fn file(self, rel: &str, contents: &str) -> Self {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("creating fixture directory");
        }
        std::fs::write(&path, contents).expect("writing fixture file");
        self
    }

    pub fn build(self) -> PathBuf {
        self.root
    }
}

/// Sorted, root-relative paths of every file under `root`.
///
/// Directory symlinks are followed, so merged trees list the same way
/// whether their subtrees were linked or copied.
pub fn list_tree(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_files(root, root, &mut files);
    files.sort();
    files
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = std::fs::read_dir(dir).expect("reading fixture directory");
    for entry in entries {
        let path = entry.expect("reading fixture entry").path();
        let meta = std::fs::metadata(&path).expect("stat on fixture entry");
        if meta.is_dir() {
            collect_files(root, &path, out);
        } else {
            let rel = path
                .strip_prefix(root)
                .expect("entry under fixture root")
                .to_path_buf();
            out.push(rel);
        }
    }
}

/// Contents of `root`-relative file `rel`.
pub fn read_tree_file(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel)).expect("reading tree file")
}
