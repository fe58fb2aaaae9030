// src/watch/path_utils.rs

//! Path handling for watcher events.

use std::path::{Path, PathBuf};

/// Relate an event path to the tracked root.
///
/// - First try a direct `strip_prefix(root)`.
/// - If that fails (symlinks, differing absolute prefixes — notably
///   `/private/var` vs `/var` on macOS), canonicalize both sides and try
///   again.
///
/// Returns `None` if the path cannot reasonably be related to `root`.
pub fn relative_path(root: &Path, path: &Path) -> Option<PathBuf> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_path_buf());
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(rel.to_path_buf());
        }
    }

    None
}
