// src/checksum.rs

//! Content fingerprinting for tracked sources.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use blake3::Hasher;
use tracing::debug;

use crate::errors::Result;

/// Compute the content checksum of a single file.
pub fn compute_file_checksum(path: &Path) -> std::io::Result<String> {
    let mut hasher = Hasher::new();
    let mut file = File::open(path)?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Point-in-time fingerprint of every regular file under a root.
///
/// The index is built exactly once per ready cycle and never updated
/// incrementally; watcher batches describe deltas, the index stays a
/// snapshot. The reverse (checksum → file) view is best-effort: if two
/// files ever carried the same checksum, the last one scanned wins.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ChecksumIndex {
    by_file: HashMap<PathBuf, String>,
    by_checksum: HashMap<String, PathBuf>,
}

impl ChecksumIndex {
    /// Scan `root` recursively and fingerprint every regular file.
    ///
    /// Symlinks are followed, both for traversal and for content. Any
    /// unreadable file aborts the whole build; partial indices are never
    /// returned.
    pub async fn build(root: &Path) -> Result<Self> {
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || Self::build_sync(&root))
            .await
            .map_err(|err| std::io::Error::other(err))?
    }

    fn build_sync(root: &Path) -> Result<Self> {
        let mut index = Self::default();
        index.scan_dir(root)?;
        debug!(root = ?root, files = index.len(), "checksum index built");
        Ok(index)
    }

    fn scan_dir(&mut self, dir: &Path) -> Result<()> {
        let mut entries: Vec<PathBuf> = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            entries.push(entry?.path());
        }
        // Sorted for a deterministic scan order; the result is still an
        // unordered mapping as far as callers are concerned.
        entries.sort();

        for path in entries {
            let meta = std::fs::metadata(&path)?;
            if meta.is_dir() {
                self.scan_dir(&path)?;
            } else if meta.is_file() {
                let checksum = compute_file_checksum(&path)?;
                self.by_checksum.insert(checksum.clone(), path.clone());
                self.by_file.insert(path, checksum);
            }
        }
        Ok(())
    }

    /// Checksum recorded for an absolute file path.
    pub fn checksum_for(&self, path: &Path) -> Option<&str> {
        self.by_file.get(path).map(String::as_str)
    }

    /// Reverse lookup. Best-effort only; never identity-critical.
    pub fn file_for(&self, checksum: &str) -> Option<&Path> {
        self.by_checksum.get(checksum).map(PathBuf::as_path)
    }

    /// Absolute paths of every indexed file.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.by_file.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.by_file.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_file.is_empty()
    }
}
