// src/fsops/merge.rs

//! One-way recursive union of a source tree into a destination tree.

use std::path::{Path, PathBuf};

use async_recursion::async_recursion;
use tokio::task::JoinSet;
use tracing::debug;

use crate::errors::Result;
use crate::fsops;

/// Merge `source` (file or directory) into `dest`.
///
/// The destination is mutated; the source is only read. Links are preferred
/// over copies, so merging disjoint trees is cheap: an untouched subtree is
/// linked wholesale instead of being recursed into. When the same relative
/// path exists in both trees, the merge being applied wins, file by file —
/// directories are unioned, never replaced wholesale.
///
/// Not transactional: an error aborts the affected subtree and propagates,
/// leaving whatever was already merged in place.
pub async fn merge_trees(source: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    merge_entry(
        source.as_ref().to_path_buf(),
        dest.as_ref().to_path_buf(),
    )
    .await
}

#[async_recursion]
async fn merge_entry(source: PathBuf, dest: PathBuf) -> Result<()> {
    let dest_meta = match tokio::fs::metadata(&dest).await {
        Ok(meta) => meta,
        // Doesn't exist: the whole source subtree can be linked in directly.
        Err(_) => return fsops::symlink_or_copy(&source, &dest).await,
    };

    if !dest_meta.is_dir() {
        // Exists and is a file: the source being merged wins.
        tokio::fs::remove_file(&dest).await?;
        return fsops::symlink_or_copy(&source, &dest).await;
    }

    // If it's a symlinked dir, it must become a real dir first. Suppose
    // linked-foo/ is a symlink of foo/, and we merge the contents of bar/
    // into linked-foo/ — those files would end up in foo/, mutating a tree
    // we do not own.
    let link_meta = tokio::fs::symlink_metadata(&dest).await?;
    if link_meta.file_type().is_symlink() {
        convert_to_real_dir(&dest)?;
    }

    let mut entries = tokio::fs::read_dir(&source).await?;
    let mut children = JoinSet::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        children.spawn(merge_entry(source.join(&name), dest.join(&name)));
    }

    // Siblings may finish in any order; the parent completes after all of
    // them.
    while let Some(joined) = children.join_next().await {
        joined.map_err(std::io::Error::other)??;
    }

    Ok(())
}

/// Replace a symlinked directory with a real directory holding links to
/// every entry of the original target.
///
/// Kept synchronous: conversion is rare and must complete atomically
/// relative to any concurrent merge into the same path.
fn convert_to_real_dir(dest: &Path) -> Result<()> {
    let original = std::fs::canonicalize(dest)?;
    debug!(dest = ?dest, original = ?original, "converting symlinked directory to real directory");

    std::fs::remove_file(dest)?;
    std::fs::create_dir(dest)?;

    for entry in std::fs::read_dir(&original)? {
        let name = entry?.file_name();
        fsops::symlink_or_copy_sync(&original.join(&name), &dest.join(&name))?;
    }

    Ok(())
}
