// src/fsops/mod.rs

//! Low-level linking helpers shared by materialization and tree merge.
//!
//! The policy everywhere is "cheapest thing that works": symlink or hard
//! link first, byte copy only when linking is unavailable on the target
//! filesystem. Both async and sync variants exist because directory-identity
//! repair (see [`merge`]) is deliberately synchronous.

use std::path::Path;

use async_recursion::async_recursion;
use tracing::debug;

use crate::errors::Result;

pub mod merge;

/// Symlink `src` at `dest`, falling back to a real copy.
///
/// `src` is absolutized first so the link stays valid regardless of the
/// process working directory.
pub async fn symlink_or_copy(src: &Path, dest: &Path) -> Result<()> {
    let src = std::path::absolute(src)?;

    #[cfg(unix)]
    {
        match tokio::fs::symlink(&src, dest).await {
            Ok(()) => return Ok(()),
            Err(err) => {
                debug!(src = ?src, dest = ?dest, error = %err, "symlink failed, copying instead");
            }
        }
    }

    copy_any(&src, dest).await
}

/// Synchronous twin of [`symlink_or_copy`].
pub fn symlink_or_copy_sync(src: &Path, dest: &Path) -> Result<()> {
    let src = std::path::absolute(src)?;

    #[cfg(unix)]
    {
        match std::os::unix::fs::symlink(&src, dest) {
            Ok(()) => return Ok(()),
            Err(err) => {
                debug!(src = ?src, dest = ?dest, error = %err, "symlink failed, copying instead");
            }
        }
    }

    copy_any_sync(&src, dest)
}

/// Hard-link a regular file, falling back to a copy.
pub fn link_or_copy_sync(src: &Path, dest: &Path) -> Result<()> {
    if std::fs::hard_link(src, dest).is_err() {
        std::fs::copy(src, dest)?;
    }
    Ok(())
}

/// Replace `dest` with a fresh link to `src`.
///
/// Used when a watched single-file source changes: editors that write via
/// temp-file-then-rename leave any previous hard link pointing at stale
/// content, so the link is dropped and re-made.
pub fn relink_sync(src: &Path, dest: &Path) -> Result<()> {
    match std::fs::remove_file(dest) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }
    link_or_copy_sync(src, dest)
}

async fn copy_any(src: &Path, dest: &Path) -> Result<()> {
    let meta = tokio::fs::metadata(src).await?;
    if meta.is_dir() {
        copy_dir_recursive(src.to_path_buf(), dest.to_path_buf()).await
    } else {
        tokio::fs::copy(src, dest).await?;
        Ok(())
    }
}

#[async_recursion]
async fn copy_dir_recursive(src: std::path::PathBuf, dest: std::path::PathBuf) -> Result<()> {
    tokio::fs::create_dir_all(&dest).await?;
    let mut entries = tokio::fs::read_dir(&src).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let from = src.join(&name);
        let to = dest.join(&name);
        if tokio::fs::metadata(&from).await?.is_dir() {
            copy_dir_recursive(from, to).await?;
        } else {
            tokio::fs::copy(&from, &to).await?;
        }
    }
    Ok(())
}

fn copy_any_sync(src: &Path, dest: &Path) -> Result<()> {
    if std::fs::metadata(src)?.is_dir() {
        copy_dir_recursive_sync(src, dest)
    } else {
        std::fs::copy(src, dest)?;
        Ok(())
    }
}

fn copy_dir_recursive_sync(src: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let from = src.join(entry.file_name());
        let to = dest.join(entry.file_name());
        if std::fs::metadata(&from)?.is_dir() {
            copy_dir_recursive_sync(&from, &to)?;
        } else {
            std::fs::copy(&from, &to)?;
        }
    }
    Ok(())
}
