// src/errors.rs

//! Crate-wide error taxonomy and `Result` alias.
//!
//! `SyncError` is the structured, user-facing error type for the crate. Each
//! variant exposes a stable [`code`](SyncError::code) string that other layers
//! may pattern-match on (`"MISSING_DIRECTORY"` is the documented contract) and
//! an optional [`path`](SyncError::path) it refers to. Lower-level filesystem
//! errors are preserved with their original diagnostic via the `Io` variant.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Structured crate error: `{ code, path, message }`.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A configuration value was missing or invalid. `code() == "CONFIG"`.
    #[error("{0}")]
    Config(String),

    /// The source root does not exist. `code() == "MISSING_DIRECTORY"`.
    #[error("missing directory: {path}")]
    MissingDirectory { path: PathBuf },

    /// A memoized checksum scan failure, replayed with the original
    /// diagnostic text. `code() == "SCAN_FAILED"`.
    #[error("scan failed for {dir}: {message}")]
    ScanFailed { dir: PathBuf, message: String },

    /// An underlying I/O error, kept with its original diagnostic.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A TOML deserialization error.
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// An error building an HTTP response.
    #[error(transparent)]
    Http(#[from] axum::http::Error),

    /// An error from the filesystem watcher.
    #[error(transparent)]
    Watch(#[from] notify::Error),
}

impl SyncError {
    /// Stable, machine-readable code for this error category.
    pub fn code(&self) -> &'static str {
        match self {
            SyncError::Config(_) => "CONFIG",
            SyncError::MissingDirectory { .. } => "MISSING_DIRECTORY",
            SyncError::ScanFailed { .. } => "SCAN_FAILED",
            SyncError::Io(_) => "IO",
            SyncError::Toml(_) => "TOML",
            SyncError::Http(_) => "HTTP",
            SyncError::Watch(_) => "WATCH",
        }
    }

    /// The path this error refers to, when it carries one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            SyncError::MissingDirectory { path } => Some(path),
            SyncError::ScanFailed { dir, .. } => Some(dir),
            _ => None,
        }
    }
}

/// Crate-wide `Result` specialized to [`SyncError`].
pub type Result<T> = std::result::Result<T, SyncError>;
