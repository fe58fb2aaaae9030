// src/source/mod.rs

//! Tracked build inputs.
//!
//! A tracked source is a directory or a single file that the pipeline
//! fingerprints once (the "ready" cycle) and can then watch for incremental
//! changes. The two shapes are distinct variants with a shared surface:
//! `ready`, `start_file_watcher`, `stop_file_watcher`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use crate::checksum::ChecksumIndex;
use crate::config::SessionConfig;
use crate::errors::{Result, SyncError};
use crate::queue::TaskQueue;
use crate::types::{EventSink, SourceEvent};

pub mod directory;
pub mod file;

pub use directory::DirectorySource;
pub use file::FileSource;

/// Per-source construction options.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// Stable identifier used to namespace a file source's materialized
    /// directory. Defaults to `"source"`.
    pub id: Option<String>,
    /// A static source never watches; `start_file_watcher` is a no-op.
    pub static_source: bool,
}

/// A build input rooted at a directory or a single file.
#[derive(Debug)]
pub enum TrackedSource {
    Directory(DirectorySource),
    File(FileSource),
}

impl TrackedSource {
    /// Validate `root` and pick the matching variant.
    ///
    /// The existence check is synchronous on purpose: a misconfigured
    /// source must surface at graph-construction time, not on first use.
    /// A missing root fails with `MISSING_DIRECTORY`; any other stat error
    /// is passed through unchanged.
    pub fn new(
        root: impl Into<PathBuf>,
        options: SourceOptions,
        config: &SessionConfig,
        queue: TaskQueue,
        events: EventSink,
    ) -> Result<Self> {
        let root = std::path::absolute(root.into())?;

        let meta = match std::fs::metadata(&root) {
            Ok(meta) => meta,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(SyncError::MissingDirectory { path: root });
            }
            Err(err) => return Err(err.into()),
        };

        if meta.is_dir() {
            Ok(TrackedSource::Directory(DirectorySource::new(
                root, options, config, queue, events,
            )))
        } else {
            Ok(TrackedSource::File(FileSource::new(
                root, options, config, queue, events,
            )))
        }
    }

    /// Resolve once the source is fingerprinted; returns the root directory
    /// downstream nodes should read from.
    pub async fn ready(&self) -> Result<PathBuf> {
        match self {
            TrackedSource::Directory(source) => source.ready().await,
            TrackedSource::File(source) => source.ready().await,
        }
    }

    pub fn start_file_watcher(&self) -> Result<()> {
        match self {
            TrackedSource::Directory(source) => source.start_file_watcher(),
            TrackedSource::File(source) => source.start_file_watcher(),
        }
    }

    pub fn stop_file_watcher(&self) {
        match self {
            TrackedSource::Directory(source) => source.stop_file_watcher(),
            TrackedSource::File(source) => source.stop_file_watcher(),
        }
    }

    /// The index computed by the last completed ready cycle, if any.
    pub fn checksum_index(&self) -> Option<&ChecksumIndex> {
        match self {
            TrackedSource::Directory(source) => source.checksum_index(),
            TrackedSource::File(source) => source.checksum_index(),
        }
    }

    pub fn is_watching(&self) -> bool {
        match self {
            TrackedSource::Directory(source) => source.is_watching(),
            TrackedSource::File(source) => source.is_watching(),
        }
    }

    pub fn is_file_source(&self) -> bool {
        matches!(self, TrackedSource::File(_))
    }

    /// The configured root: the directory itself, or the original file.
    pub fn root(&self) -> &Path {
        match self {
            TrackedSource::Directory(source) => source.dir(),
            TrackedSource::File(source) => source.file(),
        }
    }
}

/// Result of a completed checksum scan.
#[derive(Debug)]
pub(crate) struct ScanOutcome {
    pub dir: PathBuf,
    pub index: ChecksumIndex,
}

/// Memoized scan failure.
///
/// The underlying `io::Error` is not cloneable, so the original diagnostic
/// is captured as text and replayed to every later `ready()` caller.
#[derive(Debug, Clone)]
pub(crate) struct ScanFailure {
    dir: PathBuf,
    message: String,
}

impl ScanFailure {
    pub(crate) fn new(dir: &Path, err: &SyncError) -> Self {
        Self {
            dir: dir.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub(crate) fn into_error(self) -> SyncError {
        SyncError::ScanFailed {
            dir: self.dir,
            message: self.message,
        }
    }
}

pub(crate) type ReadyCell = tokio::sync::OnceCell<std::result::Result<ScanOutcome, ScanFailure>>;

/// Enqueue a checksum scan of `dir` and report its lifecycle.
///
/// The start/complete notifications are advisory; they never affect
/// control flow.
pub(crate) async fn run_scan(
    queue: &TaskQueue,
    events: &EventSink,
    dir: PathBuf,
) -> std::result::Result<ScanOutcome, ScanFailure> {
    let events = events.clone();
    queue
        .run(async move {
            let started = Instant::now();
            events.emit(SourceEvent::ChecksumStart { dir: dir.clone() });

            match ChecksumIndex::build(&dir).await {
                Ok(index) => {
                    let duration = started.elapsed();
                    events.emit(SourceEvent::ChecksumComplete {
                        dir: dir.clone(),
                        duration,
                    });
                    info!(dir = ?dir, files = index.len(), ?duration, "checksum scan complete");
                    Ok(ScanOutcome { dir, index })
                }
                Err(err) => Err(ScanFailure::new(&dir, &err)),
            }
        })
        .await
}
