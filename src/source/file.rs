// src/source/file.rs

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tracing::debug;

use crate::checksum::ChecksumIndex;
use crate::config::SessionConfig;
use crate::errors::Result;
use crate::fsops;
use crate::queue::TaskQueue;
use crate::source::directory::lock_watcher;
use crate::source::{run_scan, ReadyCell, ScanFailure, SourceOptions};
use crate::types::EventSink;
use crate::watch::{spawn_file_watcher, WatcherHandle};

static SOURCE_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Session-unique directory name for a materialized source.
fn unique_dirname(id: &str) -> String {
    format!("{id}{}", SOURCE_SERIAL.fetch_add(1, Ordering::Relaxed))
}

/// Where a single-file source lives inside the build-scratch area.
#[derive(Debug, Clone)]
struct Materialized {
    dir: PathBuf,
    target: PathBuf,
}

/// A tracked source that is a single file rather than a directory.
///
/// The file is materialized — linked into a uniquely named scratch
/// directory under its own basename — so every downstream stage can treat
/// the source as a directory like any other.
#[derive(Debug)]
pub struct FileSource {
    file: PathBuf,
    uid: String,
    scratch_dir: PathBuf,
    static_source: bool,
    debounce: Duration,
    queue: TaskQueue,
    events: EventSink,
    materialized: Mutex<Option<Materialized>>,
    ready: ReadyCell,
    watcher: Mutex<Option<WatcherHandle>>,
}

impl FileSource {
    pub(crate) fn new(
        file: PathBuf,
        options: SourceOptions,
        config: &SessionConfig,
        queue: TaskQueue,
        events: EventSink,
    ) -> Self {
        let id = options.id.as_deref().unwrap_or("source");
        Self {
            file,
            uid: unique_dirname(id),
            scratch_dir: config.scratch_dir.clone(),
            static_source: options.static_source,
            debounce: config.debounce,
            queue,
            events,
            materialized: Mutex::new(None),
            ready: ReadyCell::new(),
            watcher: Mutex::new(None),
        }
    }

    /// Materialize (if needed) and fingerprint, once.
    ///
    /// Resolves to the materialized directory, which downstream code uses
    /// as this source's root.
    pub async fn ready(&self) -> Result<PathBuf> {
        let outcome = self
            .ready
            .get_or_init(|| async {
                let materialized = match self.materialize() {
                    Ok(m) => m,
                    Err(err) => return Err(ScanFailure::new(&self.file, &err)),
                };
                run_scan(&self.queue, &self.events, materialized.dir).await
            })
            .await;

        match outcome {
            Ok(scanned) => Ok(scanned.dir.clone()),
            Err(failure) => Err(failure.clone().into_error()),
        }
    }

    /// Begin watching the original file.
    ///
    /// No-op for static sources and when already watching. Materializes
    /// first so change events always have a target to re-link into.
    pub fn start_file_watcher(&self) -> Result<()> {
        if self.static_source {
            return Ok(());
        }

        let mut guard = lock_watcher(&self.watcher);
        if guard.is_some() {
            return Ok(());
        }

        let materialized = self.materialize()?;
        let handle = spawn_file_watcher(
            self.file.clone(),
            materialized.dir,
            materialized.target,
            self.debounce,
            self.events.clone(),
        )?;
        *guard = Some(handle);
        Ok(())
    }

    /// Close the watcher if present; safe when already inactive.
    pub fn stop_file_watcher(&self) {
        lock_watcher(&self.watcher).take();
    }

    pub fn is_watching(&self) -> bool {
        lock_watcher(&self.watcher).is_some()
    }

    pub fn checksum_index(&self) -> Option<&ChecksumIndex> {
        self.ready
            .get()
            .and_then(|outcome| outcome.as_ref().ok())
            .map(|scanned| &scanned.index)
    }

    /// The original file this source tracks.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Link the file into its scratch directory; at most once per source.
    fn materialize(&self) -> Result<Materialized> {
        let mut guard = self
            .materialized
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(materialized) = guard.as_ref() {
            return Ok(materialized.clone());
        }

        let dir = self.scratch_dir.join(&self.uid);
        std::fs::create_dir_all(&dir)?;

        let basename = self.file.file_name().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("source file {} has no basename", self.file.display()),
            )
        })?;
        let target = dir.join(basename);
        fsops::link_or_copy_sync(&self.file, &target)?;

        debug!(file = ?self.file, dir = ?dir, "materialized single-file source");

        let materialized = Materialized { dir, target };
        *guard = Some(materialized.clone());
        Ok(materialized)
    }
}
