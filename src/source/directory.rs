// src/source/directory.rs

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::checksum::ChecksumIndex;
use crate::config::SessionConfig;
use crate::errors::Result;
use crate::queue::TaskQueue;
use crate::source::{run_scan, ReadyCell, SourceOptions};
use crate::types::EventSink;
use crate::watch::{spawn_directory_watcher, WatcherHandle};

/// A tracked source rooted at a directory.
#[derive(Debug)]
pub struct DirectorySource {
    dir: PathBuf,
    static_source: bool,
    debounce: Duration,
    queue: TaskQueue,
    events: EventSink,
    ready: ReadyCell,
    watcher: Mutex<Option<WatcherHandle>>,
}

impl DirectorySource {
    pub(crate) fn new(
        dir: PathBuf,
        options: SourceOptions,
        config: &SessionConfig,
        queue: TaskQueue,
        events: EventSink,
    ) -> Self {
        Self {
            dir,
            static_source: options.static_source,
            debounce: config.debounce,
            queue,
            events,
            ready: ReadyCell::new(),
            watcher: Mutex::new(None),
        }
    }

    /// Fingerprint the directory, once.
    ///
    /// The first call starts the scan (queued on the task queue); every
    /// call — concurrent or later — resolves or rejects with that single
    /// scan's outcome. The tree is never scanned twice.
    pub async fn ready(&self) -> Result<PathBuf> {
        let outcome = self
            .ready
            .get_or_init(|| run_scan(&self.queue, &self.events, self.dir.clone()))
            .await;

        match outcome {
            Ok(scanned) => Ok(scanned.dir.clone()),
            Err(failure) => Err(failure.clone().into_error()),
        }
    }

    /// Begin watching the directory recursively.
    ///
    /// No-op for static sources and when already watching.
    pub fn start_file_watcher(&self) -> Result<()> {
        if self.static_source {
            return Ok(());
        }

        let mut guard = lock_watcher(&self.watcher);
        if guard.is_some() {
            return Ok(());
        }

        let handle =
            spawn_directory_watcher(self.dir.clone(), self.debounce, self.events.clone())?;
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

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

pub(crate) fn lock_watcher(
    watcher: &Mutex<Option<WatcherHandle>>,
) -> std::sync::MutexGuard<'_, Option<WatcherHandle>> {
    watcher.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
