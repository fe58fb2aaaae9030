// src/config/mod.rs

//! Session configuration.
//!
//! A [`SessionConfig`] carries everything the synchronization layer needs
//! from its surroundings: where the build-scratch area lives, how long the
//! watcher's debounce window is, and how wide the scan queue is. It is
//! passed in explicitly at construction — nothing in this crate reads
//! ambient or global state, so tests can use isolated scratch roots.

use std::path::PathBuf;
use std::time::Duration;

pub mod loader;

pub use loader::{load_and_validate, load_from_path};

/// Quiescence window for the change-event debouncer.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// How many checksum scans may run concurrently by default.
pub const DEFAULT_QUEUE_WIDTH: usize = 1;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Build-owned scratch directory. Single-file sources are materialized
    /// into uniquely named subdirectories of this path.
    pub scratch_dir: PathBuf,
    /// Debounce window for watcher events.
    pub debounce: Duration,
    /// Permit count for the scan queue.
    pub queue_width: usize,
}

impl SessionConfig {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            debounce: DEFAULT_DEBOUNCE,
            queue_width: DEFAULT_QUEUE_WIDTH,
        }
    }

    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }

    pub fn with_queue_width(mut self, width: usize) -> Self {
        self.queue_width = width;
        self
    }
}
