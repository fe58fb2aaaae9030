// src/watch/mod.rs

//! File watching and change aggregation.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`) per tracked
//!   source.
//! - Debouncing raw event bursts into coarse-grained `Invalidate` batches
//!   that keep arrival order and duplicates.
//! - Keeping a single-file source's materialized copy in sync with the
//!   original file.
//!
//! It does **not** know about the pipeline graph; it only turns filesystem
//! changes into per-source notifications.

pub mod debounce;
pub mod path_utils;
pub mod watcher;

pub use debounce::{spawn_debouncer, RawWatch};
pub use watcher::{spawn_directory_watcher, spawn_file_watcher, WatcherHandle};
