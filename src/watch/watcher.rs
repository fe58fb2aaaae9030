// src/watch/watcher.rs

use std::path::PathBuf;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::errors::Result;
use crate::fsops;
use crate::types::{ChangeKind, EventSink};
use crate::watch::debounce::{spawn_debouncer, RawWatch};

/// Handle for a live watch session.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle stops file watching and tears
/// down the aggregation task.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    aggregator: JoinHandle<()>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.aggregator.abort();
    }
}

/// Watch a directory source recursively.
///
/// Raw add/change/remove events are forwarded verbatim into the debouncer;
/// flushed batches arrive as `Invalidate` notifications on `events`, with
/// paths relative to `root`.
pub fn spawn_directory_watcher(
    root: PathBuf,
    window: Duration,
    events: EventSink,
) -> Result<WatcherHandle> {
    let (raw_tx, raw_rx) = mpsc::unbounded_channel::<RawWatch>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let Some(kind) = change_kind(&event.kind) else {
                    return;
                };
                for path in event.paths {
                    let _ = raw_tx.send(RawWatch::Change { path, kind });
                }
            }
            Err(err) => {
                // We can't log via tracing here easily, so fallback to stderr.
                eprintln!("treesync: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!(root = ?root, "file watcher started");

    let aggregator = spawn_debouncer(root, window, raw_rx, events);

    Ok(WatcherHandle {
        _inner: watcher,
        aggregator,
    })
}

/// Watch a single-file source.
///
/// The watcher observes the *original* file. On add/change the file is
/// re-linked into `target` (inside the materialized directory) before a
/// synthetic event against the materialized path is queued, so downstream
/// consumers always see the materialized copy reflect the live source. On
/// removal the materialized copy is deleted and a removal event queued.
/// A re-link failure is fatal to the watch session.
pub fn spawn_file_watcher(
    file: PathBuf,
    materialized_dir: PathBuf,
    target: PathBuf,
    window: Duration,
    events: EventSink,
) -> Result<WatcherHandle> {
    let (raw_tx, raw_rx) = mpsc::unbounded_channel::<RawWatch>();

    let callback_file = file.clone();
    let callback_target = target;

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => match change_kind(&event.kind) {
                Some(kind @ (ChangeKind::Added | ChangeKind::Changed)) => {
                    if let Err(err) = fsops::relink_sync(&callback_file, &callback_target) {
                        let _ = raw_tx.send(RawWatch::Fatal {
                            path: callback_file.clone(),
                            message: err.to_string(),
                        });
                        return;
                    }
                    let _ = raw_tx.send(RawWatch::Change {
                        path: callback_target.clone(),
                        kind,
                    });
                }
                Some(ChangeKind::Removed) => {
                    let _ = raw_tx.send(RawWatch::Change {
                        path: callback_target.clone(),
                        kind: ChangeKind::Removed,
                    });
                    match std::fs::remove_file(&callback_target) {
                        Ok(()) => {}
                        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                        Err(err) => {
                            let _ = raw_tx.send(RawWatch::Fatal {
                                path: callback_target.clone(),
                                message: err.to_string(),
                            });
                        }
                    }
                }
                None => {}
            },
            Err(err) => {
                eprintln!("treesync: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&file, RecursiveMode::NonRecursive)?;
    info!(file = ?file, "single-file watcher started");

    let aggregator = spawn_debouncer(materialized_dir, window, raw_rx, events);

    Ok(WatcherHandle {
        _inner: watcher,
        aggregator,
    })
}

fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Added),
        EventKind::Modify(_) => Some(ChangeKind::Changed),
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        _ => None,
    }
}
