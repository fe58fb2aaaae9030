// src/watch/debounce.rs

//! Time-windowed aggregation of raw watcher events.
//!
//! Filesystem watchers emit bursts: editors write via temp-file-then-rename,
//! several files get saved together. Events are therefore buffered while
//! they keep arriving within the quiescence window and flushed as a single
//! `Invalidate` batch once the window elapses with no new event. The buffer
//! is an explicit timer-armed accumulator so ordering and duplicate
//! preservation stay easy to reason about: the batch keeps arrival order
//! and repeated entries for the same path are NOT deduplicated.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, warn};

use crate::types::{ChangeEvent, ChangeKind, EventSink, SourceEvent};
use crate::watch::path_utils::relative_path;

/// Raw input to the debouncer, straight from the watcher callback.
#[derive(Debug, Clone)]
pub enum RawWatch {
    /// Something happened to `path` (absolute).
    Change { path: PathBuf, kind: ChangeKind },
    /// The watch session hit an unrecoverable error; the loop terminates
    /// after flushing whatever is buffered.
    Fatal { path: PathBuf, message: String },
}

/// Spawn the aggregation loop.
///
/// Paths in flushed batches are relative to `root`. The loop ends when the
/// sender side is dropped or a [`RawWatch::Fatal`] arrives.
pub fn spawn_debouncer(
    root: PathBuf,
    window: Duration,
    mut rx: mpsc::UnboundedReceiver<RawWatch>,
    events: EventSink,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        'session: loop {
            let first = match rx.recv().await {
                Some(raw) => raw,
                None => break,
            };

            let mut batch: Vec<ChangeEvent> = Vec::new();
            if let Some(fatal) = absorb(&root, first, &mut batch) {
                flush(&mut batch, &events);
                fail(fatal, &events);
                break;
            }

            loop {
                match timeout(window, rx.recv()).await {
                    Ok(Some(raw)) => {
                        if let Some(fatal) = absorb(&root, raw, &mut batch) {
                            flush(&mut batch, &events);
                            fail(fatal, &events);
                            break 'session;
                        }
                    }
                    Ok(None) => {
                        flush(&mut batch, &events);
                        break 'session;
                    }
                    // Quiescent: nothing arrived for a full window.
                    Err(_) => break,
                }
            }

            flush(&mut batch, &events);
        }

        debug!("change aggregation loop finished");
    })
}

/// Fold one raw event into the batch. Returns the event back if it was
/// fatal.
fn absorb(root: &Path, raw: RawWatch, batch: &mut Vec<ChangeEvent>) -> Option<RawWatch> {
    match raw {
        RawWatch::Change { path, kind } => {
            match relative_path(root, &path) {
                Some(rel) => batch.push(ChangeEvent { path: rel, kind }),
                None => {
                    warn!(path = ?path, root = ?root, "could not relativize event path, dropping");
                }
            }
            None
        }
        fatal @ RawWatch::Fatal { .. } => Some(fatal),
    }
}

fn flush(batch: &mut Vec<ChangeEvent>, events: &EventSink) {
    if batch.is_empty() {
        return;
    }
    let changes = std::mem::take(batch);
    debug!(count = changes.len(), "flushing debounced change batch");
    events.emit(SourceEvent::Invalidate { changes });
}

fn fail(fatal: RawWatch, events: &EventSink) {
    if let RawWatch::Fatal { path, message } = fatal {
        error!(path = ?path, message = %message, "watch session failed");
        events.emit(SourceEvent::WatchFailed { path, message });
    }
}
