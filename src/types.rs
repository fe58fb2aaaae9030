use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;

/// What happened to a watched path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Changed,
    Removed,
}

/// A single filesystem change, with `path` relative to the tracked root
/// (for a file source, relative to its materialized directory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn added(&self) -> bool {
        self.kind == ChangeKind::Added
    }

    pub fn changed(&self) -> bool {
        self.kind == ChangeKind::Changed
    }

    pub fn removed(&self) -> bool {
        self.kind == ChangeKind::Removed
    }
}

/// Lifecycle notifications emitted by a tracked source.
///
/// These are advisory. Consumers (progress reporting, the pipeline executor)
/// may react to them, but nothing in this crate ever blocks on delivery.
#[derive(Debug, Clone)]
pub enum SourceEvent {
    /// A checksum scan has started for `dir`.
    ChecksumStart { dir: PathBuf },
    /// The scan for `dir` finished; `duration` is the elapsed wall time.
    ChecksumComplete { dir: PathBuf, duration: Duration },
    /// A debounced batch of changes, in arrival order, duplicates preserved.
    Invalidate { changes: Vec<ChangeEvent> },
    /// The watch session hit an unrecoverable error and has stopped.
    WatchFailed { path: PathBuf, message: String },
}

/// Fire-and-forget sender for [`SourceEvent`]s.
///
/// A sink without a receiver (or whose receiver has been dropped) swallows
/// events silently; emitting never blocks and never fails.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<SourceEvent>>,
}

impl EventSink {
    /// A connected sink plus the receiving half.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SourceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that drops everything.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub(crate) fn emit(&self, event: SourceEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
