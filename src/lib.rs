// src/lib.rs

pub mod checksum;
pub mod config;
pub mod errors;
pub mod fsops;
pub mod logging;
pub mod queue;
pub mod serve;
pub mod source;
pub mod types;
pub mod watch;

pub use checksum::ChecksumIndex;
pub use config::SessionConfig;
pub use errors::{Result, SyncError};
pub use fsops::merge::merge_trees;
pub use queue::TaskQueue;
pub use serve::serve_file;
pub use source::{DirectorySource, FileSource, SourceOptions, TrackedSource};
pub use types::{ChangeEvent, ChangeKind, EventSink, SourceEvent};
