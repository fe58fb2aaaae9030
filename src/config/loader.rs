// src/config/loader.rs

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::config::SessionConfig;
use crate::errors::{Result, SyncError};

/// On-disk shape of a session file:
///
/// ```toml
/// [session]
/// scratch_dir = ".treesync-build"
/// debounce_ms = 100
/// queue_width = 1
/// ```
#[derive(Debug, Deserialize)]
pub struct RawSessionFile {
    pub session: RawSessionSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawSessionSection {
    pub scratch_dir: Option<String>,
    pub debounce_ms: Option<u64>,
    pub queue_width: Option<usize>,
}

/// Load a session file from a given path and return the raw deserialized
/// form.
///
/// This only performs TOML deserialization; it does **not** validate.
/// Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSessionFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let raw: RawSessionFile = toml::from_str(&contents)?;
    Ok(raw)
}

/// Load a session file and apply defaults + validation.
///
/// This is the recommended entry point: relative `scratch_dir` values are
/// resolved against the session file's parent directory, and a zero queue
/// width is rejected.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<SessionConfig> {
    let path = path.as_ref();
    let raw = load_from_path(path)?;
    let section = raw.session;

    let scratch = section
        .scratch_dir
        .ok_or_else(|| SyncError::Config("session.scratch_dir is required".to_string()))?;
    if scratch.trim().is_empty() {
        return Err(SyncError::Config(
            "session.scratch_dir must not be empty".to_string(),
        ));
    }

    let mut scratch_dir = std::path::PathBuf::from(scratch);
    if scratch_dir.is_relative() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            scratch_dir = parent.join(scratch_dir);
        }
    }

    let mut config = SessionConfig::new(scratch_dir);

    if let Some(ms) = section.debounce_ms {
        config = config.with_debounce(Duration::from_millis(ms));
    }

    if let Some(width) = section.queue_width {
        if width == 0 {
            return Err(SyncError::Config(
                "session.queue_width must be at least 1".to_string(),
            ));
        }
        config = config.with_queue_width(width);
    }

    Ok(config)
}
