//! Size-based rotation policy
//!
//! The active file rotates once its size grows strictly beyond the byte
//! threshold. A single rotated generation is kept under a fixed `.old`
//! suffix; each rotation overwrites the previous one. The close-reopen
//! sequence around the rename lives in the sink, which owns the handle;
//! this module decides when rotation is due and performs the rename.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::SinkError;

/// Suffix appended to the active path for the rotated file
pub const ROTATED_SUFFIX: &str = ".old";

/// Decides when the active log file must rotate
///
/// The threshold is externally settable at any time and re-read on every
/// check, so a new limit takes effect on the next flush with no reopen.
#[derive(Debug)]
pub struct RotationPolicy {
    max_bytes: AtomicU64,
}

impl RotationPolicy {
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes: AtomicU64::new(max_bytes),
        }
    }

    /// Current threshold in bytes
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes.load(Ordering::Relaxed)
    }

    /// Replace the threshold; effective on the next check
    pub fn set_max_bytes(&self, max_bytes: u64) {
        self.max_bytes.store(max_bytes, Ordering::Relaxed);
    }

    /// True once the file has grown strictly beyond the threshold
    pub fn should_rotate(&self, current_size: u64) -> bool {
        current_size > self.max_bytes.load(Ordering::Relaxed)
    }
}

/// Path of the rotated generation for an active path
pub fn rotated_path(path: &Path) -> PathBuf {
    let mut rotated = path.as_os_str().to_os_string();
    rotated.push(ROTATED_SUFFIX);
    PathBuf::from(rotated)
}

/// Move the active file aside, clobbering any previous rotated file
pub fn archive(path: &Path) -> Result<PathBuf, SinkError> {
    let rotated = rotated_path(path);
    // rename does not replace an existing target on every platform
    let _ = fs::remove_file(&rotated);
    fs::rename(path, &rotated).map_err(|source| SinkError::Rename {
        from: path.to_path_buf(),
        to: rotated.clone(),
        source,
    })?;
    Ok(rotated)
}
