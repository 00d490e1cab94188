//! Error types for sink operations
//!
//! Failures are returned to the direct caller of `open`/`close`/`flush`/
//! `set_path`; the write path swallows them instead, because a logging
//! failure must never propagate back into application code.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the file sink
#[derive(Debug, Error)]
pub enum SinkError {
    /// The log file could not be created or opened
    #[error("failed to open log file {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Buffered output could not be flushed to the OS
    #[error("failed to flush log file {}", .path.display())]
    Flush {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The rotation rename could not complete
    #[error("failed to rotate {} to {}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An empty file name was supplied to path resolution
    #[error("log file name is empty")]
    EmptyFileName,

    /// The path cannot change while the sink holds an open file
    #[error("log path cannot change while the sink is open")]
    AlreadyOpen,
}
