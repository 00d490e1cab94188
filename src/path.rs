//! Log path resolution and sanitization
//!
//! Called once during configuration, before the sink opens; no locking
//! needed. The only side effect is best-effort creation of the fallback
//! application-data directory.

use std::fs;
use std::path::PathBuf;

use regex::Regex;

use crate::error::SinkError;

/// A resolved log file location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Full path of the active log file
    pub file: PathBuf,
    /// Directory that holds it
    pub directory: PathBuf,
}

/// Compute the final location of the log file
///
/// Whitespace runs in `file_name` collapse to a single `_`. An empty
/// `directory` selects the per-user application-data directory, sanitized
/// the same way and created (with parents) if missing; creation failures
/// are ignored and resurface at open time. Backslashes are normalized to
/// forward slashes and exactly one separator precedes the file name.
pub fn resolve(directory: &str, file_name: &str) -> Result<ResolvedPath, SinkError> {
    if file_name.is_empty() {
        return Err(SinkError::EmptyFileName);
    }

    let whitespace = Regex::new(r"\s+").unwrap();
    let name = whitespace.replace_all(file_name, "_");

    let dir = if directory.is_empty() {
        let base = dirs::data_dir()
            .map(|d| d.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string());
        let base = whitespace.replace_all(&base, "_").into_owned();
        let _ = fs::create_dir_all(&base);
        base
    } else {
        directory.to_string()
    };

    let mut prefix = dir.replace('\\', "/");
    if !prefix.ends_with('/') {
        prefix.push('/');
    }

    Ok(ResolvedPath {
        file: PathBuf::from(format!("{prefix}{name}")),
        directory: PathBuf::from(dir),
    })
}
