//! Log record model and line formatting
//!
//! A [`LogRecord`] is one leveled message plus the caller metadata that goes
//! into the line prefix. The [`Sink`] trait is the single entry point records
//! flow through; the file sink implements it, and tests substitute an
//! in-memory implementation to observe what was routed.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Timestamp layout for the line prefix
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Record severity, ordered low to high urgency
///
/// `Unknown` is the catch-all for records arriving without a recognized
/// level: it is labeled literally, never forces a flush, and is never
/// dropped by the minimum-level filter (it has no rank to compare).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
    Unknown,
}

impl Severity {
    /// Label used in the on-disk line format
    pub fn label(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
            Severity::Unknown => "UNKNOWN",
        }
    }

    /// Whether a record at this severity must reach the OS before the write
    /// call returns, instead of waiting for the periodic flush
    pub fn is_urgent(self) -> bool {
        matches!(self, Severity::Warning | Severity::Error | Severity::Fatal)
    }

    /// Whether a record at this severity passes a minimum-level filter
    pub fn permits(self, min: Severity) -> bool {
        match (self.rank(), min.rank()) {
            (Some(level), Some(floor)) => level >= floor,
            // Unranked on either side: let the record through
            _ => true,
        }
    }

    fn rank(self) -> Option<u8> {
        match self {
            Severity::Debug => Some(0),
            Severity::Info => Some(1),
            Severity::Warning => Some(2),
            Severity::Error => Some(3),
            Severity::Fatal => Some(4),
            Severity::Unknown => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::WARN => Severity::Warning,
            tracing::Level::ERROR => Severity::Error,
        }
    }
}

/// Caller metadata attached to a record
#[derive(Debug, Clone, Copy)]
pub struct RecordContext<'a> {
    /// Originating function or module path
    pub function: &'a str,
    /// Source file, when known
    pub file: &'a str,
    /// Source line, 0 when unknown
    pub line: u32,
    /// Free-form category; a leading digit marks it as a pre-supplied
    /// timestamp that replaces the computed one
    pub category: &'a str,
}

/// One leveled log record
#[derive(Debug, Clone, Copy)]
pub struct LogRecord<'a> {
    pub severity: Severity,
    pub context: RecordContext<'a>,
    pub text: &'a str,
}

/// Destination for log records
///
/// Implementations must not panic and must not report failure: a record
/// that cannot be written is dropped without disturbing the caller.
pub trait Sink: Send + Sync {
    /// Record one entry
    fn write(&self, record: &LogRecord<'_>);
}

/// Render a record into the on-disk line format:
///
/// ```text
/// [<timestamp>] [<LEVEL>] [<function> #<line> <pid> <tid>] <message>
/// ```
///
/// The timestamp slot holds the category verbatim when its first character
/// is an ASCII digit; otherwise the current local time is stamped. The line
/// ends with a newline.
pub fn format_line(record: &LogRecord<'_>) -> String {
    let category = record.context.category;
    let stamp: Cow<'_, str> = if category.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        Cow::Borrowed(category)
    } else {
        Cow::Owned(chrono::Local::now().format(TIMESTAMP_FORMAT).to_string())
    };

    format!(
        "[{}] [{}] [{} #{} {} {:?}] {}\n",
        stamp,
        record.severity.label(),
        record.context.function,
        record.context.line,
        std::process::id(),
        std::thread::current().id(),
        record.text,
    )
}
