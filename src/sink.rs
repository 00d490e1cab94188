//! Process-wide rotating file sink
//!
//! This module provides the stateful heart of the crate: a mutex-guarded
//! owner of the log file handle that serializes concurrent writers, rotates
//! the file when it grows past a size threshold, and keeps durability
//! bounded through periodic and urgent flushes. It is designed for
//! long-running services where logging must never disturb the caller: every
//! failure on the write path drops the record instead of propagating.
//!
//! ## Features
//!
//! ### Lazy, self-healing file handling
//! - The file opens on the first write (or an explicit `open` call)
//! - Open failures leave the sink closed; the next write retries from scratch
//! - A failed rotation likewise closes the sink and heals on the next write
//!
//! ### Size-based rotation
//! - Checked after every flush against a threshold that can be changed at
//!   any time, taking effect on the next flush
//! - Rotation renames the active file to `<path>.old` (one retained
//!   generation, clobbered each time) and reopens a fresh file
//! - Performed synchronously under the sink lock; an accepted latency spike
//!   on rare rotation events
//!
//! ### Durability tiers
//! - Warning, Error, and Fatal records are flushed to the OS before the
//!   write call returns
//! - Debug and Info records ride the periodic flush registered with the
//!   [`FlushScheduler`](crate::flusher::FlushScheduler)
//!
//! ## Concurrency
//!
//! A single exclusive lock serializes `open`, `close`, `flush`, and the
//! write path, so concurrent writers produce totally ordered, untorn
//! lines. The only state touched outside the lock is the process-wide
//! instance pointer and the atomic rotation threshold. Sink internals never
//! emit `tracing` events: the sink is typically installed as a subscriber
//! layer, and re-entry would deadlock on the non-reentrant lock.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rotolog::{FileSink, LogRecord, RecordContext, Severity, Sink, SinkConfig};
//!
//! let sink = FileSink::new(SinkConfig::default());
//! sink.set_path("logs", "app.log").expect("valid path");
//!
//! sink.write(&LogRecord {
//!     severity: Severity::Info,
//!     context: RecordContext {
//!         function: "main",
//!         file: "main.rs",
//!         line: 1,
//!         category: "",
//!     },
//!     text: "service started",
//! });
//!
//! sink.close(true);
//! ```
//!
//! Most applications install the sink process-wide instead via
//! [`init_file_logging`](crate::init_file_logging) and log through the
//! `tracing` macros.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::SinkConfig;
use crate::error::SinkError;
use crate::flusher::{FlushScheduler, IntervalFlusher};
use crate::path;
use crate::record::{format_line, LogRecord, Severity, Sink};
use crate::rotation::{self, RotationPolicy};

/// Name of the repeating flush task registered with the scheduler
const FLUSH_TASK: &str = "flush-log-sink";

static INSTANCE: OnceLock<Arc<FileSink>> = OnceLock::new();

/// Mutable sink state, guarded by the sink's single lock
#[derive(Debug)]
struct SinkState {
    /// Logical claim on the file; stays true through rotation
    opened: bool,
    /// Whether the next close releases the logical claim too
    reset_on_close: bool,
    path: PathBuf,
    directory: PathBuf,
    writer: Option<BufWriter<File>>,
    /// Bytes in the active file, buffered bytes included
    current_size: u64,
}

/// Mutex-guarded owner of the rotating log file
///
/// Constructed standalone with [`FileSink::new`] or process-wide through
/// [`FileSink::instance`]. The path is applied separately with
/// [`FileSink::set_path`] (resolution can fail, construction cannot);
/// until then every write is dropped because the open fails.
pub struct FileSink {
    state: Mutex<SinkState>,
    rotation: RotationPolicy,
    min_level: Severity,
    flush_interval: Duration,
    truncate_on_open: bool,
    scheduler: Arc<dyn FlushScheduler>,
    weak_self: Weak<FileSink>,
}

impl FileSink {
    /// Create a standalone sink with the tokio-backed scheduler
    pub fn new(config: SinkConfig) -> Arc<Self> {
        Self::with_scheduler(config, Arc::new(IntervalFlusher::new()))
    }

    /// Create a standalone sink with an injected flush scheduler
    ///
    /// The flush task is registered under a fixed name, so a scheduler
    /// instance must serve at most one sink.
    pub fn with_scheduler(config: SinkConfig, scheduler: Arc<dyn FlushScheduler>) -> Arc<Self> {
        // The flush callback holds a weak handle back to the sink, so the
        // cycle breaks once the last strong reference drops
        Arc::new_cyclic(|weak| Self {
            state: Mutex::new(SinkState {
                opened: false,
                reset_on_close: true,
                path: PathBuf::new(),
                directory: PathBuf::new(),
                writer: None,
                current_size: 0,
            }),
            rotation: RotationPolicy::new(config.max_bytes),
            min_level: config.min_level,
            flush_interval: Duration::from_millis(config.flush_interval_ms),
            truncate_on_open: config.truncate_on_open,
            scheduler,
            weak_self: weak.clone(),
        })
    }

    /// Process-wide instance, created with default configuration on first
    /// access
    pub fn instance() -> &'static Arc<FileSink> {
        INSTANCE.get_or_init(|| FileSink::new(SinkConfig::default()))
    }

    /// Process-wide instance, created with `config` by whichever caller
    /// gets there first; later callers receive the existing instance and
    /// their configuration is ignored
    pub fn instance_with(config: SinkConfig) -> &'static Arc<FileSink> {
        INSTANCE.get_or_init(|| FileSink::new(config))
    }

    /// Set the directory and file name of the active log file
    ///
    /// Resolution substitutes whitespace and falls back to the per-user
    /// application-data directory when `directory` is empty. Rejected with
    /// [`SinkError::AlreadyOpen`] while the sink holds an open file; close
    /// with `reset` first.
    pub fn set_path(&self, directory: &str, file_name: &str) -> Result<PathBuf, SinkError> {
        let resolved = path::resolve(directory, file_name)?;
        let mut state = self.state.lock();
        if state.opened {
            return Err(SinkError::AlreadyOpen);
        }
        state.path = resolved.file.clone();
        state.directory = resolved.directory;
        Ok(resolved.file)
    }

    /// Directory of the active log file
    pub fn dir_path(&self) -> PathBuf {
        self.state.lock().directory.clone()
    }

    /// Full path of the active log file
    pub fn log_path(&self) -> PathBuf {
        self.state.lock().path.clone()
    }

    /// Current rotation threshold in bytes
    pub fn max_bytes(&self) -> u64 {
        self.rotation.max_bytes()
    }

    /// Replace the rotation threshold; effective on the next flush
    pub fn set_max_bytes(&self, max_bytes: u64) {
        self.rotation.set_max_bytes(max_bytes);
    }

    /// Open the log file and start the periodic flush
    ///
    /// No-op only while a live handle is held. After a reset-less close
    /// released the handle, this re-acquires it and logging resumes. Opens
    /// in append mode (or truncate when the configuration asks for it),
    /// creating the file if missing.
    pub fn open(&self) -> Result<(), SinkError> {
        let mut state = self.state.lock();
        if state.writer.is_some() {
            return Ok(());
        }
        self.open_handle(&mut state)
    }

    /// Close the sink, flushing buffered output first
    ///
    /// Returns false without any I/O when already closed. With `reset` the
    /// sink transitions to Closed and may be reopened or re-pathed; without
    /// it the handle is released but the sink stays logically claimed,
    /// which is how rotation swaps files without racing the lazy open in
    /// the write path.
    pub fn close(&self, reset: bool) -> bool {
        let mut state = self.state.lock();
        state.reset_on_close = reset;
        self.close_locked(&mut state)
    }

    /// Flush buffered output to the OS, then rotate if the size threshold
    /// has been crossed
    ///
    /// No-op while closed. A failed rotation leaves the sink closed and
    /// returns the error; the next write reopens from scratch.
    pub fn flush(&self) -> Result<(), SinkError> {
        let mut state = self.state.lock();
        if !state.opened {
            return Ok(());
        }
        self.flush_stream(&mut state)?;
        self.rotate_if_needed(&mut state)
    }

    /// Open the file and register the flush task. Caller holds the lock.
    fn open_handle(&self, state: &mut SinkState) -> Result<(), SinkError> {
        let mut options = OpenOptions::new();
        options.create(true);
        if self.truncate_on_open {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }
        let file = options.open(&state.path).map_err(|source| SinkError::Open {
            path: state.path.clone(),
            source,
        })?;
        // Seed the tracked size so prior content counts toward rotation
        let size = file
            .metadata()
            .map_err(|source| SinkError::Open {
                path: state.path.clone(),
                source,
            })?
            .len();
        state.writer = Some(BufWriter::new(file));
        state.current_size = size;
        state.opened = true;
        self.register_flush_task();
        Ok(())
    }

    /// Flush and release the handle. Caller holds the lock.
    fn close_locked(&self, state: &mut SinkState) -> bool {
        if !state.opened {
            return false;
        }
        // Never wait for the callback here: it may be blocked on the very
        // lock this thread is holding
        self.scheduler.unregister(FLUSH_TASK, false);
        if state.reset_on_close {
            state.opened = false;
        }
        if let Some(mut writer) = state.writer.take() {
            let _ = writer.flush();
        }
        true
    }

    /// Push buffered bytes to the OS. Caller holds the lock.
    fn flush_stream(&self, state: &mut SinkState) -> Result<(), SinkError> {
        let SinkState { path, writer, .. } = state;
        if let Some(writer) = writer.as_mut() {
            writer.flush().map_err(|source| SinkError::Flush {
                path: path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Rotate when due: release the handle while keeping the sink claimed,
    /// move the file aside, reopen fresh. Caller holds the lock.
    fn rotate_if_needed(&self, state: &mut SinkState) -> Result<(), SinkError> {
        if !state.opened || !self.rotation.should_rotate(state.current_size) {
            return Ok(());
        }
        state.reset_on_close = false;
        self.close_locked(state);
        if let Err(err) = rotation::archive(&state.path) {
            state.opened = false;
            return Err(err);
        }
        match self.open_handle(state) {
            Ok(()) => Ok(()),
            Err(err) => {
                state.opened = false;
                Err(err)
            }
        }
    }

    /// Register the repeating flush with the scheduler
    ///
    /// The callback upgrades a weak handle and stops itself once the sink
    /// is gone.
    fn register_flush_task(&self) {
        let weak = self.weak_self.clone();
        self.scheduler.register(
            FLUSH_TASK,
            self.flush_interval,
            Box::new(move || match weak.upgrade() {
                Some(sink) => {
                    let _ = sink.flush();
                    true
                }
                None => false,
            }),
        );
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("FileSink")
            .field("opened", &state.opened)
            .field("path", &state.path)
            .field("current_size", &state.current_size)
            .field("max_bytes", &self.rotation.max_bytes())
            .finish_non_exhaustive()
    }
}

impl Sink for FileSink {
    /// Route one record: lazily open, format, write, and flush urgent
    /// severities through to the OS
    ///
    /// Severities below the configured minimum are dropped before the lock
    /// is taken. Never panics and never reports failure; a record that
    /// cannot be written is lost.
    fn write(&self, record: &LogRecord<'_>) {
        if !record.severity.permits(self.min_level) {
            return;
        }
        let mut state = self.state.lock();
        if !state.opened && self.open_handle(&mut state).is_err() {
            return;
        }
        let line = format_line(record);
        let Some(writer) = state.writer.as_mut() else {
            // Logically claimed but closed at the OS level (a reset-less
            // close); nothing to write into
            return;
        };
        if writer.write_all(line.as_bytes()).is_err() {
            return;
        }
        state.current_size += line.len() as u64;
        if record.severity.is_urgent() {
            // Stream flush only; rotation stays bound to flush() so the
            // write path cost is bounded
            let _ = self.flush_stream(&mut state);
        }
    }
}
