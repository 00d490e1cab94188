//! Process-wide, size-rotating file log sink
//!
//! `rotolog` serializes structured log records from arbitrary concurrent
//! callers to a single active file and transparently rotates that file to
//! `<path>.old` once it grows past a configured size. Records arrive either
//! through the [`Sink`] trait directly or, more commonly, through the
//! [`SinkLayer`] tracing layer installed by [`init_file_logging`]:
//!
//! ```rust,no_run
//! use rotolog::SinkConfig;
//!
//! let mut config = SinkConfig::default();
//! config.directory = "logs".to_string();
//! config.file_name = "service.log".to_string();
//!
//! let sink = rotolog::init_file_logging(config).expect("install file logging");
//!
//! tracing::info!("service started");
//! tracing::warn!("urgent records are flushed to disk immediately");
//! sink.flush().ok();
//! ```
//!
//! Warning-and-above records are durable as soon as the logging call
//! returns; Debug and Info records ride a periodic flush (tokio interval,
//! 1s by default). See [`sink`] for the rotation and concurrency rules.

pub mod config;
pub mod error;
pub mod flusher;
pub mod layer;
pub mod path;
pub mod record;
pub mod rotation;
pub mod sink;

// Re-export the main types for easy access
pub use config::SinkConfig;
pub use error::SinkError;
pub use flusher::{FlushCallback, FlushScheduler, IntervalFlusher};
pub use layer::SinkLayer;
pub use record::{LogRecord, RecordContext, Severity, Sink};
pub use sink::FileSink;

use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the process-wide file sink as the destination for all tracing
/// events in the process
///
/// Builds (or reuses) the global [`FileSink`], applies the directory and
/// file name from `config`, and installs a [`SinkLayer`] over it as the
/// global subscriber. The file itself opens lazily on the first record.
/// Panics if a global subscriber is already installed, like any
/// `init`-style installer; compose a [`SinkLayer`] into your own registry
/// when you need more layers than this.
pub fn init_file_logging(config: SinkConfig) -> Result<&'static Arc<FileSink>, SinkError> {
    let directory = config.directory.clone();
    let file_name = config.file_name.clone();

    let sink = FileSink::instance_with(config);
    sink.set_path(&directory, &file_name)?;

    tracing_subscriber::registry()
        .with(SinkLayer::new(sink.clone()))
        .init();

    Ok(sink)
}
