//! Example of the rotating file sink wired into tracing
//!
//! Run with: cargo run --example rotating_sink

use rotolog::{FileSink, SinkConfig, SinkLayer};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Small threshold and a fast flush so the demo rotates quickly
    let config = SinkConfig {
        directory: "demo_logs".to_string(),
        file_name: "demo.log".to_string(),
        max_bytes: 4 * 1024,
        flush_interval_ms: 250,
        ..SinkConfig::default()
    };

    // Only the app-data fallback directory is created automatically
    std::fs::create_dir_all(&config.directory)?;

    let sink = FileSink::new(config.clone());
    sink.set_path(&config.directory, &config.file_name)?;

    // File sink plus a console mirror, composed like any other layer stack
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(SinkLayer::new(sink.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting rotating sink example");
    warn!("This warning is flushed to disk immediately");
    error!("This error too (not a real error!)");
    debug!("Filtered out unless RUST_LOG asks for debug");

    // Generate enough lines to cross the threshold a few times
    for i in 0..100 {
        info!("Log entry {}: The quick brown fox jumps over the lazy dog", i);

        if i % 10 == 0 {
            warn!("Periodic warning at entry {}", i);
        }

        // Small delay so the periodic flush gets a chance to fire
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    sink.flush()?;
    info!("Example completed! Check the 'demo_logs' directory:");
    for entry in std::fs::read_dir("demo_logs")? {
        let entry = entry?;
        let size = entry.metadata()?.len();
        info!("  - {} ({} bytes)", entry.file_name().to_string_lossy(), size);
    }

    sink.close(true);
    Ok(())
}
