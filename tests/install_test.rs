//! End-to-end install of the process-wide sink through tracing
//!
//! One test function: the global subscriber and the process-wide sink can
//! only be installed once per process.

use rotolog::{init_file_logging, Severity, SinkConfig};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_installed_sink_receives_all_tracing_events() {
    let dir = TempDir::new().unwrap();
    let config = SinkConfig {
        directory: dir.path().to_string_lossy().into_owned(),
        file_name: "installed with space.log".to_string(),
        min_level: Severity::Debug,
        ..SinkConfig::default()
    };

    let sink = init_file_logging(config).expect("install succeeds");

    // The configured name was sanitized during resolution
    assert!(sink.log_path().ends_with("installed_with_space.log"));

    // Urgent records reach the disk before any flush
    tracing::warn!("urgent line");
    let early = fs::read_to_string(sink.log_path()).unwrap();
    assert!(early.contains("[WARNING] "));
    assert!(early.contains("urgent line"));

    tracing::info!("application line");
    tracing::debug!(step = 1, "with fields");
    tracing::info!(category = "2026-02-03 04:05:06.789", "pre-stamped");

    sink.flush().expect("flush succeeds");
    let contents = fs::read_to_string(sink.log_path()).unwrap();

    assert!(contents.contains("[INFO] "));
    assert!(contents.contains("application line"));
    assert!(contents.contains("[DEBUG] "));
    assert!(contents.contains("with fields step=1"));
    // A category with a leading digit replaces the computed timestamp
    assert!(contents.contains("[2026-02-03 04:05:06.789] [INFO] "));
    assert!(contents.contains("pre-stamped"));

    // The event target landed in the function slot of the prefix
    assert!(contents.contains("install_test #"));

    assert!(sink.close(true));
    assert!(!sink.close(true));
}
