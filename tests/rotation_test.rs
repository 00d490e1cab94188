//! Rotation behavior of the file sink

use rotolog::{FileSink, LogRecord, RecordContext, Severity, Sink, SinkConfig};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn sink_in(dir: &TempDir, max_bytes: u64) -> Arc<FileSink> {
    let config = SinkConfig {
        max_bytes,
        directory: dir.path().to_string_lossy().into_owned(),
        file_name: "rotation.log".to_string(),
        ..SinkConfig::default()
    };
    let sink = FileSink::new(config.clone());
    sink.set_path(&config.directory, &config.file_name)
        .expect("path resolves");
    sink
}

fn info(text: &str) -> LogRecord<'_> {
    LogRecord {
        severity: Severity::Info,
        context: RecordContext {
            function: "rotation::emit",
            file: "tests/rotation_test.rs",
            line: 1,
            category: "",
        },
        text,
    }
}

#[test]
fn test_flush_moves_oversized_file_aside() {
    let dir = TempDir::new().unwrap();
    let sink = sink_in(&dir, 8);

    sink.write(&info("crosses the threshold on its own"));
    sink.flush().expect("rotation succeeds");

    let rotated = fs::read_to_string(dir.path().join("rotation.log.old"))
        .expect("rotated file exists");
    assert!(rotated.contains("crosses the threshold on its own"));

    // The active file was reopened fresh
    let active = fs::read_to_string(sink.log_path()).unwrap();
    assert!(active.is_empty());
}

#[test]
fn test_rotation_waits_for_flush() {
    let dir = TempDir::new().unwrap();
    let sink = sink_in(&dir, 8);

    // Several oversized writes with no flush: everything stays in one
    // generation until the flush runs the rotation check
    sink.write(&info("one"));
    sink.write(&info("two"));
    sink.write(&info("three"));
    assert!(!dir.path().join("rotation.log.old").exists());

    sink.flush().expect("rotation succeeds");

    let rotated = fs::read_to_string(dir.path().join("rotation.log.old")).unwrap();
    assert!(rotated.contains("one"));
    assert!(rotated.contains("two"));
    assert!(rotated.contains("three"));
}

#[test]
fn test_batch_scenario_preserves_every_message_across_one_rotation() {
    let dir = TempDir::new().unwrap();
    // Threshold is set after the first write, once the line width is known
    let sink = sink_in(&dir, u64::MAX);

    // All payloads are the same width, so every line has the same length
    let payload = |i: usize| format!("message-{:02}", i);

    sink.write(&info(&payload(1)));
    sink.flush().expect("first flush");
    let line_len = fs::metadata(sink.log_path()).unwrap().len();
    assert!(line_len > 0);

    // Rotate once the file holds more than ten lines
    sink.set_max_bytes(line_len * 10);

    for i in 2..=20 {
        sink.write(&info(&payload(i)));
        sink.flush().expect("flush after each write");
    }

    let rotated = fs::read_to_string(dir.path().join("rotation.log.old"))
        .expect("exactly one rotation happened");
    let active = fs::read_to_string(sink.log_path()).unwrap();

    // Eleven lines crossed the threshold and moved aside; the tail stayed
    assert_eq!(rotated.lines().count(), 11);
    assert_eq!(active.lines().count(), 9);

    // No message was lost and the original order survives the file split
    let combined = format!("{rotated}{active}");
    let seen: Vec<usize> = combined
        .lines()
        .map(|line| {
            let marker = line.rfind("message-").expect("payload present");
            line[marker + "message-".len()..].parse().unwrap()
        })
        .collect();
    assert_eq!(seen, (1..=20).collect::<Vec<_>>());
}

#[test]
fn test_second_rotation_clobbers_first_generation() {
    let dir = TempDir::new().unwrap();
    let sink = sink_in(&dir, 8);

    sink.write(&info("generation one"));
    sink.flush().expect("first rotation");
    sink.write(&info("generation two"));
    sink.flush().expect("second rotation");

    let rotated = fs::read_to_string(dir.path().join("rotation.log.old")).unwrap();
    assert!(rotated.contains("generation two"));
    assert!(!rotated.contains("generation one"));
}
