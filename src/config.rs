use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::record::Severity;

/// File sink configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SinkConfig {
    /// Rotation threshold in bytes
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Minimum severity recorded; lower-severity records are dropped
    #[serde(default = "default_min_level")]
    pub min_level: Severity,

    /// Interval between periodic flushes, in milliseconds
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Directory for the log file; empty selects the per-user
    /// application-data directory
    #[serde(default)]
    pub directory: String,

    /// Log file name; whitespace is replaced during resolution
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Truncate instead of append when the file opens. A deployment-time
    /// choice for debug runs that want a fresh file per launch
    #[serde(default)]
    pub truncate_on_open: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            min_level: default_min_level(),
            flush_interval_ms: default_flush_interval_ms(),
            directory: String::new(),
            file_name: default_file_name(),
            truncate_on_open: false,
        }
    }
}

// Default value functions for serde
fn default_max_bytes() -> u64 {
    10 * 1024 * 1024
}
fn default_min_level() -> Severity {
    Severity::Info
}
fn default_flush_interval_ms() -> u64 {
    1000
}
fn default_file_name() -> String {
    "app.log".to_string()
}

impl SinkConfig {
    /// Load configuration from file, or use defaults if not found
    pub fn load() -> Result<Self> {
        // Try to load from rotolog.yaml in current directory
        let config_path = Path::new("rotolog.yaml");

        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .context("Failed to read rotolog.yaml")?;
            let config: SinkConfig = serde_yaml::from_str(&contents)
                .context("Failed to parse rotolog.yaml")?;
            Ok(config)
        } else {
            // Use defaults if no config file exists
            Ok(SinkConfig::default())
        }
    }

    /// Load configuration from a specific file path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: SinkConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SinkConfig::default();
        assert_eq!(config.max_bytes, 10 * 1024 * 1024);
        assert_eq!(config.min_level, Severity::Info);
        assert_eq!(config.flush_interval_ms, 1000);
        assert_eq!(config.directory, "");
        assert_eq!(config.file_name, "app.log");
        assert!(!config.truncate_on_open);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: SinkConfig = serde_yaml::from_str("max_bytes: 4096\n").unwrap();
        assert_eq!(config.max_bytes, 4096);
        assert_eq!(config.min_level, Severity::Info);
        assert_eq!(config.file_name, "app.log");
    }

    #[test]
    fn test_severity_parses_lowercase_names() {
        let config: SinkConfig =
            serde_yaml::from_str("min_level: warning\nfile_name: svc.log\n").unwrap();
        assert_eq!(config.min_level, Severity::Warning);
        assert_eq!(config.file_name, "svc.log");
    }

    #[test]
    fn test_load_from_missing_file_is_error() {
        let err = SinkConfig::load_from(Path::new("/nonexistent/rotolog.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
