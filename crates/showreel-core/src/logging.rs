//! Logging configuration
//!
//! The subscriber itself is installed by the binary; this module only owns the
//! settings and the log-file housekeeping.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level name: trace, debug, info, warn, error
    pub level: String,
    /// Write to stderr
    pub console_output: bool,
    /// Write to a timestamped file in `log_dir`
    pub file_output: bool,
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Log files to keep, newest first
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_dir: PathBuf::from("logs"),
            max_files: 10,
        }
    }
}

impl LogConfig {
    /// Level filter, falling back to INFO for unknown names
    pub fn parse_level(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::INFO)
    }

    /// Create `log_dir` if file output is enabled
    pub fn ensure_log_directory(&self) -> std::io::Result<()> {
        if self.file_output {
            std::fs::create_dir_all(&self.log_dir)?;
        }
        Ok(())
    }

    /// Path of the log file for this run
    pub fn current_log_path(&self) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        self.log_dir.join(format!("showreel_{}.log", stamp))
    }

    /// Delete the oldest log files beyond `max_files - 1`, making room for this run's
    ///
    /// Returns the number of files removed.
    pub fn cleanup_old_logs(&self) -> std::io::Result<usize> {
        if !self.file_output || !self.log_dir.exists() {
            return Ok(0);
        }

        let mut logs = list_logs(&self.log_dir)?;
        // Names carry a sortable timestamp
        logs.sort();

        let keep = self.max_files.saturating_sub(1);
        let excess = logs.len().saturating_sub(keep);
        for path in logs.iter().take(excess) {
            std::fs::remove_file(path)?;
        }
        Ok(excess)
    }
}

fn list_logs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut logs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with("showreel_") && n.ends_with(".log"))
            .unwrap_or(false);
        if is_log {
            logs.push(path);
        }
    }
    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        let mut config = LogConfig::default();
        assert_eq!(config.parse_level(), LevelFilter::INFO);
        config.level = "debug".to_string();
        assert_eq!(config.parse_level(), LevelFilter::DEBUG);
        config.level = "loud".to_string();
        assert_eq!(config.parse_level(), LevelFilter::INFO);
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            file_output: true,
            log_dir: dir.path().to_path_buf(),
            max_files: 3,
            ..LogConfig::default()
        };
        for day in 1..=5 {
            let name = format!("showreel_2024-01-0{}_00-00-00.log", day);
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        assert_eq!(config.cleanup_old_logs().unwrap(), 3);
        let remaining = list_logs(dir.path()).unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(dir.path().join("showreel_2024-01-05_00-00-00.log").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_log_dir_created_only_for_file_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LogConfig {
            log_dir: dir.path().join("nested"),
            ..LogConfig::default()
        };
        config.ensure_log_directory().unwrap();
        assert!(!config.log_dir.exists());

        config.file_output = true;
        config.ensure_log_directory().unwrap();
        assert!(config.log_dir.exists());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: LogConfig = serde_json::from_str(r#"{"level": "warn"}"#).unwrap();
        assert_eq!(config.level, "warn");
        assert!(config.console_output);
        assert_eq!(config.max_files, 10);
    }
}
