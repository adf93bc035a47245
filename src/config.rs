// src/config.rs
// Construction options for a Stopwatch.

use std::convert::Infallible;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Result, StopwatchError};
use crate::format::DEFAULT_FORMAT_SPEC;

/// What happens to an existing log file when a stopwatch is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum LogMode {
    /// Truncate the file to zero length.
    #[default]
    Reset,
    /// Keep whatever the file already holds.
    Append,
}

// Only the exact string "reset" truncates; anything else appends.
impl From<&str> for LogMode {
    fn from(s: &str) -> Self {
        if s == "reset" { LogMode::Reset } else { LogMode::Append }
    }
}

impl From<String> for LogMode {
    fn from(s: String) -> Self {
        LogMode::from(s.as_str())
    }
}

impl FromStr for LogMode {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(LogMode::from(s))
    }
}

impl fmt::Display for LogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogMode::Reset => f.write_str("reset"),
            LogMode::Append => f.write_str("append"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StopwatchConfig {
    /// Rendered as a `[label]` prefix.
    pub label: Option<String>,
    /// printf-style format for the elapsed seconds, e.g. `%.3f`.
    pub format_spec: String,
    /// When set, `log` appends every message to this file.
    pub log_path: Option<PathBuf>,
    pub log_mode: LogMode,
    /// Adds `[YYYY-MM-DD HH:MM:SS]` local time to every message.
    pub include_timestamp: bool,
    /// `log` writes to the file only. `record` is unaffected.
    pub silent: bool,
}

impl Default for StopwatchConfig {
    fn default() -> Self {
        Self {
            label: None,
            format_spec: DEFAULT_FORMAT_SPEC.to_string(),
            log_path: None,
            log_mode: LogMode::Reset,
            include_timestamp: false,
            silent: false,
        }
    }
}

impl StopwatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn format_spec(mut self, spec: impl Into<String>) -> Self {
        self.format_spec = spec.into();
        self
    }

    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    pub fn log_mode(mut self, mode: LogMode) -> Self {
        self.log_mode = mode;
        self
    }

    pub fn include_timestamp(mut self, include: bool) -> Self {
        self.include_timestamp = include;
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Reads options from a JSON object. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| StopwatchError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|source| StopwatchError::Config { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StopwatchConfig::new();
        assert_eq!(config.label, None);
        assert_eq!(config.format_spec, "%.3f");
        assert_eq!(config.log_path, None);
        assert_eq!(config.log_mode, LogMode::Reset);
        assert!(!config.include_timestamp);
        assert!(!config.silent);
    }

    #[test]
    fn test_log_mode_is_permissive() {
        assert_eq!("reset".parse::<LogMode>(), Ok(LogMode::Reset));
        assert_eq!("append".parse::<LogMode>(), Ok(LogMode::Append));
        // Typos and other casings fall through to append.
        assert_eq!(LogMode::from("rest"), LogMode::Append);
        assert_eq!(LogMode::from("RESET"), LogMode::Append);
        assert_eq!(LogMode::from(""), LogMode::Append);
        assert_eq!(LogMode::Append.to_string(), "append");
    }

    #[test]
    fn test_json_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stopwatch.json");
        fs::write(&path, r#"{ "label": "Task", "log_mode": "apend", "silent": true }"#).unwrap();

        let config = StopwatchConfig::from_json_file(&path).unwrap();
        assert_eq!(config.label.as_deref(), Some("Task"));
        assert_eq!(config.log_mode, LogMode::Append);
        assert!(config.silent);
        assert_eq!(config.format_spec, "%.3f");
        assert!(!config.include_timestamp);
    }

    #[test]
    fn test_json_config_errors_carry_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ label: ").unwrap();
        match StopwatchConfig::from_json_file(&path) {
            Err(StopwatchError::Config { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected config error, got {:?}", other),
        }

        let missing = dir.path().join("missing.json");
        assert!(matches!(StopwatchConfig::from_json_file(&missing), Err(StopwatchError::Io { .. })));
    }
}
