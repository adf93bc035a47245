// src/stopwatch.rs
// Wall-clock stopwatch that prints timing checkpoints and optionally appends them to a log file.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local};

use crate::config::{LogMode, StopwatchConfig};
use crate::error::{Result, StopwatchError};
use crate::format::ElapsedFormat;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Measures wall-clock time from an anchor instant.
///
/// Unlike a drop-based tracer, a `Stopwatch` never emits anything on its own:
/// going out of scope prints and writes nothing. Call [`Stopwatch::log`] or
/// [`Stopwatch::record`] for every message you want.
#[derive(Debug)]
pub struct Stopwatch {
    config: StopwatchConfig,
    prefix: String,
    format: ElapsedFormat,
    log_path: Option<PathBuf>,
    started_at: DateTime<Local>,
}

impl Stopwatch {
    /// Creates a stopwatch anchored at the current time.
    ///
    /// If a log path is configured its parent directory is created, and with
    /// [`LogMode::Reset`] the file itself is truncated.
    pub fn new(config: StopwatchConfig) -> Result<Self> {
        let format = ElapsedFormat::parse(&config.format_spec)?;
        let prefix = config.label.as_deref().map(|l| format!("[{}]", l)).unwrap_or_default();
        let log_path = match config.log_path.as_deref().filter(|p| !p.as_os_str().is_empty()) {
            Some(path) => Some(absolute_log_path(path)?),
            None => None,
        };

        let started_at = Local::now();
        if let Some(path) = &log_path {
            prepare_log_file(path, config.log_mode)?;
        }

        Ok(Stopwatch { config, prefix, format, log_path, started_at })
    }

    /// Runs `work` with a fresh stopwatch and returns its result with the final
    /// elapsed seconds. Nothing is printed or written unless `work` asks for it.
    pub fn scope<T>(config: StopwatchConfig, work: impl FnOnce(&mut Stopwatch) -> T) -> Result<(T, f64)> {
        let mut stopwatch = Stopwatch::new(config)?;
        Ok(stopwatch.measure(work))
    }

    /// Runs `work` against this stopwatch, returning its result and the elapsed
    /// seconds (from the current anchor) once it finishes.
    pub fn measure<T>(&mut self, work: impl FnOnce(&mut Self) -> T) -> (T, f64) {
        let result = work(self);
        (result, self.elapsed())
    }

    /// Consumes the stopwatch and returns the final elapsed seconds.
    pub fn finish(self) -> f64 {
        self.elapsed()
    }

    /// Seconds since the anchor. Each call measures independently.
    pub fn elapsed(&self) -> f64 {
        self.elapsed_at(Local::now())
    }

    fn elapsed_at(&self, now: DateTime<Local>) -> f64 {
        let delta = now - self.started_at;
        match delta.num_nanoseconds() {
            Some(ns) => ns as f64 / 1e9,
            None => delta.num_milliseconds() as f64 / 1e3,
        }
    }

    /// Builds `[label] [timestamp] <elapsed> sec. <message>`, omitting absent parts.
    pub fn format_message(&self, message: Option<&str>) -> String {
        self.format_message_at(Local::now(), message)
    }

    fn format_message_at(&self, now: DateTime<Local>, message: Option<&str>) -> String {
        let timestamp = if self.config.include_timestamp {
            format!(" [{}]", now.format(TIMESTAMP_FORMAT))
        } else {
            String::new()
        };
        let elapsed = self.format.render(self.elapsed_at(now));
        format!("{}{} {} sec. {}", self.prefix, timestamp, elapsed, message.unwrap_or_default())
            .trim()
            .to_string()
    }

    /// Prints the message (unless silent) and appends it to the log file, if any.
    pub fn log(&self, message: Option<&str>) -> Result<()> {
        self.log_to(&mut io::stdout().lock(), message)
    }

    /// Same as [`Stopwatch::log`], printing to `out` instead of stdout.
    pub fn log_to<W: Write>(&self, out: &mut W, message: Option<&str>) -> Result<()> {
        let line = self.format_message(message);
        if !self.config.silent {
            writeln!(out, "{}", line).map_err(StopwatchError::Stdout)?;
        }
        if let Some(path) = &self.log_path {
            append_line(path, &line)?;
        }
        Ok(())
    }

    /// Prints the message regardless of `silent`. Never touches the log file.
    pub fn record(&self, message: Option<&str>) -> Result<()> {
        self.record_to(&mut io::stdout().lock(), message)
    }

    /// Same as [`Stopwatch::record`], printing to `out` instead of stdout.
    pub fn record_to<W: Write>(&self, out: &mut W, message: Option<&str>) -> Result<()> {
        let line = self.format_message(message);
        writeln!(out, "{}", line).map_err(StopwatchError::Stdout)
    }

    /// Moves the anchor to now.
    pub fn reset(&mut self) {
        self.started_at = Local::now();
        log::debug!("stopwatch {:?} reset at {}", self.prefix, self.started_at.format(TIMESTAMP_FORMAT));
    }

    pub fn label(&self) -> Option<&str> {
        self.config.label.as_deref()
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    pub fn log_mode(&self) -> LogMode {
        self.config.log_mode
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn config(&self) -> &StopwatchConfig {
        &self.config
    }
}

/// Makes `path` absolute and folds `.` and `..` lexically, without touching the file system.
fn absolute_log_path(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| StopwatchError::io(path, e))?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

fn prepare_log_file(path: &Path, mode: LogMode) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| StopwatchError::io(dir, e))?;
    }
    if mode == LogMode::Reset {
        fs::File::create(path).map_err(|e| StopwatchError::io(path, e))?;
        log::debug!("truncated stopwatch log {}", path.display());
    } else {
        log::debug!("appending stopwatch messages to {}", path.display());
    }
    Ok(())
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    // The handle is dropped before returning, on success or error.
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StopwatchError::io(path, e))?;
    writeln!(file, "{}", line).map_err(|e| StopwatchError::io(path, e))?;
    log::trace!("appended {} bytes to {}", line.len() + 1, path.display());
    Ok(())
}
