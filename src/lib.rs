// stopwatch - lib.rs
// Elapsed-time checkpoints, printed and optionally appended to a log file.

pub mod config;
pub mod error;
pub mod format;
pub mod stopwatch;

// Re-export the main types for easier access.
pub use self::config::{LogMode, StopwatchConfig};
pub use self::error::{FormatError, Result, StopwatchError};
pub use self::format::ElapsedFormat;
pub use self::stopwatch::Stopwatch;
