//! Logging for the Galaxy3D culling core
//!
//! - Pluggable sink via the `Logger` trait (the engine owns one global slot)
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default
//! - File and line information attached to ERROR entries

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Sink for log entries
///
/// Install a custom sink with `Engine::set_logger` (file logging,
/// in-game console, test capture, ...).
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_culling::galaxy3d::log::{Logger, LogEntry};
///
/// struct CountingLogger;
///
/// impl Logger for CountingLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Forward to a profiler overlay...
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Handle one entry
    fn log(&self, entry: &LogEntry);
}

/// Log entry handed to the active `Logger`
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level
    pub severity: LogSeverity,

    /// Creation time
    pub timestamp: SystemTime,

    /// Emitting component (e.g. "galaxy3d::OcTreeCuller")
    pub source: String,

    /// Formatted message
    pub message: String,

    /// Source file (ERROR entries only)
    pub file: Option<&'static str>,

    /// Source line (ERROR entries only)
    pub line: Option<u32>,
}

/// Log severity levels, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-operation detail (octree splits, lookup misses)
    Trace,

    /// Development information
    Debug,

    /// Lifecycle events (culler created, camera changed)
    Info,

    /// Recoverable problems (overflow placement, degenerate frustum)
    Warn,

    /// Misuse reported back to the caller as an `Error`
    Error,
}

impl LogSeverity {
    /// Fixed-width label used in console output
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }
}

/// Render an entry as a single uncolored line.
///
/// Format: `[timestamp] [SEVERITY] [source] message`, with ` (file:line)`
/// appended when the entry carries a location.
pub fn format_entry(entry: &LogEntry) -> String {
    let datetime: DateTime<Local> = entry.timestamp.into();
    let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f");

    let mut line = format!(
        "[{}] [{}] [{}] {}",
        timestamp,
        entry.severity.label(),
        entry.source,
        entry.message
    );
    if let (Some(file), Some(src_line)) = (entry.file, entry.line) {
        line.push_str(&format!(" ({}:{})", file, src_line));
    }
    line
}

/// Default logger: colored console output
///
/// Colors:
/// - Trace: bright black
/// - Debug: cyan
/// - Info: green
/// - Warn: yellow
/// - Error: bold red
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let label = entry.severity.label();
        let severity_str = match entry.severity {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        };
        let source = entry.source.bright_blue();

        match (entry.file, entry.line) {
            (Some(file), Some(line)) => println!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, severity_str, source, entry.message, file, line
            ),
            _ => println!(
                "[{}] [{}] [{}] {}",
                timestamp, severity_str, source, entry.message
            ),
        }
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message
///
/// ```ignore
/// engine_trace!("galaxy3d::OcTree", "Split cell at depth {}", depth);
/// ```
#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::galaxy3d::Engine::log(
            $crate::galaxy3d::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message
#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::galaxy3d::Engine::log(
            $crate::galaxy3d::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message
#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::galaxy3d::Engine::log(
            $crate::galaxy3d::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message
///
/// ```ignore
/// engine_warn!("galaxy3d::OcTreeCuller", "{} elements in overflow", count);
/// ```
#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::galaxy3d::Engine::log(
            $crate::galaxy3d::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::galaxy3d::Engine::log_detailed(
            $crate::galaxy3d::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
