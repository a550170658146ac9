/// Galaxy3D Engine - process-wide services for the culling core
///
/// The culling structures themselves are plain owned values (a `Culler` is
/// owned by its `SceneRenderer`), so the only global state left is the
/// logger slot and its severity threshold.

use std::sync::{OnceLock, RwLock};
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::SystemTime;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Entries below this severity are dropped before reaching the logger
static MIN_SEVERITY: AtomicU8 = AtomicU8::new(0);

fn logger_slot() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

fn severity_rank(severity: LogSeverity) -> u8 {
    match severity {
        LogSeverity::Trace => 0,
        LogSeverity::Debug => 1,
        LogSeverity::Info => 2,
        LogSeverity::Warn => 3,
        LogSeverity::Error => 4,
    }
}

fn severity_from_rank(rank: u8) -> LogSeverity {
    match rank {
        0 => LogSeverity::Trace,
        1 => LogSeverity::Debug,
        2 => LogSeverity::Info,
        3 => LogSeverity::Warn,
        _ => LogSeverity::Error,
    }
}

// ===== PUBLIC API =====

/// Engine-wide services
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_culling::galaxy3d::Engine;
/// use galaxy_3d_culling::galaxy3d::log::LogSeverity;
///
/// // Silence per-operation octree tracing
/// Engine::set_min_severity(LogSeverity::Info);
/// ```
pub struct Engine;

impl Engine {
    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation (file logger,
    /// test capture, etc.)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use galaxy_3d_culling::galaxy3d::Engine;
    /// use galaxy_3d_culling::galaxy3d::log::{Logger, LogEntry};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = logger_slot().write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger) and clear the severity threshold
    pub fn reset_logger() {
        if let Ok(mut lock) = logger_slot().write() {
            *lock = Box::new(DefaultLogger);
        }
        MIN_SEVERITY.store(severity_rank(LogSeverity::Trace), Ordering::Relaxed);
    }

    /// Drop every entry less severe than `severity`
    pub fn set_min_severity(severity: LogSeverity) {
        MIN_SEVERITY.store(severity_rank(severity), Ordering::Relaxed);
    }

    /// Current severity threshold
    pub fn min_severity() -> LogSeverity {
        severity_from_rank(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    /// Whether an entry of this severity would reach the logger
    pub fn is_enabled(severity: LogSeverity) -> bool {
        severity_rank(severity) >= MIN_SEVERITY.load(Ordering::Relaxed)
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    ///
    /// # Arguments
    ///
    /// * `severity` - Log severity level
    /// * `source` - Source module (e.g., "galaxy3d::OcTreeCuller")
    /// * `message` - Log message
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(severity, source, message, None, None);
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by engine_error! macro to include source location.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(severity, source, message, Some(file), Some(line));
    }

    fn dispatch(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: Option<&'static str>,
        line: Option<u32>,
    ) {
        if !Self::is_enabled(severity) {
            return;
        }
        if let Ok(lock) = logger_slot().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file,
                line,
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
