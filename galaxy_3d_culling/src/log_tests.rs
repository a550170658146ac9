//! Unit tests for log.rs
//!
//! Tests LogSeverity, LogEntry, format_entry and DefaultLogger.

use crate::log::{format_entry, DefaultLogger, LogEntry, LogSeverity, Logger};
use std::time::SystemTime;

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "galaxy3d::OcTreeCuller".to_string(),
        message: "Visible set rebuilt".to_string(),
        file,
        line,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_labels_are_fixed_width() {
    let all = [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ];
    for severity in all {
        assert_eq!(severity.label().len(), 5);
    }
    assert_eq!(LogSeverity::Warn.label(), "WARN ");
}

// ============================================================================
// FORMAT TESTS
// ============================================================================

#[test]
fn test_format_entry_without_location() {
    let line = format_entry(&entry(LogSeverity::Info, None, None));
    assert!(line.contains("[INFO ]"));
    assert!(line.contains("[galaxy3d::OcTreeCuller]"));
    assert!(line.ends_with("Visible set rebuilt"));
}

#[test]
fn test_format_entry_with_location() {
    let line = format_entry(&entry(LogSeverity::Error, Some("octree.rs"), Some(42)));
    assert!(line.contains("[ERROR]"));
    assert!(line.ends_with("(octree.rs:42)"));
}

#[test]
fn test_format_entry_timestamp_shape() {
    let line = format_entry(&entry(LogSeverity::Debug, None, None));
    // [YYYY-MM-DD HH:MM:SS.mmm]
    let stamp_end = line.find(']').unwrap();
    assert_eq!(stamp_end, 24);
}

// ============================================================================
// DEFAULT LOGGER
// ============================================================================

#[test]
fn test_default_logger_handles_all_severities() {
    let logger = DefaultLogger;
    logger.log(&entry(LogSeverity::Trace, None, None));
    logger.log(&entry(LogSeverity::Warn, None, None));
    logger.log(&entry(LogSeverity::Error, Some("file.rs"), Some(1)));
}
