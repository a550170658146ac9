//! Unit tests for the Engine logger host
//!
//! IMPORTANT: the logger slot is process-wide and shared across all tests.
//! Every test that swaps the logger is marked with #[serial], and assertions
//! only look at entries carrying the test's own source string.

use crate::galaxy3d::Engine;
use crate::galaxy3d::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn from_source(entries: &Arc<Mutex<Vec<LogEntry>>>, source: &str) -> Vec<LogEntry> {
    entries
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.source == source)
        .cloned()
        .collect()
}

// ============================================================================
// LOGGER SLOT
// ============================================================================

#[test]
#[serial]
fn test_default_logger_logs_without_panic() {
    Engine::reset_logger();
    Engine::log(LogSeverity::Info, "galaxy3d::EngineTest", "default sink".to_string());
}

#[test]
#[serial]
fn test_set_custom_logger() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    Engine::log(LogSeverity::Info, "galaxy3d::EngineTest::custom", "hello".to_string());
    Engine::log(LogSeverity::Warn, "galaxy3d::EngineTest::custom", "careful".to_string());

    let captured = from_source(&entries, "galaxy3d::EngineTest::custom");
    assert_eq!(captured.len(), 2);
    assert_eq!(captured[0].severity, LogSeverity::Info);
    assert_eq!(captured[0].message, "hello");
    assert!(captured[0].file.is_none());
    assert_eq!(captured[1].severity, LogSeverity::Warn);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_log_detailed_carries_location() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    crate::engine_error!("galaxy3d::EngineTest::detailed", "boom {}", 1);

    let captured = from_source(&entries, "galaxy3d::EngineTest::detailed");
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].message, "boom 1");
    assert!(captured[0].file.unwrap().ends_with("engine_tests.rs"));
    assert!(captured[0].line.is_some());

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);
    Engine::reset_logger();

    Engine::log(LogSeverity::Info, "galaxy3d::EngineTest::reset", "after reset".to_string());
    assert!(from_source(&entries, "galaxy3d::EngineTest::reset").is_empty());
}

// ============================================================================
// SEVERITY THRESHOLD
// ============================================================================

#[test]
#[serial]
fn test_min_severity_filters_entries() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);
    Engine::set_min_severity(LogSeverity::Warn);

    assert_eq!(Engine::min_severity(), LogSeverity::Warn);
    assert!(!Engine::is_enabled(LogSeverity::Info));
    assert!(Engine::is_enabled(LogSeverity::Error));

    crate::engine_trace!("galaxy3d::EngineTest::filter", "dropped");
    crate::engine_info!("galaxy3d::EngineTest::filter", "dropped");
    crate::engine_warn!("galaxy3d::EngineTest::filter", "kept");
    crate::engine_error!("galaxy3d::EngineTest::filter", "kept");

    let captured = from_source(&entries, "galaxy3d::EngineTest::filter");
    assert_eq!(captured.len(), 2);
    assert!(captured.iter().all(|e| e.severity >= LogSeverity::Warn));

    Engine::reset_logger();
    assert_eq!(Engine::min_severity(), LogSeverity::Trace);
}
