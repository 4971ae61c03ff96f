//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger, and the
//! global dispatch path used by the scene_* macros.

use crate::log::{self, Logger, LogEntry, LogSeverity, DefaultLogger};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    // Test PartialOrd implementation
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_equality() {
    assert_eq!(LogSeverity::Info, LogSeverity::Info);
    assert_ne!(LogSeverity::Trace, LogSeverity::Debug);
    assert_ne!(LogSeverity::Info, LogSeverity::Error);
}

#[test]
fn test_log_severity_copy() {
    let sev1 = LogSeverity::Info;
    let sev2 = sev1; // Copy, not move
    assert_eq!(sev1, sev2);
    // Can still use sev1
    assert_eq!(sev1, LogSeverity::Info);
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_creation_without_file_line() {
    let entry = LogEntry {
        severity: LogSeverity::Info,
        timestamp: SystemTime::now(),
        source: "lumen::SceneGraph".to_string(),
        message: "Scene graph initialized".to_string(),
        file: None,
        line: None,
    };

    assert_eq!(entry.severity, LogSeverity::Info);
    assert_eq!(entry.source, "lumen::SceneGraph");
    assert_eq!(entry.message, "Scene graph initialized");
    assert!(entry.file.is_none());
    assert!(entry.line.is_none());
}

#[test]
fn test_log_entry_creation_with_file_line() {
    let entry = LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "lumen::SceneGraph".to_string(),
        message: "Rejected edit".to_string(),
        file: Some("scene_graph.rs"),
        line: Some(42),
    };

    assert_eq!(entry.file, Some("scene_graph.rs"));
    assert_eq!(entry.line, Some(42));
}

#[test]
fn test_log_entry_clone() {
    let entry = LogEntry {
        severity: LogSeverity::Warn,
        timestamp: SystemTime::now(),
        source: "lumen::GeometryStore".to_string(),
        message: "message".to_string(),
        file: None,
        line: None,
    };
    let cloned = entry.clone();
    assert_eq!(cloned.severity, entry.severity);
    assert_eq!(cloned.source, entry.source);
    assert_eq!(cloned.message, entry.message);
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_does_not_panic() {
    let logger = DefaultLogger;
    logger.log(&LogEntry {
        severity: LogSeverity::Debug,
        timestamp: SystemTime::now(),
        source: "lumen::test".to_string(),
        message: "no panic expected".to_string(),
        file: None,
        line: None,
    });
    logger.log(&LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "lumen::test".to_string(),
        message: "with location".to_string(),
        file: Some("log_tests.rs"),
        line: Some(1),
    });
}

// ============================================================================
// GLOBAL DISPATCH TESTS
// ============================================================================

/// Captures entries into a shared vector for assertions.
struct CapturingLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CapturingLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn install_capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    log::set_logger(Box::new(CapturingLogger {
        entries: entries.clone(),
    }));
    entries
}

#[test]
#[serial]
fn test_dispatch_reaches_installed_logger() {
    let entries = install_capture();

    log::dispatch(LogSeverity::Info, "lumen::test", "hello".to_string());

    // Other tests may log concurrently; only look at our own entries
    let captured = entries.lock().unwrap();
    let ours: Vec<_> = captured.iter().filter(|e| e.source == "lumen::test").collect();
    assert_eq!(ours.len(), 1);
    assert_eq!(ours[0].severity, LogSeverity::Info);
    assert_eq!(ours[0].message, "hello");
    assert!(ours[0].file.is_none());

    drop(captured);
    log::set_logger(Box::new(DefaultLogger));
}

#[test]
#[serial]
fn test_dispatch_detailed_includes_location() {
    let entries = install_capture();

    log::dispatch_detailed(
        LogSeverity::Error,
        "lumen::test",
        "boom".to_string(),
        "somefile.rs",
        7,
    );

    let captured = entries.lock().unwrap();
    let ours: Vec<_> = captured.iter().filter(|e| e.source == "lumen::test").collect();
    assert_eq!(ours.len(), 1);
    assert_eq!(ours[0].file, Some("somefile.rs"));
    assert_eq!(ours[0].line, Some(7));

    drop(captured);
    log::set_logger(Box::new(DefaultLogger));
}

#[test]
#[serial]
fn test_macros_route_through_global_logger() {
    let entries = install_capture();

    crate::scene_trace!("lumen::test", "t");
    crate::scene_debug!("lumen::test", "d {}", 1);
    crate::scene_info!("lumen::test", "i");
    crate::scene_warn!("lumen::test", "w");
    crate::scene_error!("lumen::test", "e");

    let captured = entries.lock().unwrap();
    let ours: Vec<_> = captured.iter().filter(|e| e.source == "lumen::test").collect();
    assert_eq!(ours.len(), 5);
    assert_eq!(ours[0].severity, LogSeverity::Trace);
    assert_eq!(ours[1].severity, LogSeverity::Debug);
    assert_eq!(ours[1].message, "d 1");
    assert_eq!(ours[2].severity, LogSeverity::Info);
    assert_eq!(ours[3].severity, LogSeverity::Warn);
    assert_eq!(ours[4].severity, LogSeverity::Error);
    // Only the error macro carries file:line
    assert!(ours[3].file.is_none());
    assert!(ours[4].file.is_some());

    drop(captured);
    log::set_logger(Box::new(DefaultLogger));
}
