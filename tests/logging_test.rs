use etl_pipeline::logging::init_logging;
use std::fs;
use tempfile::tempdir;

// The subscriber is process-wide, so everything about it is checked in one test.
#[test]
fn test_dual_sink_logging_is_installed_once() {
    let dir = tempdir().unwrap();
    let log_dir = dir.path().join("logs/nested");

    let logging = init_logging(&log_dir).unwrap();
    assert!(log_dir.is_dir());
    assert!(logging.writes_file());
    let file_name = logging.log_file().file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("pipeline_") && file_name.ends_with(".log"));

    tracing::info!("first message");
    tracing::debug!("hidden below info");

    // Second call hands back the running logger instead of adding sinks
    let again = init_logging(&log_dir).unwrap();
    assert_eq!(again, logging);

    let other_dir = dir.path().join("elsewhere");
    let other = init_logging(&other_dir).unwrap();
    assert_eq!(other.log_file(), logging.log_file());

    tracing::info!("second message");

    let contents = fs::read_to_string(logging.log_file()).unwrap();
    let lines: Vec<&str> = contents.lines().filter(|l| l.contains("message")).collect();
    assert_eq!(lines.len(), 2, "unexpected log contents: {}", contents);
    assert!(lines[0].ends_with(" - logging_test - INFO - first message"));
    assert!(lines[1].ends_with(" - logging_test - INFO - second message"));
    assert!(!contents.contains("hidden below info"));
}
