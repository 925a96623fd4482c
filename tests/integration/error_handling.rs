// tests/integration/error_handling.rs

#[path = "../common/mod.rs"]
mod common;
use crate::common::{count_entries, init_tracing};

use std::io::Write;
use std::time::Duration;

use extparse::config::load_and_validate;
use extparse::errors::ExtparseError;
use extparse::exec::ExecutionContext;
use extparse::{CommandTemplate, CompletionPolicy, ExternalExtractor, INPUT_TOKEN, OUTPUT_TOKEN};
use tempfile::NamedTempFile;

#[test]
fn malformed_pattern_is_reported_at_load_time() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[parser.probe]
command = ["probe", "${{INPUT}}"]

[[parser.probe.metadata]]
pattern = "([unterminated"
field = "broken"
"#
    )
    .unwrap();

    match load_and_validate(file.path()) {
        Err(ExtparseError::InvalidPattern { pattern, .. }) => {
            assert_eq!(pattern, "([unterminated");
        }
        Err(e) => panic!("Expected InvalidPattern error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unknown_keys_are_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[parser.probe]
command = ["probe"]
wait = true
"#
    )
    .unwrap();

    match load_and_validate(file.path()) {
        Err(ExtparseError::TomlError(_)) => {}
        Err(e) => panic!("Expected TomlError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unknown_completion_policy_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[default]
completion = "eventually"

[parser.probe]
command = ["probe"]
"#
    )
    .unwrap();

    assert!(matches!(
        load_and_validate(file.path()),
        Err(ExtparseError::TomlError(_))
    ));
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_and_validate(dir.path().join("absent.toml")),
        Err(ExtparseError::IoError(_))
    ));
}

#[tokio::test]
async fn launch_failure_is_fatal_and_cleans_artifacts() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let ctx = ExecutionContext::new().with_temp_dir(dir.path());
    let parser = ExternalExtractor::new(
        CommandTemplate::new(["/no/such/extparse-tool", INPUT_TOKEN, OUTPUT_TOKEN]).unwrap(),
    );

    let result = parser
        .extract(std::io::Cursor::new(b"payload".to_vec()), &ctx)
        .await;

    match result {
        Err(ExtparseError::Launch { program, .. }) => {
            assert_eq!(program, "/no/such/extparse-tool")
        }
        other => panic!("Expected Launch error, got: {:?}", other),
    }
    assert_eq!(count_entries(dir.path()), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn waiting_timeout_kills_tool_and_cleans_artifacts() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let ctx = ExecutionContext::new().with_temp_dir(dir.path());
    let parser = ExternalExtractor::new(
        CommandTemplate::new(["sh", "-c", "sleep 5", "sh", INPUT_TOKEN]).unwrap(),
    )
    .with_policy(CompletionPolicy::Waiting)
    .with_timeout(Some(Duration::from_millis(100)));

    let started = std::time::Instant::now();
    let result = parser
        .extract(std::io::Cursor::new(b"payload".to_vec()), &ctx)
        .await;

    match result {
        Err(ExtparseError::Timeout(limit)) => assert_eq!(limit, Duration::from_millis(100)),
        other => panic!("Expected Timeout error, got: {:?}", other),
    }
    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(count_entries(dir.path()), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn unreadable_output_artifact_is_drain_error_and_cleans_artifacts() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let ctx = ExecutionContext::new().with_temp_dir(dir.path());
    // The tool swaps its output file for a directory, which cannot be read back.
    let parser = ExternalExtractor::new(
        CommandTemplate::new(["sh", "-c", "rm \"$1\" && mkdir \"$1\"", "sh", OUTPUT_TOKEN])
            .unwrap(),
    )
    .with_policy(CompletionPolicy::Waiting);

    let result = parser
        .extract(std::io::Cursor::new(b"payload".to_vec()), &ctx)
        .await;

    match result {
        Err(ExtparseError::Drain(_)) => {}
        other => panic!("Expected Drain error, got: {:?}", other),
    }
    assert_eq!(count_entries(dir.path()), 0);
}
