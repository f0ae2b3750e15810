//! Command-line contract tests
//!
//! These run the built binary; every case stays off the browser, either by
//! failing validation or by using --dry-run.

use std::process::{Command, Output};

fn tm_harvest(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tm-harvest"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("CHROMIUM_REMOTE_DEBUGGING_URL")
        .output()
        .expect("failed to run tm-harvest")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_help_exits_zero() {
    let output = tm_harvest(&["--help"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("--start-date"));
}

#[test]
fn test_version_exits_zero() {
    let output = tm_harvest(&["--version"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_missing_dates_exit_one() {
    assert_eq!(tm_harvest(&[]).status.code(), Some(1));
    assert_eq!(tm_harvest(&["2024-01-01"]).status.code(), Some(1));
}

#[test]
fn test_malformed_date_exits_one() {
    let output = tm_harvest(&["2024-13-01", "2024-01-31", "--dry-run"]);
    assert_eq!(output.status.code(), Some(1));

    let output = tm_harvest(&["2024/01/01", "2024-01-31", "--dry-run"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_start_after_end_exits_one() {
    let output = tm_harvest(&["2024-02-01", "2024-01-01", "--dry-run"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_usage_errors_exit_one() {
    assert_eq!(tm_harvest(&["--no-such-flag"]).status.code(), Some(1));

    // A date may be given positionally or by flag, not both
    let output = tm_harvest(&["2024-01-01", "2024-01-31", "--start-date", "2024-01-02"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_dates_only_dry_run_succeeds() {
    let output = tm_harvest(&["2024-01-01", "2024-01-31", "--dry-run"]);

    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    assert!(text.contains("Window: 2024-01-01 .. 2024-01-31"));
    assert!(text.contains("Configuration is valid"));
}

#[test]
fn test_flag_form_dates() {
    let output = tm_harvest(&[
        "--start-date=2024-03-01",
        "--end-date=2024-03-31",
        "--dry-run",
        "-o",
        "march.json",
    ]);

    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    assert!(text.contains("Window: 2024-03-01 .. 2024-03-31"));
    assert!(text.contains("Output: march.json"));
}

#[test]
fn test_search_url_override_is_validated() {
    let output = tm_harvest(&[
        "2024-01-01",
        "2024-01-31",
        "--dry-run",
        "--search-url",
        "ftp://portal.test/search",
    ]);
    assert_eq!(output.status.code(), Some(1));

    let output = tm_harvest(&[
        "2024-01-01",
        "2024-01-31",
        "--dry-run",
        "--search-url",
        "https://portal.test/search",
    ]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Search URL: https://portal.test/search"));
}
