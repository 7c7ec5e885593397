use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::prelude::*;

/// Tests that `--help` is handled successfully by the CLI.
///
/// This test verifies:
/// 1. Running `jambcbt-cli --help` exits successfully
/// 2. The help text is written to stdout (captured and printed for visibility)
/// 3. No unexpected stderr output is produced
#[test]
fn test_cli_help_success() {
    let mut cmd = cargo_bin_cmd!("jambcbt-cli");

    let assert = cmd.arg("--help").assert().success();

    let out = assert.get_output();
    println!(
        "=== jambcbt-cli --help stdout ===\n\n{}\n=================================",
        String::from_utf8_lossy(&out.stdout)
    );

    assert!(
        !out.stdout.is_empty(),
        "expected non-empty stdout for --help"
    );
    assert!(
        out.stderr.is_empty(),
        "expected empty stderr for --help, got:\n{}",
        String::from_utf8_lossy(&out.stderr)
    );
}

/// Tests that every subcommand advertises its own help
#[test]
fn test_subcommand_help() {
    for subcommand in ["question", "flashcard", "ai", "session", "practice"] {
        let mut cmd = cargo_bin_cmd!("jambcbt-cli");
        cmd.arg(subcommand).arg("--help").assert().success();
    }
}

/// Tests that a connection failure against an unreachable server is
/// reported as an error rather than a panic
#[test]
fn test_unreachable_server_reports_error() {
    let mut cmd = cargo_bin_cmd!("jambcbt-cli");
    let assert = cmd
        .arg("--server-url")
        .arg("http://127.0.0.1:1")
        .arg("question")
        .arg("stats")
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(
        stderr.contains("Error:"),
        "expected a formatted error on stderr, got:\n{}",
        stderr
    );
}
