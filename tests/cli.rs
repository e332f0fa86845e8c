use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("toolgate").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("toolgate 0.1.0"));
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("toolgate").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Policy-gated command execution for agent tool calls",
        ));
}

#[test]
fn test_cli_exec_missing_command() {
    let mut cmd = Command::cargo_bin("toolgate").unwrap();
    cmd.arg("exec")
        .assert()
        .failure() // Should fail because 'command' argument is required
        .stderr(predicate::str::contains(
            "required arguments were not provided",
        ));
}

#[test]
fn test_cli_exec_echo() {
    let mut cmd = Command::cargo_bin("toolgate").unwrap();
    cmd.args(["exec", "echo", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"exit_code\": 0"));
}

#[test]
fn test_cli_check_path_rejects_outsider() {
    let mut cmd = Command::cargo_bin("toolgate").unwrap();
    cmd.args(["check-path", "/definitely/not/allowed"])
        .assert()
        .failure();
}
