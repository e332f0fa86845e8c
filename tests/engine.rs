//! End-to-end properties of the execution engine, exercised through the
//! public API only.

use std::collections::HashMap;
use tempfile::TempDir;
use toolgate::config::ExecutionConfig;
use toolgate::tools::{ExecError, ExecutionRequest, ToolExecutor, TIMEOUT_EXIT_CODE};

fn gate(workspace: &std::path::Path) -> ToolExecutor {
    ToolExecutor::new(ExecutionConfig {
        workspace_dir: workspace.display().to_string(),
        allowed_paths: vec![workspace.display().to_string()],
        ..ExecutionConfig::default()
    })
}

#[tokio::test]
async fn deny_list_wins_even_when_command_is_allow_listed() {
    let dir = TempDir::new().unwrap();
    let executor = ToolExecutor::new(ExecutionConfig {
        workspace_dir: dir.path().display().to_string(),
        allowed_paths: vec![dir.path().display().to_string()],
        allowed_commands: Some(vec!["rm".to_string(), "echo".to_string()]),
        denied_commands: vec!["rm".to_string()],
        ..ExecutionConfig::default()
    });

    let err = executor
        .execute(ExecutionRequest::new("rm").args(["-rf", "x"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ExecError::Unauthorized(_)));

    // the allow-listed, non-denied command still runs
    let result = executor
        .execute(ExecutionRequest::new("echo").args(["ok"]))
        .await
        .unwrap();
    assert_eq!(result.exit_code, 0);
}

#[tokio::test]
async fn traversal_working_dir_is_unauthorized() {
    let outer = TempDir::new().unwrap();
    std::fs::create_dir(outer.path().join("inner")).unwrap();
    let executor = gate(&outer.path().join("inner"));

    let err = executor
        .execute(ExecutionRequest::new("echo").working_dir("../"))
        .await
        .unwrap_err();
    assert!(matches!(err, ExecError::Unauthorized(_)));
}

#[tokio::test]
async fn excessive_timeout_is_invalid_argument() {
    let dir = TempDir::new().unwrap();
    let err = gate(dir.path())
        .execute(ExecutionRequest::new("echo").timeout_secs(100_000))
        .await
        .unwrap_err();
    assert!(matches!(err, ExecError::InvalidArgument(_)));
}

#[tokio::test]
async fn overrunning_command_reports_timeout_sentinel() {
    let dir = TempDir::new().unwrap();
    let result = gate(dir.path())
        .execute(ExecutionRequest::new("sleep").args(["30"]).timeout_secs(1))
        .await
        .unwrap();

    assert!(result.timed_out);
    assert_eq!(result.exit_code, TIMEOUT_EXIT_CODE);
}

#[tokio::test]
async fn completing_command_reports_real_exit_status() {
    let dir = TempDir::new().unwrap();
    let executor = gate(dir.path());

    let ok = executor
        .execute(ExecutionRequest::new("true"))
        .await
        .unwrap();
    assert!(!ok.timed_out);
    assert_eq!(ok.exit_code, 0);

    let failed = executor
        .execute(ExecutionRequest::new("false"))
        .await
        .unwrap();
    assert!(!failed.timed_out);
    assert_eq!(failed.exit_code, 1);
}

#[tokio::test]
async fn shell_metacharacters_are_inert_argument_bytes() {
    let dir = TempDir::new().unwrap();
    let result = gate(dir.path())
        .execute(ExecutionRequest::new("echo").args(["a", ";", "ls", "&&", "`id`"]))
        .await
        .unwrap();

    assert_eq!(result.exit_code, 0);
    assert!(result.stdout.contains("; ls && `id`"));
}

#[tokio::test]
async fn sanitized_errors_leak_nothing() {
    let secret_dir = "/very/secret/location";
    let dir = TempDir::new().unwrap();
    let executor = gate(dir.path());

    let err = executor
        .execute(ExecutionRequest::new("shred").args(["target"]))
        .await
        .unwrap_err();
    assert!(!err.to_string().contains("shred"));

    let err = executor
        .execute(ExecutionRequest::new("echo").working_dir(secret_dir))
        .await
        .unwrap_err();
    assert!(!err.to_string().contains(secret_dir));
}

#[tokio::test]
async fn json_wrapper_parses_and_preserves() {
    let dir = TempDir::new().unwrap();
    let executor = gate(dir.path());

    let parsed = executor
        .execute_json(ExecutionRequest::new("echo").args([r#"[1, 2, 3]"#]))
        .await
        .unwrap();
    assert!(parsed.parse_error.is_none());
    assert_eq!(parsed.json.unwrap()[2], 3);

    let unparsed = executor
        .execute_json(ExecutionRequest::new("echo").args(["plain text"]))
        .await
        .unwrap();
    assert!(unparsed.json.is_none());
    assert!(unparsed.parse_error.is_some());
    assert!(unparsed.execution.stdout.contains("plain text"));
}

#[tokio::test]
async fn correlation_id_round_trips() {
    let dir = TempDir::new().unwrap();
    let executor = gate(dir.path());

    let echoed = executor
        .execute(ExecutionRequest::new("echo").correlation_id("trace-me-7"))
        .await
        .unwrap();
    assert_eq!(echoed.correlation_id, "trace-me-7");

    let generated = executor
        .execute(ExecutionRequest::new("echo"))
        .await
        .unwrap();
    assert!(!generated.correlation_id.is_empty());
}

#[tokio::test]
async fn environment_overrides_reach_the_child() {
    let dir = TempDir::new().unwrap();
    let mut env = HashMap::new();
    env.insert("GATE_E2E_MARKER".to_string(), "through".to_string());

    let result = gate(dir.path())
        .execute(
            ExecutionRequest::new("printenv")
                .args(["GATE_E2E_MARKER"])
                .env(env),
        )
        .await
        .unwrap();

    assert_eq!(result.stdout.trim(), "through");
}
