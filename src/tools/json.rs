//! JSON Execution Wrapper
//!
//! A convenience layer over the engine for tools that emit structured data:
//! validation, timeout, sanitization, and audit behavior are identical to
//! [`ToolExecutor::execute`], with an added attempt to parse stdout as JSON.

use super::error::ExecError;
use super::executor::{ExecutionRequest, ExecutionResult, ToolExecutor};
use serde::{Deserialize, Serialize};

/// Execution result extended with a stdout parse attempt.
///
/// When the command exited zero with non-blank stdout, exactly one of `json`
/// and `parse_error` is set. On any other outcome both are absent and the
/// caller inspects `exit_code`/`stderr` as with the plain engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonExecutionResult {
    #[serde(flatten)]
    pub execution: ExecutionResult,

    /// Parsed stdout, when it was valid JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<serde_json::Value>,

    /// Parse failure description. The raw stdout stays on `execution`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

impl ToolExecutor {
    /// Execute a command and attempt to parse its stdout as JSON
    ///
    /// # Errors
    ///
    /// Exactly the errors of [`ToolExecutor::execute`]. A parse failure is
    /// not an error; it is reported on the result.
    pub async fn execute_json(
        &self,
        request: ExecutionRequest,
    ) -> Result<JsonExecutionResult, ExecError> {
        let execution = self.execute(request).await?;

        let (json, parse_error) = if execution.exit_code == 0 && !execution.stdout.trim().is_empty()
        {
            match serde_json::from_str::<serde_json::Value>(&execution.stdout) {
                Ok(value) => (Some(value), None),
                Err(e) => (None, Some(format!("stdout is not valid JSON: {}", e))),
            }
        } else {
            (None, None)
        };

        Ok(JsonExecutionResult {
            execution,
            json,
            parse_error,
        })
    }
}
