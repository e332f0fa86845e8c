//! Failure taxonomy for the execution engine.
//!
//! A timeout is not represented here: it is an expected outcome encoded on
//! [`crate::tools::ExecutionResult`] (`timed_out = true`, sentinel exit code)
//! that callers must branch on, not an exceptional condition.

use thiserror::Error;

/// Error types for tool execution
#[derive(Debug, Error)]
pub enum ExecError {
    /// Command denied by policy, or working directory resolves outside every
    /// allowed root. Never retried.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed request, e.g. requested timeout above the configured
    /// ceiling. Fails before any process is spawned.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Working directory does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The program could not be started at all (binary missing, permission
    /// denied). Distinct from a non-zero exit, which is a normal outcome
    /// carried in `exit_code`.
    #[error("execution failure: {0}")]
    ExecutionFailure(String),
}

impl ExecError {
    /// Stable label used in audit records.
    pub fn kind(&self) -> &'static str {
        match self {
            ExecError::Unauthorized(_) => "unauthorized",
            ExecError::InvalidArgument(_) => "invalid_argument",
            ExecError::NotFound(_) => "not_found",
            ExecError::ExecutionFailure(_) => "execution_failure",
        }
    }

    /// The message payload without the taxonomy prefix.
    pub fn message(&self) -> &str {
        match self {
            ExecError::Unauthorized(m)
            | ExecError::InvalidArgument(m)
            | ExecError::NotFound(m)
            | ExecError::ExecutionFailure(m) => m,
        }
    }
}
