//! Caller-visible error sanitization.
//!
//! When `sanitize_error_messages` is enabled, diagnostic text returned to the
//! caller collapses to a fixed phrase per failure context: no attempted path,
//! no command name, no underlying OS error text. Command stdout/stderr are
//! never touched here.
//!
//! This is a different policy from audit redaction (`audit::redact_secrets`),
//! which applies to the audit trail unconditionally. Keeping the two as
//! separate passes means disabling one cannot disable the other.

use super::error::ExecError;

pub(crate) const MSG_COMMAND_DENIED: &str = "command is not permitted";
pub(crate) const MSG_DIRECTORY_DENIED: &str = "working directory is not permitted";
pub(crate) const MSG_DIRECTORY_MISSING: &str = "working directory does not exist";
pub(crate) const MSG_TIMEOUT_LIMIT: &str = "requested timeout exceeds the configured limit";
pub(crate) const MSG_EXECUTION_FAILED: &str = "command could not be executed";

/// The failure site an error came from, used to pick the generic phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureContext {
    CommandDenied,
    DirectoryDenied,
    DirectoryMissing,
    TimeoutLimit,
    SpawnFailure,
}

impl FailureContext {
    fn phrase(self) -> &'static str {
        match self {
            FailureContext::CommandDenied => MSG_COMMAND_DENIED,
            FailureContext::DirectoryDenied => MSG_DIRECTORY_DENIED,
            FailureContext::DirectoryMissing => MSG_DIRECTORY_MISSING,
            FailureContext::TimeoutLimit => MSG_TIMEOUT_LIMIT,
            FailureContext::SpawnFailure => MSG_EXECUTION_FAILED,
        }
    }

    /// Derive the context for a path-validation error from its variant.
    pub(crate) fn for_path_error(err: &ExecError) -> Self {
        match err {
            ExecError::NotFound(_) => FailureContext::DirectoryMissing,
            ExecError::Unauthorized(_) => FailureContext::DirectoryDenied,
            _ => FailureContext::SpawnFailure,
        }
    }
}

/// Rewrite an error's message to the context's fixed phrase.
///
/// The taxonomy variant is preserved so callers can still branch on the
/// failure class. When sanitization is disabled the original message passes
/// through unchanged.
pub fn sanitize(err: ExecError, context: FailureContext, enabled: bool) -> ExecError {
    if !enabled {
        return err;
    }

    let phrase = context.phrase().to_string();
    match err {
        ExecError::Unauthorized(_) => ExecError::Unauthorized(phrase),
        ExecError::InvalidArgument(_) => ExecError::InvalidArgument(phrase),
        ExecError::NotFound(_) => ExecError::NotFound(phrase),
        ExecError::ExecutionFailure(_) => ExecError::ExecutionFailure(phrase),
    }
}
