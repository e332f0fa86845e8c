//! Command Validation Module
//!
//! This module decides whether a requested program name may run. It evaluates
//! a deny-list and an optional allow-list over bare program names, with
//! deny-wins precedence: a command present in both lists is rejected, so an
//! operator mistake cannot grant access to a dangerous command.
//!
//! Arguments are deliberately not inspected here. Shell metacharacters in
//! arguments are harmless because the engine launches programs by argv vector
//! and never hands a command line to a shell.

use super::error::ExecError;
use crate::config::ExecutionConfig;
use std::collections::HashSet;
use std::path::Path;

/// Command validator that enforces allow/deny policy
#[derive(Debug, Clone)]
pub struct CommandValidator {
    /// Opt-in allow-list. `None` or empty means every command passes the
    /// allow check.
    allowed: Option<HashSet<String>>,

    /// Deny-list. Always evaluated first.
    denied: HashSet<String>,
}

impl CommandValidator {
    /// Create a validator from explicit lists
    pub fn new(allowed: Option<Vec<String>>, denied: Vec<String>) -> Self {
        Self {
            allowed: allowed.map(|list| list.into_iter().collect()),
            denied: denied.into_iter().collect(),
        }
    }

    /// Create a validator from the execution policy
    pub fn from_config(config: &ExecutionConfig) -> Self {
        Self::new(
            config.allowed_commands.clone(),
            config.denied_commands.clone(),
        )
    }

    /// Validate a program name against the policy
    ///
    /// Matching is exact and case-sensitive on the base program name, never
    /// on the full argument string.
    ///
    /// # Errors
    ///
    /// Returns `ExecError::Unauthorized` if the name is path-shaped, denied,
    /// or absent from a non-empty allow-list.
    pub fn validate(&self, command: &str) -> Result<(), ExecError> {
        self.check_name_shape(command)?;

        if self.denied.contains(command) {
            return Err(ExecError::Unauthorized(format!(
                "command '{}' is denied by policy",
                command
            )));
        }

        if let Some(allowed) = &self.allowed {
            if !allowed.is_empty() && !allowed.contains(command) {
                return Err(ExecError::Unauthorized(format!(
                    "command '{}' is not in the allow-list",
                    command
                )));
            }
        }

        Ok(())
    }

    /// Check whether a command is permitted by the policy
    pub fn is_allowed(&self, command: &str) -> bool {
        self.validate(command).is_ok()
    }

    /// Reject program names that are paths rather than bare names.
    ///
    /// A path-shaped name would let a caller sidestep list matching with
    /// `/bin/rm` or `../rm`.
    fn check_name_shape(&self, command: &str) -> Result<(), ExecError> {
        let path = Path::new(command);

        if path.is_absolute() || command.contains('/') || command.contains('\\') {
            return Err(ExecError::Unauthorized(format!(
                "command '{}' must be a bare program name, not a path",
                command
            )));
        }

        if command.contains("..") {
            return Err(ExecError::Unauthorized(format!(
                "command '{}' contains directory traversal",
                command
            )));
        }

        Ok(())
    }
}
