//! Tool Execution Subsystem
//!
//! This module provides policy-gated subprocess execution for agent tool
//! calls. It enforces strict security measures to prevent shell injection
//! attacks and filesystem escapes.
//!
//! # Security Features
//!
//! - **Deny/allow policy**: command names are matched against a deny-list
//!   (always wins) and an optional opt-in allow-list
//! - **List invocation**: programs are executed as argument vectors, never
//!   through a shell
//! - **Directory containment**: working directories are canonicalized and
//!   must resolve inside an approved set of roots
//! - **Timeout enforcement**: every execution races a timer; overruns are
//!   forcibly terminated, process group included
//! - **Redacted auditing**: every attempt is recorded with credential-shaped
//!   substrings replaced
//!
//! # Architecture
//!
//! - `validator.rs`: command allow/deny validation
//! - `paths.rs`: working-directory containment
//! - `executor.rs`: subprocess execution with timeout handling
//! - `sanitize.rs`: caller-visible error sanitization
//! - `audit.rs`: audit records and secret redaction
//! - `json.rs`: JSON-parsing execution wrapper
//! - `probe.rs`: external tool discovery
//!
//! # Example
//!
//! ```no_run
//! use toolgate::config::ExecutionConfig;
//! use toolgate::tools::{ExecutionRequest, ToolExecutor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let executor = ToolExecutor::new(ExecutionConfig::default());
//!
//!     let request = ExecutionRequest::new("git").args(["status", "--short"]);
//!     let result = executor.execute(request).await?;
//!     println!("exit code: {}", result.exit_code);
//!     println!("stdout: {}", result.stdout);
//!
//!     Ok(())
//! }
//! ```

mod audit;
mod error;
mod executor;
mod json;
mod paths;
mod probe;
mod sanitize;
mod validator;

pub use audit::{redact_secrets, AuditRecorder, AUDIT_TARGET};
pub use error::ExecError;
pub use executor::{
    ExecutionRequest, ExecutionResult, ToolExecutor, DEFAULT_TIMEOUT_SECS, TIMEOUT_EXIT_CODE,
};
pub use json::JsonExecutionResult;
pub use paths::resolve_working_dir;
pub use probe::{probe_tool, ToolDescriptor, KNOWN_TOOLS};
pub use validator::CommandValidator;
