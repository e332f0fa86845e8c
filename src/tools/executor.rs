//! Tool Executor
//!
//! This module provides secure subprocess execution for agent tool calls.
//! Programs are launched by name and argument vector directly, never through
//! a shell: characters such as `;`, `|`, `&&` or backticks arrive at the
//! child as literal argument bytes and can have no special effect.
//!
//! Each call validates the command and working directory against the policy,
//! races the child against its timeout, and emits one redacted audit record
//! whether the attempt executed or was rejected.

use super::audit::AuditRecorder;
use super::error::ExecError;
use super::paths;
use super::sanitize::{self, FailureContext};
use super::validator::CommandValidator;
use crate::config::ExecutionConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command as TokioCommand};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Default timeout for tool execution in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Sentinel exit code reserved for timeout-induced termination. It never
/// occurs from a real process exit: unix signal deaths map to 128+N.
pub const TIMEOUT_EXIT_CODE: i32 = -1;

/// Grace period for process teardown and output collection after a kill
const KILL_GRACE: Duration = Duration::from_secs(2);

/// A single execution request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Program name (not a path, not a shell line)
    pub command: String,

    /// Arguments, passed to the child individually and literally
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory, absolute or relative to the workspace base.
    /// Defaults to the workspace base when absent.
    #[serde(default)]
    pub working_dir: Option<String>,

    /// Requested timeout in seconds, clamped against the policy ceiling
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra environment variables for the child
    #[serde(default)]
    pub env: Option<HashMap<String, String>>,

    /// Caller-supplied correlation identifier; generated when absent
    #[serde(default)]
    pub correlation_id: Option<String>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ExecutionRequest {
    /// Create a request with default timeout and no arguments
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            working_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            env: None,
            correlation_id: None,
        }
    }

    /// Set the argument vector
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the working directory
    pub fn working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set the requested timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set extra environment variables
    pub fn env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    /// Set the correlation identifier
    pub fn correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Command line joined for display and audit only. Execution always uses
    /// the argument vector.
    pub(crate) fn display_command(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Result of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Captured standard output, complete and unmerged
    pub stdout: String,

    /// Captured standard error, complete and unmerged
    pub stderr: String,

    /// The process's real exit code, or [`TIMEOUT_EXIT_CODE`] on timeout
    pub exit_code: i32,

    /// Whether the engine forcibly terminated the process
    pub timed_out: bool,

    /// Wall-clock execution duration in milliseconds
    pub duration_ms: u64,

    /// Correlation identifier, echoed from the request or generated
    pub correlation_id: String,
}

impl ExecutionResult {
    /// Whether the process ran to completion with a zero exit code
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }
}

/// Tool executor for policy-gated subprocess execution
///
/// # Security
///
/// 1. Programs launch via `tokio::process::Command` with an argument vector,
///    never a shell
/// 2. Command names are checked against the deny/allow policy before launch
/// 3. Working directories are canonicalized and contained to allowed roots
/// 4. Timeouts are enforced with forced termination of the process group
///
/// The executor holds no mutable state beyond the immutable policy, so a
/// single instance may serve any number of concurrent calls.
#[derive(Debug)]
pub struct ToolExecutor {
    config: ExecutionConfig,
    validator: CommandValidator,
    audit: AuditRecorder,
}

impl ToolExecutor {
    /// Create an executor from an execution policy
    pub fn new(config: ExecutionConfig) -> Self {
        let validator = CommandValidator::from_config(&config);
        let audit = AuditRecorder::new(config.enable_audit_logging);
        Self {
            config,
            validator,
            audit,
        }
    }

    /// The policy this executor enforces
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Execute a command and return the result
    ///
    /// A timeout is not an error: it is reported as `timed_out = true` with
    /// the sentinel exit code. A non-zero exit code is likewise a normal
    /// outcome carried on the result.
    ///
    /// # Errors
    ///
    /// - `ExecError::InvalidArgument`: empty command, or requested timeout
    ///   above the configured ceiling (no process is spawned)
    /// - `ExecError::Unauthorized`: command denied, or working directory
    ///   outside the allowed roots
    /// - `ExecError::NotFound`: working directory does not exist
    /// - `ExecError::ExecutionFailure`: the program could not be started
    pub async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult, ExecError> {
        let correlation_id = request
            .correlation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let sanitize_on = self.config.sanitize_error_messages;

        if request.command.is_empty() {
            let err = ExecError::InvalidArgument("command must not be empty".to_string());
            self.audit.record_rejection(&request, &correlation_id, &err);
            return Err(err);
        }

        if request.timeout_secs > self.config.max_timeout_secs {
            let err = ExecError::InvalidArgument(format!(
                "requested timeout {}s exceeds the configured limit of {}s",
                request.timeout_secs, self.config.max_timeout_secs
            ));
            self.audit.record_rejection(&request, &correlation_id, &err);
            return Err(sanitize::sanitize(err, FailureContext::TimeoutLimit, sanitize_on));
        }

        if let Err(err) = self.validator.validate(&request.command) {
            self.audit.record_rejection(&request, &correlation_id, &err);
            return Err(sanitize::sanitize(err, FailureContext::CommandDenied, sanitize_on));
        }

        let working_dir = match paths::resolve_working_dir(request.working_dir.as_deref(), &self.config)
        {
            Ok(dir) => dir,
            Err(err) => {
                self.audit.record_rejection(&request, &correlation_id, &err);
                let context = FailureContext::for_path_error(&err);
                return Err(sanitize::sanitize(err, context, sanitize_on));
            }
        };

        debug!(command = %request.command, working_dir = %working_dir.display(), "executing");

        match self.spawn_and_wait(&request, &working_dir, &correlation_id).await {
            Ok(result) => {
                self.audit.record_execution(&request, &working_dir, &result);
                Ok(result)
            }
            Err(err) => {
                self.audit.record_rejection(&request, &correlation_id, &err);
                Err(sanitize::sanitize(err, FailureContext::SpawnFailure, sanitize_on))
            }
        }
    }

    /// Spawn the child and race its exit against the timeout.
    async fn spawn_and_wait(
        &self,
        request: &ExecutionRequest,
        working_dir: &Path,
        correlation_id: &str,
    ) -> Result<ExecutionResult, ExecError> {
        let started = Instant::now();

        let mut cmd = TokioCommand::new(&request.command);
        cmd.args(&request.args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // a caller that abandons the future must not leave an orphan
            .kill_on_drop(true);
        if let Some(env) = &request.env {
            cmd.envs(env);
        }
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|e| {
            ExecError::ExecutionFailure(format!("failed to start '{}': {}", request.command, e))
        })?;

        let stdout_pipe = child.stdout.take().ok_or_else(|| {
            ExecError::ExecutionFailure("failed to capture stdout".to_string())
        })?;
        let stderr_pipe = child.stderr.take().ok_or_else(|| {
            ExecError::ExecutionFailure("failed to capture stderr".to_string())
        })?;

        // Streams are drained concurrently with the wait so a child that
        // fills its pipe buffer cannot deadlock against us.
        let stdout_task = tokio::spawn(read_stream(stdout_pipe));
        let stderr_task = tokio::spawn(read_stream(stderr_pipe));

        let timeout = Duration::from_secs(request.timeout_secs);
        let (exit_code, timed_out) = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => (exit_status_code(&status), false),
            Ok(Err(e)) => {
                return Err(ExecError::ExecutionFailure(format!(
                    "failed waiting for '{}': {}",
                    request.command, e
                )));
            }
            Err(_) => {
                warn!(command = %request.command, ?timeout, "timed out, terminating");
                terminate(&mut child).await;
                (TIMEOUT_EXIT_CODE, true)
            }
        };

        // Whatever the readers drained before a kill is still returned
        let stdout = collect_stream(stdout_task).await;
        let stderr = collect_stream(stderr_task).await;

        Ok(ExecutionResult {
            stdout,
            stderr,
            exit_code,
            timed_out,
            duration_ms: started.elapsed().as_millis() as u64,
            correlation_id: correlation_id.to_string(),
        })
    }
}

async fn read_stream<R>(mut reader: R) -> String
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let _ = reader.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).into_owned()
}

/// Await a reader task, bounded so a straggling writer on the pipe cannot
/// stall the call past the grace period.
async fn collect_stream(task: JoinHandle<String>) -> String {
    match tokio::time::timeout(KILL_GRACE, task).await {
        Ok(Ok(output)) => output,
        _ => String::new(),
    }
}

/// Forcibly terminate the child, best-effort over its whole process group,
/// without blocking past the grace period.
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // the child leads its own group, so this reaches grandchildren too
        let _ = nix::sys::signal::killpg(
            nix::unistd::Pid::from_raw(pid as i32),
            nix::sys::signal::Signal::SIGKILL,
        );
    }

    if tokio::time::timeout(KILL_GRACE, child.kill()).await.is_err() {
        warn!("child did not confirm termination within {:?}", KILL_GRACE);
        let _ = child.start_kill();
    }
}

fn exit_status_code(status: &ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        // signal deaths report 128+N so the -1 sentinel stays reserved
        if status.code().is_none() {
            if let Some(signal) = status.signal() {
                return 128 + signal;
            }
        }
    }
    status.code().unwrap_or(1)
}
