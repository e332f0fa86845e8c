//! Tool discovery.
//!
//! Probes a fixed set of external programs with a lightweight version query.
//! Probing runs the known binary names directly and does not consult the
//! allow/deny policy: the set is hardcoded, nothing caller-supplied runs.

use super::executor::ToolExecutor;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as TokioCommand;

/// External programs probed by `list_tools`: a shell, the version-control
/// client, and the build toolchain.
pub const KNOWN_TOOLS: &[&str] = &["bash", "sh", "git", "cargo", "rustc"];

/// Version queries should return immediately; anything slower counts as
/// unavailable.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Availability of one external program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,

    pub available: bool,

    /// Reported version string; absent whenever the program is unavailable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ToolDescriptor {
    fn unavailable(name: &str) -> Self {
        Self {
            name: name.to_string(),
            available: false,
            version: None,
        }
    }
}

/// Probe a single program by running `<name> --version`
pub async fn probe_tool(name: &str) -> ToolDescriptor {
    let mut cmd = TokioCommand::new(name);
    cmd.arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(_) => return ToolDescriptor::unavailable(name),
    };

    match tokio::time::timeout(PROBE_TIMEOUT, child.wait_with_output()).await {
        Ok(Ok(output)) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty());
            ToolDescriptor {
                name: name.to_string(),
                available: true,
                version,
            }
        }
        _ => ToolDescriptor::unavailable(name),
    }
}

impl ToolExecutor {
    /// Probe every known external tool and report availability
    pub async fn list_tools(&self) -> Vec<ToolDescriptor> {
        let mut descriptors = Vec::with_capacity(KNOWN_TOOLS.len());
        for name in KNOWN_TOOLS {
            descriptors.push(probe_tool(name).await);
        }
        descriptors
    }
}
