// Toolgate - Main Entry Point
//
// CLI wrapper around the execution engine:
// - exec: run a command through the policy gate
// - list-tools: probe known external tools
// - check-path: validate a working directory against the allowed roots

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use toolgate::config::Config;
use toolgate::tools::{resolve_working_dir, ExecutionRequest, ToolExecutor};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Toolgate: policy-gated command execution for agent tool calls
#[derive(Parser, Debug)]
#[command(name = "toolgate")]
#[command(author = "Toolgate Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Policy-gated command execution for agent tool calls", long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to a configuration file (default: XDG config dir)
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a command through the policy gate
    Exec {
        /// Program name (not a shell line)
        command: String,

        /// Arguments, passed to the program literally
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,

        /// Working directory (absolute, or relative to the workspace base)
        #[arg(long)]
        cwd: Option<String>,

        /// Timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Parse stdout as JSON on success
        #[arg(long)]
        json_output: bool,

        /// Extra environment variables, KEY=VALUE
        #[arg(long, value_name = "KEY=VALUE")]
        env: Vec<String>,

        /// Correlation identifier to thread through the audit trail
        #[arg(long)]
        correlation_id: Option<String>,
    },
    /// Probe known external tools and report availability
    ListTools,
    /// Check whether a directory is inside the allowed roots
    CheckPath {
        /// Directory to check
        dir: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(filter.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    let executor = ToolExecutor::new(config.execution.clone());

    match args.command {
        Commands::Exec {
            command,
            args: cmd_args,
            cwd,
            timeout_secs,
            json_output,
            env,
            correlation_id,
        } => {
            let mut request = ExecutionRequest::new(command).args(cmd_args);
            if let Some(cwd) = cwd {
                request = request.working_dir(cwd);
            }
            if let Some(secs) = timeout_secs {
                request = request.timeout_secs(secs);
            }
            if !env.is_empty() {
                request = request.env(parse_env_pairs(&env)?);
            }
            if let Some(id) = correlation_id {
                request = request.correlation_id(id);
            }

            let exit_code = if json_output {
                let result = executor.execute_json(request).await?;
                println!("{}", serde_json::to_string_pretty(&result)?);
                result.execution.exit_code
            } else {
                let result = executor.execute(request).await?;
                println!("{}", serde_json::to_string_pretty(&result)?);
                result.exit_code
            };

            if exit_code != 0 {
                std::process::exit(exit_code.clamp(1, 255));
            }
        }
        Commands::ListTools => {
            info!("Probing known external tools...");
            let descriptors = executor.list_tools().await;
            println!("{}", serde_json::to_string_pretty(&descriptors)?);
        }
        Commands::CheckPath { dir } => {
            match resolve_working_dir(Some(&dir), executor.config()) {
                Ok(canonical) => {
                    println!("{}", canonical.display());
                }
                Err(err) => {
                    eprintln!("{}", err);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

/// Parse `KEY=VALUE` pairs from the command line
fn parse_env_pairs(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut env = HashMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("invalid environment pair '{}', expected KEY=VALUE", pair))?;
        if key.is_empty() {
            anyhow::bail!("invalid environment pair '{}', empty key", pair);
        }
        env.insert(key.to_string(), value.to_string());
    }
    Ok(env)
}
