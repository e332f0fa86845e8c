// Configuration File Support
//
// This module provides configuration file parsing for toolgate.
// Supports TOML format with environment variable overrides.
// Configuration files are loaded from the XDG config directory:
// ~/.config/toolgate/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Execution policy
    pub execution: ExecutionConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// Execution policy for the command engine.
///
/// Constructed once per service instance and read-only afterwards;
/// reconfiguration requires a new instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Ceiling on caller-requested timeouts, in seconds
    pub max_timeout_secs: u64,

    /// Base path against which relative working directories are resolved.
    /// Must itself lie inside the allowed roots.
    pub workspace_dir: String,

    /// Roots a working directory may resolve into (compared after
    /// canonicalization)
    pub allowed_paths: Vec<String>,

    /// Opt-in allow-list over program names. Absent or empty means every
    /// command passes this check.
    pub allowed_commands: Option<Vec<String>>,

    /// Deny-list over program names. Always overrides the allow-list.
    pub denied_commands: Vec<String>,

    /// Replace caller-visible error text with generic phrases
    pub sanitize_error_messages: bool,

    /// Emit an audit record for every invocation attempt
    pub enable_audit_logging: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        let workspace = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| ".".to_string());
        let temp = std::env::temp_dir().display().to_string();

        Self {
            max_timeout_secs: 300,
            allowed_paths: vec![workspace.clone(), temp],
            workspace_dir: workspace,
            allowed_commands: None,
            denied_commands: default_denied_commands(),
            sanitize_error_messages: true,
            enable_audit_logging: true,
        }
    }
}

/// Destructive filesystem commands blocked out of the box.
fn default_denied_commands() -> Vec<String> {
    ["rm", "rmdir", "dd", "mkfs", "shred"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            execution: ExecutionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default XDG config directory
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    /// If the config file does not exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    /// If the config file does not exist, returns default configuration.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file from {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file from {:?}", path))?;

        // Apply environment variable overrides
        let config = config.apply_env_overrides();

        // Validate configuration
        config.validate()?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/toolgate/config.toml` on Linux/Mac
    pub fn config_path() -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("com", "toolgate", "Toolgate") {
            proj_dirs.config_dir().join("config.toml")
        } else {
            // Fallback if XDG dirs cannot be determined
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home)
                .join(".config")
                .join("toolgate")
                .join("config.toml")
        }
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Environment variables take precedence over config file values:
    /// - TOOLGATE_LOG_LEVEL
    /// - TOOLGATE_LOG_FORMAT
    /// - TOOLGATE_MAX_TIMEOUT_SECS
    /// - TOOLGATE_WORKSPACE_DIR
    /// - TOOLGATE_SANITIZE_ERRORS
    /// - TOOLGATE_AUDIT_ENABLED
    fn apply_env_overrides(mut self) -> Self {
        // Logging overrides
        if let Ok(level) = std::env::var("TOOLGATE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TOOLGATE_LOG_FORMAT") {
            self.logging.format = format;
        }

        // Execution policy overrides
        if let Ok(ceiling) = std::env::var("TOOLGATE_MAX_TIMEOUT_SECS") {
            if let Ok(ceiling) = ceiling.parse::<u64>() {
                if ceiling > 0 {
                    self.execution.max_timeout_secs = ceiling;
                }
            }
        }
        if let Ok(dir) = std::env::var("TOOLGATE_WORKSPACE_DIR") {
            if !dir.is_empty() {
                self.execution.workspace_dir = dir;
            }
        }
        if let Ok(sanitize) = std::env::var("TOOLGATE_SANITIZE_ERRORS") {
            self.execution.sanitize_error_messages = sanitize
                .parse()
                .unwrap_or(self.execution.sanitize_error_messages);
        }
        if let Ok(audit) = std::env::var("TOOLGATE_AUDIT_ENABLED") {
            self.execution.enable_audit_logging =
                audit.parse().unwrap_or(self.execution.enable_audit_logging);
        }

        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        // Validate logging level
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            ),
        }

        // Validate logging format
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" | "compact" => {}
            _ => anyhow::bail!(
                "Invalid log format: {}. Must be one of: json, pretty, compact",
                self.logging.format
            ),
        }

        self.execution.validate()
    }

    /// Convert log level string to tracing::Level
    pub fn log_level(&self) -> Result<tracing::Level> {
        self.logging
            .level
            .to_lowercase()
            .parse()
            .map_err(|e| anyhow::anyhow!("Failed to parse log level: {}", e))
    }
}

impl ExecutionConfig {
    /// Validate the execution policy
    ///
    /// # Errors
    ///
    /// Returns an error if the policy is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.max_timeout_secs == 0 {
            anyhow::bail!("max_timeout_secs must be > 0");
        }
        if self.workspace_dir.is_empty() {
            anyhow::bail!("workspace_dir must not be empty");
        }
        if self.allowed_paths.is_empty() {
            anyhow::bail!("allowed_paths must contain at least one root");
        }
        if self.allowed_paths.iter().any(|p| p.is_empty()) {
            anyhow::bail!("allowed_paths entries must not be empty");
        }
        if self.denied_commands.iter().any(|c| c.is_empty()) {
            anyhow::bail!("denied_commands entries must not be empty");
        }
        if let Some(allowed) = &self.allowed_commands {
            if allowed.iter().any(|c| c.is_empty()) {
                anyhow::bail!("allowed_commands entries must not be empty");
            }
        }
        Ok(())
    }
}
