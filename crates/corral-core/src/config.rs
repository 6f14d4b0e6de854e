//! Orchestrator configuration.
//!
//! Replaces process-wide binary path globals with a value passed to each
//! orchestrator, so independent orchestrators can coexist in one process.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default command binary, resolved through the executable search path.
pub const DEFAULT_COMMAND_BINARY: &str = "cowboy";

/// Default server binary, resolved through the executable search path.
pub const DEFAULT_SERVER_BINARY: &str = "cattle";

/// Default wait between SIGTERM and the SIGKILL fallback on graceful shutdown.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// How the worker command line reaches the operating system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Spawn the binary directly with an argument vector.
    #[default]
    Direct,
    /// Hand a single joined command line to the platform shell.
    Shell,
}

/// Configuration for one orchestrator instance.
///
/// All fields have defaults, so a partial JSON/TOML document or
/// `OrchestratorConfig::default()` is always valid input for [`validate`].
///
/// [`validate`]: OrchestratorConfig::validate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Path or bare name of the command binary.
    pub command_path: PathBuf,

    /// Path or bare name of the server binary.
    pub server_path: PathBuf,

    /// Working directory for commands. `None` inherits the orchestrator's.
    pub working_dir: Option<PathBuf>,

    /// Directory for materialized config files. `None` uses the system temp dir.
    pub config_dir: Option<PathBuf>,

    /// Upper bound on the readiness handshake. `None` waits as long as the
    /// server process is alive.
    pub ready_timeout: Option<Duration>,

    /// Time a server gets to exit after SIGTERM before it is hard-killed.
    /// `None` waits indefinitely.
    pub shutdown_grace: Option<Duration>,

    /// Spawn transport for both worker kinds.
    pub transport: Transport,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            command_path: PathBuf::from(DEFAULT_COMMAND_BINARY),
            server_path: PathBuf::from(DEFAULT_SERVER_BINARY),
            working_dir: None,
            config_dir: None,
            ready_timeout: None,
            shutdown_grace: Some(DEFAULT_SHUTDOWN_GRACE),
            transport: Transport::Direct,
        }
    }
}

impl OrchestratorConfig {
    /// Set the command binary location.
    #[must_use]
    pub fn with_command_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.command_path = path.into();
        self
    }

    /// Set the server binary location.
    #[must_use]
    pub fn with_server_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.server_path = path.into();
        self
    }

    /// Set the working directory used for command invocations.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set the directory materialized config files are written to.
    #[must_use]
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Bound the readiness handshake.
    #[must_use]
    pub const fn with_ready_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Set the SIGTERM grace window.
    #[must_use]
    pub const fn with_shutdown_grace(mut self, grace: Option<Duration>) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Select the spawn transport.
    #[must_use]
    pub const fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Check the configuration before any worker is launched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyBinaryPath { role: "command" });
        }
        if self.server_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyBinaryPath { role: "server" });
        }
        if let Some(dir) = &self.working_dir {
            if !dir.is_dir() {
                return Err(ConfigError::WorkingDirNotFound(dir.clone()));
            }
        }
        if let Some(dir) = &self.config_dir {
            if !dir.is_dir() {
                return Err(ConfigError::ConfigDirNotFound(dir.clone()));
            }
        }
        if self.ready_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroDuration("ready_timeout"));
        }
        if self.shutdown_grace.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroDuration("shutdown_grace"));
        }
        Ok(())
    }
}

/// Short label derived from a binary path, used to name config files.
///
/// `/usr/local/bin/cowboy` and `cowboy` both yield `cowboy`.
pub fn binary_label(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "worker".to_string())
}

/// Orchestrator configuration validation error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("The {role} binary path cannot be empty")]
    EmptyBinaryPath { role: &'static str },

    #[error("Working directory does not exist: {}", .0.display())]
    WorkingDirNotFound(PathBuf),

    #[error("Config directory does not exist: {}", .0.display())]
    ConfigDirNotFound(PathBuf),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}
