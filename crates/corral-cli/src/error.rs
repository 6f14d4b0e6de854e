//! CLI-specific error types and exit code mapping.

use corral_core::ConfigError;
use corral_runtime::{ExecError, LaunchError, SpawnError, TerminateError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid orchestrator configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The `--config-file` could not be read.
    #[error("Failed to read config file {}: {source}", .path.display())]
    ConfigFileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The `--config-file` is not valid JSON.
    #[error("Invalid JSON in config file {}: {source}", .path.display())]
    ConfigFileParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    Terminate(#[from] TerminateError),

    /// Writing to the terminal failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Map error to an exit code (see sysexits.h).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 78, // EX_CONFIG
            Self::ConfigFileRead { .. } => 66, // EX_NOINPUT
            Self::ConfigFileParse { .. } => 65, // EX_DATAERR
            Self::Exec(ExecError::Spawn(e)) | Self::Launch(LaunchError::Spawn(e)) => {
                spawn_exit_code(e)
            }
            Self::Exec(ExecError::ConfigWrite(_)) | Self::Launch(LaunchError::ConfigWrite(_)) => {
                73 // EX_CANTCREAT
            }
            Self::Io(_) => 74, // EX_IOERR
            Self::Exec(_) | Self::Launch(_) | Self::Terminate(_) => 1,
        }
    }
}

const fn spawn_exit_code(err: &SpawnError) -> i32 {
    match err {
        SpawnError::NotFound { .. } => 127,
        SpawnError::PermissionDenied { .. } => 126,
        SpawnError::Io { .. } | SpawnError::MissingPid { .. } => 71, // EX_OSERR
    }
}
