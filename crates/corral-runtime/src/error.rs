//! Error types for worker orchestration.
//!
//! Each public operation has its own error enum so callers only match on the
//! failures that operation can actually produce. Abnormal exits are never
//! errors: they are reported as data in `ExecutionResult` / `ExitOutcome`.

use corral_core::{ExitOutcome, MaterializeError};
use std::io;
use std::time::Duration;
use thiserror::Error;

/// The worker binary could not be started.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// No executable with this name or path exists.
    #[error("Worker binary not found: {binary}")]
    NotFound { binary: String },

    /// The binary exists but may not be executed.
    #[error("Permission denied starting worker binary: {binary}")]
    PermissionDenied { binary: String },

    /// Any other spawn failure.
    #[error("Failed to start {binary}: {source}")]
    Io {
        binary: String,
        #[source]
        source: io::Error,
    },

    /// The OS returned a child without a process ID.
    #[error("Spawned {binary} has no process ID")]
    MissingPid { binary: String },
}

impl SpawnError {
    /// Classify a spawn `io::Error` for `binary`.
    pub fn from_io(binary: impl Into<String>, source: io::Error) -> Self {
        let binary = binary.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { binary },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { binary },
            _ => Self::Io { binary, source },
        }
    }
}

/// Errors from a short-lived command invocation.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The configuration file could not be written; nothing was spawned.
    #[error(transparent)]
    ConfigWrite(#[from] MaterializeError),

    #[error(transparent)]
    Spawn(#[from] SpawnError),

    /// Waiting for the command to exit failed.
    #[error("Failed to wait for command: {0}")]
    Wait(#[source] io::Error),
}

/// Failures of the private control channel.
#[derive(Debug, Error)]
pub enum ControlChannelError {
    /// The socket pair could not be created or registered with the runtime.
    #[error("Failed to create control channel: {0}")]
    Setup(#[source] io::Error),

    /// Reading from or closing the channel failed.
    #[error("Control channel I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors from launching the long-running server.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The configuration file could not be written; nothing was spawned.
    #[error(transparent)]
    ConfigWrite(#[from] MaterializeError),

    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error(transparent)]
    Channel(#[from] ControlChannelError),

    /// No readiness message within the configured bound. The server was killed.
    #[error("Server did not report ready within {timeout:?}")]
    ReadyTimeout { timeout: Duration },

    /// The server exited before reporting ready.
    #[error("Server exited before reporting ready ({outcome})")]
    ExitedBeforeReady { outcome: ExitOutcome },

    /// The server closed its end of the control channel before reporting ready.
    #[error("Server closed the control channel before reporting ready ({outcome})")]
    ChannelClosed { outcome: ExitOutcome },

    /// This platform has no control channel transport.
    #[error("Launching servers with a control channel is not supported on this platform")]
    Unsupported,
}

/// Errors from driving a server's termination.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TerminateError {
    /// The supervisor task ended without recording an exit.
    #[error("Server supervisor is no longer running")]
    Closed,
}
