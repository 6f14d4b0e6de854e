//! Results and lifecycle states reported back to callers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::ExitStatus;

/// How a worker process ended.
///
/// Exactly one of `code` and `signal` is set for a normally reaped process.
/// Both are `None` only when the exit status could not be collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExitOutcome {
    /// Numeric exit code, absent when the process was killed by a signal.
    pub code: Option<i32>,
    /// Terminating signal number (Unix only).
    pub signal: Option<i32>,
}

impl ExitOutcome {
    /// Outcome for a process that exited with `code`.
    pub const fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    /// Outcome for a process terminated by `signal`.
    pub const fn signaled(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    /// Outcome when the exit status was lost.
    pub const fn unknown() -> Self {
        Self {
            code: None,
            signal: None,
        }
    }

    /// True for a zero exit code.
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {code}"),
            (None, Some(signal)) => write!(f, "signal {signal}"),
            (None, None) => f.write_str("unknown exit status"),
        }
    }
}

/// Result of a short-lived command invocation.
///
/// A non-zero exit is data, not an error; callers decide what it means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Exit code, `None` when the command was killed by a signal.
    pub exit_code: Option<i32>,
    /// Signal that terminated the command, if any.
    pub signal: Option<i32>,
    /// stdout and stderr text in arrival order.
    pub output: String,
}

impl ExecutionResult {
    /// Build a result from an exit outcome and the captured output.
    pub fn new(outcome: ExitOutcome, output: String) -> Self {
        Self {
            exit_code: outcome.code,
            signal: outcome.signal,
            output,
        }
    }

    /// The exit outcome without the captured output.
    pub const fn outcome(&self) -> ExitOutcome {
        ExitOutcome {
            code: self.exit_code,
            signal: self.signal,
        }
    }

    /// True for a zero exit code.
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }
}

/// Shutdown progress of a launched server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationState {
    /// Ready and not asked to stop.
    Running,
    /// Control channel closed and SIGTERM sent; waiting for exit.
    GracefulRequested,
    /// SIGKILL sent; waiting for the process to be reaped.
    ForceRequested,
    /// Reaped. Terminal.
    Exited,
}

impl fmt::Display for TerminationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Running => "running",
            Self::GracefulRequested => "graceful shutdown requested",
            Self::ForceRequested => "forced shutdown requested",
            Self::Exited => "exited",
        };
        f.write_str(label)
    }
}
