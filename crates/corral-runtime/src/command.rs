//! Command builder for worker processes.
//!
//! This module turns a binary location, an assembled argument vector and a
//! transport choice into a `tokio::process::Command`, and maps spawn failures
//! onto [`SpawnError`].

use crate::error::SpawnError;
use corral_core::{Transport, shell_line};
use std::path::{Path, PathBuf};
use tokio::process::{Child, Command};
use tracing::debug;

/// Resolve the binary to execute.
///
/// Bare names go through the host's executable search; anything with a
/// directory component is made absolute against the orchestrator's current
/// directory so a configured working directory cannot change which file runs.
///
/// # Errors
///
/// Returns [`SpawnError::NotFound`] when a bare name is not on the search path.
pub fn resolve_binary(binary: &Path) -> Result<PathBuf, SpawnError> {
    if binary.is_absolute() {
        return Ok(binary.to_path_buf());
    }

    if binary.components().count() > 1 {
        return std::path::absolute(binary)
            .map_err(|e| SpawnError::from_io(binary.display().to_string(), e));
    }

    which::which(binary).map_err(|e| {
        debug!(binary = %binary.display(), error = %e, "Executable search failed");
        SpawnError::NotFound {
            binary: binary.display().to_string(),
        }
    })
}

/// Build the command for a worker invocation.
///
/// With [`Transport::Direct`] the argument vector is passed as-is. With
/// [`Transport::Shell`] the binary and arguments are joined into one command
/// line for the platform shell, unquoted.
pub fn build_command(
    binary: &Path,
    args: &[String],
    working_dir: Option<&Path>,
    transport: Transport,
) -> Result<Command, SpawnError> {
    let mut cmd = match transport {
        Transport::Direct => {
            let resolved = resolve_binary(binary)?;
            let mut cmd = Command::new(resolved);
            cmd.args(args);
            cmd
        }
        Transport::Shell => shell_command(&shell_line(&binary.to_string_lossy(), args)),
    };

    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    Ok(cmd)
}

/// `exec` makes the worker replace the wrapper shell, so the spawned PID is
/// the worker itself and termination signals reach it.
#[cfg(unix)]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(format!("exec {line}"));
    cmd
}

#[cfg(not(unix))]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(line);
    cmd
}

/// Spawn `cmd` and return the child with its process ID.
pub fn spawn(cmd: &mut Command, binary: &Path) -> Result<(Child, u32), SpawnError> {
    let child = cmd
        .spawn()
        .map_err(|e| SpawnError::from_io(binary.display().to_string(), e))?;
    let pid = child.id().ok_or_else(|| SpawnError::MissingPid {
        binary: binary.display().to_string(),
    })?;

    debug!(binary = %binary.display(), pid, "Spawned worker");
    Ok((child, pid))
}
