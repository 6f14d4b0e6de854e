//! OS-level termination signals for server processes.
//!
//! The forced path uses `Child::start_kill` (SIGKILL on Unix) directly; this
//! module only covers the cooperative SIGTERM sent on the graceful path.

use std::io;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Ask process `pid` to terminate with SIGTERM.
///
/// Returns `Ok(false)` when the process is already gone.
///
/// # Errors
///
/// Returns an error when the PID does not fit the platform's PID type or the
/// signal cannot be delivered for another reason (e.g. `EPERM`).
#[cfg(unix)]
pub fn send_terminate(pid: u32) -> io::Result<bool> {
    let raw = i32::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "PID out of range"))?;

    match signal::kill(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) => Ok(true),
        // Process may have already exited
        Err(nix::errno::Errno::ESRCH) => Ok(false),
        Err(e) => Err(io::Error::other(e)),
    }
}

/// Windows has no SIGTERM equivalent; the graceful path relies on the
/// control channel alone and the grace timer.
#[cfg(not(unix))]
pub fn send_terminate(_pid: u32) -> io::Result<bool> {
    Ok(false)
}
