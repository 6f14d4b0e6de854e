//! Host abort port.
//!
//! A second termination request while a graceful shutdown is still in flight
//! means the server is stuck. The runtime then hard-kills the server and asks
//! the host program to abort through this port.

/// Port for aborting the hosting program.
#[cfg_attr(test, mockall::automock)]
pub trait HostAbortPort: Send + Sync {
    /// Abort the host with a non-zero `code`.
    ///
    /// Production implementations do not return; test doubles may.
    fn abort(&self, code: i32);
}

/// Exits the current process immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitProcessAbort;

impl HostAbortPort for ExitProcessAbort {
    fn abort(&self, code: i32) {
        tracing::error!(code, "Aborting host process after stuck server shutdown");
        std::process::exit(code);
    }
}
