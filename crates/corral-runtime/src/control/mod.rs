//! Private control channel between the orchestrator and a server.
//!
//! The channel is one end of a Unix socket pair. The other end becomes the
//! server's stdin (fd 0), and [`CHANNEL_FD_ENV`] tells the worker where to find
//! it. The worker writes `"ready"` once initialized; the orchestrator asks for
//! shutdown by closing its end, which the worker observes as EOF.

mod message;

pub use message::{ControlMessage, READY};

/// Environment variable naming the control channel descriptor in the worker.
pub const CHANNEL_FD_ENV: &str = "CORRAL_CHANNEL_FD";

/// Descriptor number the worker end is installed at.
pub const CHANNEL_FD: &str = "0";

#[cfg(unix)]
mod unix;

#[cfg(unix)]
pub use unix::{ChildEnd, ControlChannel};
