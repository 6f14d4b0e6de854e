//! Process runtime for corral.
//!
//! Spawns and controls the two kinds of worker processes:
//!
//! - **Commands** run to completion; [`CommandExecutor`] captures their
//!   combined stdout/stderr and reports the exit as data.
//! - **Servers** stay up; [`ServerLauncher`] gives each one a private
//!   socket-pair control channel, waits for its `"ready"` message and returns
//!   a [`ServerController`] that drives graceful or forced termination.
//!
//! [`Orchestrator`] ties both to an [`OrchestratorConfig`](corral_core::OrchestratorConfig),
//! writing each invocation's configuration file before anything is spawned.
#![deny(unsafe_code)]

mod command;
pub mod control;
mod controller;
pub mod error;
mod executor;
mod launcher;
mod orchestrator;
mod shutdown;
mod stream;

pub use command::{build_command, resolve_binary};
pub use controller::{STUCK_SHUTDOWN_EXIT_CODE, ServerController};
pub use error::{ControlChannelError, ExecError, LaunchError, SpawnError, TerminateError};
pub use executor::CommandExecutor;
pub use launcher::{CHANNEL_CLOSE_EXIT_WINDOW, ServerLauncher};
pub use orchestrator::Orchestrator;
