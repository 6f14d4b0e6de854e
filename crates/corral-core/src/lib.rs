//! Core domain types and port definitions for corral.
//!
//! corral launches and controls two kinds of worker processes: short-lived
//! command invocations and a long-running server. This crate holds the pieces
//! that need no process or async runtime:
//!
//! - [`OrchestratorConfig`] - binary locations, working directory, timeouts
//! - [`ArgumentSpec`] - the positional argument contract shared by both workers
//! - [`ConfigMaterializer`] - writes the caller's configuration to a temp file
//! - [`CommandRequest`] / [`ServerRequest`] - structured call parameters
//! - [`ExecutionResult`], [`ExitOutcome`], [`TerminationState`] - results and lifecycle
//! - [`ports`] - the seams runtime adapters plug into (output sink, host abort)
#![deny(unused_crate_dependencies)]

pub mod args;
pub mod config;
pub mod materialize;
pub mod outcome;
pub mod ports;
pub mod request;

pub use args::{ARGS_DELIMITER, ArgumentSpec, CONFIG_FLAG, assemble, shell_line};
pub use config::{
    ConfigError, DEFAULT_COMMAND_BINARY, DEFAULT_SERVER_BINARY, DEFAULT_SHUTDOWN_GRACE,
    OrchestratorConfig, Transport, binary_label,
};
pub use materialize::{ConfigMaterializer, MaterializeError};
pub use outcome::{ExecutionResult, ExitOutcome, TerminationState};
pub use ports::{ExitProcessAbort, HostAbortPort, NoopOutputSink, OutputSinkPort, StreamKind};
pub use request::{CommandRequest, ServerRequest};
