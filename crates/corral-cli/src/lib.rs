//! Command-line front end for corral.
//!
//! `corral exec` runs the command binary once and exits with its status.
//! `corral serve` launches the server, waits for it to report ready and keeps
//! it running until interrupted.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

// Used by the binary only
use anyhow as _;
use dotenvy as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

pub use bootstrap::{CliContext, bootstrap, init_tracing, orchestrator_config};
pub use commands::Commands;
pub use error::CliError;
pub use parser::{Cli, TransportArg};
