//! Main CLI parser and top-level argument handling.
//!
//! Global options map onto `OrchestratorConfig` fields. Each one falls back to
//! a `CORRAL_*` environment variable (a `.env` file is loaded first).

use clap::{Parser, ValueEnum};
use corral_core::Transport;
use std::path::PathBuf;

use crate::commands::Commands;

/// Command-line interface for launching and controlling worker processes.
#[derive(Parser, Debug)]
#[command(name = "corral")]
#[command(about = "Launch and control cowboy commands and the cattle server")]
#[command(version)]
pub struct Cli {
    /// Command binary to run for `exec`
    #[arg(long = "command-path", env = "CORRAL_COMMAND_PATH", global = true)]
    pub command_path: Option<PathBuf>,

    /// Server binary to launch for `serve`
    #[arg(long = "server-path", env = "CORRAL_SERVER_PATH", global = true)]
    pub server_path: Option<PathBuf>,

    /// Working directory for worker processes
    #[arg(long = "working-dir", env = "CORRAL_WORKING_DIR", global = true)]
    pub working_dir: Option<PathBuf>,

    /// Directory for materialized config files (default: system temp dir)
    #[arg(long = "config-dir", env = "CORRAL_CONFIG_DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Give up if the server has not reported ready after this many seconds
    #[arg(
        long = "ready-timeout",
        env = "CORRAL_READY_TIMEOUT_SECS",
        value_name = "SECS",
        global = true
    )]
    pub ready_timeout_secs: Option<u64>,

    /// Seconds a stopping server gets before it is killed (0 waits forever)
    #[arg(
        long = "shutdown-grace",
        env = "CORRAL_SHUTDOWN_GRACE_SECS",
        value_name = "SECS",
        global = true
    )]
    pub shutdown_grace_secs: Option<u64>,

    /// How worker processes are spawned
    #[arg(long, env = "CORRAL_TRANSPORT", value_enum, global = true)]
    pub transport: Option<TransportArg>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Spawn transport as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportArg {
    /// Pass the argument vector to the binary directly
    Direct,
    /// Join binary and arguments into one platform shell command line
    Shell,
}

impl From<TransportArg> for Transport {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Direct => Self::Direct,
            TransportArg::Shell => Self::Shell,
        }
    }
}
