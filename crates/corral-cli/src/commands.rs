//! Subcommands.

use clap::Subcommand;
use std::path::PathBuf;

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the command binary to completion and print its output
    ///
    /// Exits with the command's exit code, or 1 if it was killed by a signal.
    Exec {
        /// JSON file passed through as the worker configuration (default: {})
        #[arg(long = "config-file", value_name = "FILE")]
        config_file: Option<PathBuf>,

        /// Raw argument placed before --config (repeatable)
        #[arg(long = "raw", value_name = "ARG", allow_hyphen_values = true)]
        raw: Vec<String>,

        /// Subcommand name for the command binary
        command: Option<String>,

        /// Arguments for the subcommand, given after `--`
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Launch the server and keep it running until Ctrl-C
    ///
    /// The first Ctrl-C stops the server gracefully. A second one while it is
    /// still stopping kills it and exits with status 1.
    Serve {
        /// JSON file passed through as the worker configuration (default: {})
        #[arg(long = "config-file", value_name = "FILE")]
        config_file: Option<PathBuf>,

        /// Raw argument placed before --config (repeatable)
        #[arg(long = "raw", value_name = "ARG", allow_hyphen_values = true)]
        raw: Vec<String>,
    },
}
