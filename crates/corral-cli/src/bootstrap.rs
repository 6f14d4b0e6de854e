//! CLI bootstrap - the composition root.
//!
//! Builds the `OrchestratorConfig` from parsed arguments (which already carry
//! their environment fallbacks) and wires the orchestrator handlers use.

use corral_core::OrchestratorConfig;
use corral_runtime::Orchestrator;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;
use crate::parser::Cli;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` takes priority; otherwise the level is `warn`, or `debug` with
/// `--verbose`. Logs go to stderr so worker output on stdout stays clean.
pub fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .ok(); // Ignore error if already initialized
}

/// Apply command-line overrides on top of the default configuration.
pub fn orchestrator_config(cli: &Cli) -> OrchestratorConfig {
    let mut config = OrchestratorConfig::default();

    if let Some(path) = &cli.command_path {
        config = config.with_command_path(path);
    }
    if let Some(path) = &cli.server_path {
        config = config.with_server_path(path);
    }
    if let Some(dir) = &cli.working_dir {
        config = config.with_working_dir(dir);
    }
    if let Some(dir) = &cli.config_dir {
        config = config.with_config_dir(dir);
    }
    if let Some(secs) = cli.ready_timeout_secs {
        config = config.with_ready_timeout(Some(Duration::from_secs(secs)));
    }
    if let Some(secs) = cli.shutdown_grace_secs {
        let grace = (secs > 0).then(|| Duration::from_secs(secs));
        config = config.with_shutdown_grace(grace);
    }
    if let Some(transport) = cli.transport {
        config = config.with_transport(transport.into());
    }

    config
}

/// Fully composed context for command handlers.
#[derive(Debug, Clone)]
pub struct CliContext {
    /// Orchestrator built from the validated configuration.
    pub orchestrator: Orchestrator,
}

impl CliContext {
    pub const fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }
}

/// Bootstrap the CLI application.
///
/// # Errors
///
/// Returns [`CliError::Config`] when the resulting configuration is invalid,
/// e.g. a working directory that does not exist or a zero ready timeout.
pub fn bootstrap(cli: &Cli) -> Result<CliContext, CliError> {
    let config = orchestrator_config(cli);
    tracing::debug!(?config, "Bootstrapping corral");
    let orchestrator = Orchestrator::new(config)?;
    Ok(CliContext { orchestrator })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use corral_core::{ConfigError, Transport};
    use std::path::PathBuf;

    #[test]
    fn overrides_are_applied() {
        let cli = Cli::parse_from([
            "corral",
            "--server-path",
            "/opt/bin/cattle",
            "--ready-timeout",
            "3",
            "--shutdown-grace",
            "0",
            "--transport",
            "shell",
            "serve",
        ]);
        let config = orchestrator_config(&cli);

        assert_eq!(config.server_path, PathBuf::from("/opt/bin/cattle"));
        assert_eq!(config.ready_timeout, Some(Duration::from_secs(3)));
        assert_eq!(config.shutdown_grace, None);
        assert_eq!(config.transport, Transport::Shell);
    }

    #[test]
    fn invalid_config_fails_bootstrap() {
        let cli = Cli::parse_from(["corral", "--ready-timeout", "0", "serve"]);
        let err = bootstrap(&cli).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::ZeroDuration(_))));
    }
}
