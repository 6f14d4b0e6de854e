//! Orchestrator facade.
//!
//! Wires the per-invocation data flow for one [`OrchestratorConfig`]:
//! write the configuration file, assemble the argument vector, then hand off
//! to the [`CommandExecutor`] or the [`ServerLauncher`]. Each call is
//! independent; the facade holds no per-call state.

use crate::controller::ServerController;
use crate::error::{ExecError, LaunchError};
use crate::executor::CommandExecutor;
use crate::launcher::ServerLauncher;
use corral_core::{
    ArgumentSpec, CommandRequest, ConfigError, ConfigMaterializer, ExecutionResult,
    ExitProcessAbort, HostAbortPort, MaterializeError, NoopOutputSink, OrchestratorConfig,
    OutputSinkPort, ServerRequest, binary_label,
};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Entry point for running commands and launching servers.
#[derive(Clone)]
pub struct Orchestrator {
    config: OrchestratorConfig,
    materializer: ConfigMaterializer,
    sink: Arc<dyn OutputSinkPort>,
    host_abort: Arc<dyn HostAbortPort>,
}

impl Orchestrator {
    /// Create an orchestrator after validating `config`.
    ///
    /// Output lines go nowhere beyond `tracing` and a stuck shutdown exits the
    /// process with status 1, until overridden.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `config` fails validation.
    pub fn new(config: OrchestratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let materializer = ConfigMaterializer::new(config.config_dir.clone());
        Ok(Self {
            config,
            materializer,
            sink: Arc::new(NoopOutputSink),
            host_abort: Arc::new(ExitProcessAbort),
        })
    }

    /// Forward every captured output line to `sink`.
    #[must_use]
    pub fn with_output_sink(mut self, sink: Arc<dyn OutputSinkPort>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the hook used to abort the host on a stuck shutdown.
    #[must_use]
    pub fn with_host_abort(mut self, host_abort: Arc<dyn HostAbortPort>) -> Self {
        self.host_abort = host_abort;
        self
    }

    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run the command binary to completion.
    ///
    /// The config file is named after the command binary and `request.command`
    /// and is fully written before the binary is spawned.
    ///
    /// # Errors
    ///
    /// - [`ExecError::ConfigWrite`] if the configuration cannot be written;
    ///   nothing is spawned
    /// - [`ExecError::Spawn`] if the binary cannot be started
    /// - [`ExecError::Wait`] if waiting for the exit fails
    pub async fn run_command<C>(
        &self,
        request: CommandRequest<C>,
    ) -> Result<ExecutionResult, ExecError>
    where
        C: Serialize + Send + 'static,
    {
        let CommandRequest {
            config,
            raw_args,
            command,
            command_args,
        } = request;

        let binary = &self.config.command_path;
        let config_path = self
            .materialize(config, binary_label(binary), command.clone())
            .await?;

        let args = ArgumentSpec::new(config_path.to_string_lossy())
            .with_raw_args(raw_args)
            .with_command(command)
            .with_command_args(command_args)
            .assemble();

        CommandExecutor::new(self.config.transport, self.sink.clone())
            .execute(binary, &args, self.config.working_dir.as_deref())
            .await
    }

    /// Callback form of [`run_command`](Self::run_command).
    ///
    /// `on_complete` is invoked exactly once, on a spawned task, with the
    /// result or the error.
    pub fn spawn_command<C, F>(&self, request: CommandRequest<C>, on_complete: F) -> JoinHandle<()>
    where
        C: Serialize + Send + 'static,
        F: FnOnce(Result<ExecutionResult, ExecError>) + Send + 'static,
    {
        let orchestrator = self.clone();
        tokio::spawn(async move {
            on_complete(orchestrator.run_command(request).await);
        })
    }

    /// Launch the server binary and wait for its ready message.
    ///
    /// # Errors
    ///
    /// See [`ServerLauncher::launch`]; config write failures surface as
    /// [`LaunchError::ConfigWrite`] before anything is spawned.
    pub async fn launch_server<C>(
        &self,
        request: ServerRequest<C>,
    ) -> Result<ServerController, LaunchError>
    where
        C: Serialize + Send + 'static,
    {
        let ServerRequest { config, raw_args } = request;

        let binary = &self.config.server_path;
        let config_path = self.materialize(config, binary_label(binary), None).await?;

        let args = ArgumentSpec::new(config_path.to_string_lossy())
            .with_raw_args(raw_args)
            .assemble();

        ServerLauncher::new(self.config.transport, self.sink.clone(), self.host_abort.clone())
            .with_ready_timeout(self.config.ready_timeout)
            .with_shutdown_grace(self.config.shutdown_grace)
            .launch(binary, &args, self.config.working_dir.as_deref())
            .await
    }

    /// Callback form of [`launch_server`](Self::launch_server).
    ///
    /// `on_ready` is invoked exactly once: with the controller after the
    /// server's first ready message, or with the launch error.
    pub fn spawn_server<C, F>(&self, request: ServerRequest<C>, on_ready: F) -> JoinHandle<()>
    where
        C: Serialize + Send + 'static,
        F: FnOnce(Result<ServerController, LaunchError>) + Send + 'static,
    {
        let orchestrator = self.clone();
        tokio::spawn(async move {
            on_ready(orchestrator.launch_server(request).await);
        })
    }

    /// Write `config` on the blocking pool and wait for the write to finish.
    async fn materialize<C>(
        &self,
        config: C,
        label: String,
        hint: Option<String>,
    ) -> Result<PathBuf, MaterializeError>
    where
        C: Serialize + Send + 'static,
    {
        let materializer = self.materializer.clone();
        let path = tokio::task::spawn_blocking(move || {
            materializer.materialize(&config, &label, hint.as_deref())
        })
        .await
        .map_err(|e| MaterializeError::Io(io::Error::other(e)))??;

        debug!(path = %path.display(), "Config written");
        Ok(path)
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
