//! Long-running server launch and readiness handshake.

use crate::controller::ServerController;
use crate::error::LaunchError;
use corral_core::{HostAbortPort, OutputSinkPort, Transport};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[cfg(unix)]
use crate::{
    command::{build_command, spawn},
    control::{CHANNEL_FD, CHANNEL_FD_ENV, ControlChannel, ControlMessage},
    controller::Supervisor,
    stream::spawn_stream_reader,
};
#[cfg(unix)]
use corral_core::{ExitOutcome, StreamKind};
#[cfg(unix)]
use std::process::Stdio;
#[cfg(unix)]
use tokio::process::Child;
#[cfg(unix)]
use tracing::{debug, trace};

/// How long a server that closed its channel before ready gets to exit on its
/// own before it is killed.
pub const CHANNEL_CLOSE_EXIT_WINDOW: Duration = Duration::from_millis(500);

/// Spawns servers and hands out controllers once they report ready.
#[derive(Clone)]
pub struct ServerLauncher {
    transport: Transport,
    sink: Arc<dyn OutputSinkPort>,
    host_abort: Arc<dyn HostAbortPort>,
    ready_timeout: Option<Duration>,
    shutdown_grace: Option<Duration>,
}

impl ServerLauncher {
    /// Create a launcher with no ready timeout and no shutdown grace period.
    pub fn new(
        transport: Transport,
        sink: Arc<dyn OutputSinkPort>,
        host_abort: Arc<dyn HostAbortPort>,
    ) -> Self {
        Self {
            transport,
            sink,
            host_abort,
            ready_timeout: None,
            shutdown_grace: None,
        }
    }

    /// Bound the wait for the ready message. `None` waits as long as the
    /// server is alive.
    #[must_use]
    pub const fn with_ready_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Kill a gracefully terminated server that is still alive after `grace`.
    #[must_use]
    pub const fn with_shutdown_grace(mut self, grace: Option<Duration>) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Spawn `binary` with a control channel and wait for it to report ready.
    ///
    /// The server's stdout and stderr are drained into the output sink for
    /// its whole lifetime. Nothing is returned before the ready message; on
    /// any handshake failure the server is killed and reaped.
    ///
    /// # Errors
    ///
    /// - [`LaunchError::Spawn`] if the binary cannot be started
    /// - [`LaunchError::Channel`] if the control channel cannot be set up or read
    /// - [`LaunchError::ExitedBeforeReady`] if the server exits first
    /// - [`LaunchError::ChannelClosed`] if it closes the channel but stays alive
    /// - [`LaunchError::ReadyTimeout`] if the configured bound elapses
    #[cfg(unix)]
    pub async fn launch(
        &self,
        binary: &Path,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<ServerController, LaunchError> {
        let (mut channel, child_end) = ControlChannel::pair()?;

        let mut cmd = build_command(binary, args, working_dir, self.transport)?;
        cmd.stdin(child_end.into_stdio())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env(CHANNEL_FD_ENV, CHANNEL_FD);

        let spawned = spawn(&mut cmd, binary);
        // Close our copy of the child end so EOF means the server let go
        drop(cmd);
        let (mut child, pid) = spawned?;
        debug!(pid, binary = %binary.display(), ?args, "Server started, waiting for ready");

        if let Some(stdout) = child.stdout.take() {
            spawn_stream_reader(stdout, pid, StreamKind::Stdout, self.sink.clone(), None);
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_stream_reader(stderr, pid, StreamKind::Stderr, self.sink.clone(), None);
        }

        let handshake = match self.ready_timeout {
            Some(limit) => tokio::time::timeout(limit, wait_for_ready(&mut channel, &mut child, pid))
                .await
                .unwrap_or(Err(LaunchError::ReadyTimeout { timeout: limit })),
            None => wait_for_ready(&mut channel, &mut child, pid).await,
        };

        if let Err(e) = handshake {
            debug!(pid, error = %e, "Server launch failed");
            discard(&mut child, pid).await;
            return Err(e);
        }

        debug!(pid, "Server ready");
        Ok(Supervisor::new(pid, child, channel, self.host_abort.clone(), self.shutdown_grace).start())
    }

    /// Servers need a socket-pair control channel, which only Unix hosts provide.
    ///
    /// # Errors
    ///
    /// Always returns [`LaunchError::Unsupported`].
    #[cfg(not(unix))]
    pub async fn launch(
        &self,
        _binary: &Path,
        _args: &[String],
        _working_dir: Option<&Path>,
    ) -> Result<ServerController, LaunchError> {
        Err(LaunchError::Unsupported)
    }
}

/// Read the channel until `"ready"`, the server exits, or the channel ends.
#[cfg(unix)]
async fn wait_for_ready(
    channel: &mut ControlChannel,
    child: &mut Child,
    pid: u32,
) -> Result<(), LaunchError> {
    loop {
        tokio::select! {
            // Buffered messages win over a racing exit: ready-then-exit still launches
            biased;

            message = channel.recv() => match message? {
                Some(ControlMessage::Ready) => return Ok(()),
                Some(ControlMessage::Other(line)) => {
                    trace!(pid, message = %line, "Ignoring control message before ready");
                }
                None => return Err(channel_closed(child, pid).await),
            },

            status = child.wait() => {
                let outcome = status.map_or_else(|_| ExitOutcome::unknown(), ExitOutcome::from);
                return Err(LaunchError::ExitedBeforeReady { outcome });
            }
        }
    }
}

/// The server dropped its end before ready. Report a crash as an exit if it
/// follows promptly; otherwise kill the server.
#[cfg(unix)]
async fn channel_closed(child: &mut Child, pid: u32) -> LaunchError {
    if let Ok(status) = tokio::time::timeout(CHANNEL_CLOSE_EXIT_WINDOW, child.wait()).await {
        let outcome = status.map_or_else(|_| ExitOutcome::unknown(), ExitOutcome::from);
        return LaunchError::ExitedBeforeReady { outcome };
    }

    debug!(pid, "Server closed its control channel before ready; killing");
    LaunchError::ChannelClosed {
        outcome: discard(child, pid).await,
    }
}

/// Kill and reap a server that never became ready.
#[cfg(unix)]
async fn discard(child: &mut Child, pid: u32) -> ExitOutcome {
    if let Err(e) = child.start_kill() {
        trace!(pid, error = %e, "Kill skipped");
    }
    match child.wait().await {
        Ok(status) => ExitOutcome::from(status),
        Err(e) => {
            debug!(pid, error = %e, "Failed to reap server");
            ExitOutcome::unknown()
        }
    }
}

impl std::fmt::Debug for ServerLauncher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerLauncher")
            .field("transport", &self.transport)
            .field("ready_timeout", &self.ready_timeout)
            .field("shutdown_grace", &self.shutdown_grace)
            .finish_non_exhaustive()
    }
}
