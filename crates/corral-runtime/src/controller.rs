//! Server controller and termination supervisor.
//!
//! Every launched server gets one supervisor task. The task owns the `Child`
//! and the orchestrator's end of the control channel, and is the only place
//! termination state changes. [`ServerController`] handles talk to it through
//! an unbounded request queue and observe it through a `watch` channel, so
//! any number of clones can request termination or wait for the exit.
//!
//! ```text
//! Running --terminate(false)--> GracefulRequested --exit--> Exited
//! Running --terminate(true)---> ForceRequested ----exit--> Exited
//! GracefulRequested --second request--> ForceRequested + host abort
//! GracefulRequested --grace expired---> ForceRequested
//! ```

use crate::error::TerminateError;
use corral_core::{ExitOutcome, TerminationState};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

#[cfg(unix)]
use crate::control::{ControlChannel, ControlMessage};
#[cfg(unix)]
use crate::error::ControlChannelError;
#[cfg(unix)]
use crate::shutdown::send_terminate;
#[cfg(unix)]
use corral_core::HostAbortPort;
#[cfg(unix)]
use std::{sync::Arc, time::Duration};
#[cfg(unix)]
use tokio::process::Child;
#[cfg(unix)]
use tokio::time::{Instant, sleep_until};
#[cfg(unix)]
use tracing::{debug, error, trace, warn};

/// Exit status the host is aborted with on a stuck shutdown.
pub const STUCK_SHUTDOWN_EXIT_CODE: i32 = 1;

/// Snapshot published by the supervisor after every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
    pub state: TerminationState,
    /// Set exactly once, together with `state == Exited`.
    pub outcome: Option<ExitOutcome>,
}

impl Lifecycle {
    const fn running() -> Self {
        Self {
            state: TerminationState::Running,
            outcome: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TerminateRequest {
    force: bool,
}

/// Handle to a running (or exited) server.
///
/// Cheap to clone; all clones drive the same supervisor.
#[derive(Debug, Clone)]
pub struct ServerController {
    pid: u32,
    requests: mpsc::UnboundedSender<TerminateRequest>,
    lifecycle: watch::Receiver<Lifecycle>,
}

impl ServerController {
    /// OS process ID of the server.
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    /// Current termination state.
    pub fn state(&self) -> TerminationState {
        self.lifecycle.borrow().state
    }

    /// Recorded exit outcome, once the server has exited.
    pub fn outcome(&self) -> Option<ExitOutcome> {
        self.lifecycle.borrow().outcome
    }

    /// Queue a termination request without waiting for the exit.
    ///
    /// On an exited server this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TerminateError::Closed`] if the supervisor ended without
    /// recording an exit.
    pub fn request_termination(&self, force: bool) -> Result<(), TerminateError> {
        if self.outcome().is_some() {
            return Ok(());
        }
        // The supervisor publishes the outcome before dropping its receiver
        if self.requests.send(TerminateRequest { force }).is_err() && self.outcome().is_none() {
            return Err(TerminateError::Closed);
        }
        Ok(())
    }

    /// Terminate the server and wait until it has exited.
    ///
    /// `force = false` closes the control channel, then sends SIGTERM.
    /// `force = true` sends SIGKILL right away. Calling this while a graceful
    /// termination is in flight kills the server and aborts the host.
    /// On an exited server it resolves immediately with the recorded outcome.
    ///
    /// # Errors
    ///
    /// Returns [`TerminateError::Closed`] if the supervisor is gone.
    pub async fn terminate(&self, force: bool) -> Result<ExitOutcome, TerminateError> {
        if let Some(outcome) = self.outcome() {
            return Ok(outcome);
        }
        self.request_termination(force)?;
        self.wait().await
    }

    /// Callback form of [`terminate`](Self::terminate).
    ///
    /// The request is queued before this returns; `on_exited` runs once, on a
    /// spawned task, after the exit.
    pub fn terminate_with<F>(&self, force: bool, on_exited: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<ExitOutcome, TerminateError>) + Send + 'static,
    {
        let queued = self.request_termination(force);
        let controller = self.clone();
        tokio::spawn(async move {
            let result = match queued {
                Ok(()) => controller.wait().await,
                Err(e) => Err(e),
            };
            on_exited(result);
        })
    }

    /// Wait for the server to exit, whatever the reason.
    ///
    /// # Errors
    ///
    /// Returns [`TerminateError::Closed`] if the supervisor is gone.
    pub async fn wait(&self) -> Result<ExitOutcome, TerminateError> {
        let mut lifecycle = self.lifecycle.clone();
        let outcome = lifecycle
            .wait_for(|lc| lc.outcome.is_some())
            .await
            .map_err(|_| TerminateError::Closed)?
            .outcome;
        outcome.ok_or(TerminateError::Closed)
    }
}

/// Owns one server process until it exits.
#[cfg(unix)]
pub(crate) struct Supervisor {
    pid: u32,
    child: Child,
    channel: Option<ControlChannel>,
    host_abort: Arc<dyn HostAbortPort>,
    shutdown_grace: Option<Duration>,
}

#[cfg(unix)]
impl Supervisor {
    pub(crate) fn new(
        pid: u32,
        child: Child,
        channel: ControlChannel,
        host_abort: Arc<dyn HostAbortPort>,
        shutdown_grace: Option<Duration>,
    ) -> Self {
        Self {
            pid,
            child,
            channel: Some(channel),
            host_abort,
            shutdown_grace,
        }
    }

    /// Spawn the supervisor task and return the first controller.
    pub(crate) fn start(self) -> ServerController {
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();
        let (lifecycle_tx, lifecycle_rx) = watch::channel(Lifecycle::running());
        let pid = self.pid;

        tokio::spawn(self.run(requests_rx, lifecycle_tx));

        ServerController {
            pid,
            requests: requests_tx,
            lifecycle: lifecycle_rx,
        }
    }

    async fn run(
        self,
        mut requests: mpsc::UnboundedReceiver<TerminateRequest>,
        lifecycle: watch::Sender<Lifecycle>,
    ) {
        let Self {
            pid,
            mut child,
            mut channel,
            host_abort,
            shutdown_grace,
        } = self;

        let mut state = TerminationState::Running;
        let mut accepting = true;
        let mut grace_deadline: Option<Instant> = None;

        let publish = |state: TerminationState| {
            lifecycle.send_replace(Lifecycle {
                state,
                outcome: None,
            });
        };

        let outcome = loop {
            tokio::select! {
                status = child.wait() => {
                    break match status {
                        Ok(status) => ExitOutcome::from(status),
                        Err(e) => {
                            warn!(pid, error = %e, "Failed to wait for server");
                            ExitOutcome::unknown()
                        }
                    };
                }

                request = requests.recv(), if accepting => {
                    let Some(TerminateRequest { force }) = request else {
                        // Every controller is gone; keep supervising until exit
                        accepting = false;
                        continue;
                    };

                    match state {
                        TerminationState::Running if force => {
                            debug!(pid, "Forced termination requested");
                            state = TerminationState::ForceRequested;
                            publish(state);
                            // The channel stays open: closing it is the graceful signal
                            force_kill(&mut child, pid);
                        }
                        TerminationState::Running => {
                            debug!(pid, "Graceful termination requested");
                            state = TerminationState::GracefulRequested;
                            publish(state);

                            if let Some(ch) = channel.take() {
                                if let Err(e) = ch.close().await {
                                    debug!(pid, error = %e, "Control channel close failed");
                                }
                            }
                            match send_terminate(pid) {
                                Ok(true) => debug!(pid, "Sent SIGTERM"),
                                Ok(false) => debug!(pid, "Server already gone before SIGTERM"),
                                Err(e) => warn!(pid, error = %e, "Failed to send SIGTERM"),
                            }
                            grace_deadline = shutdown_grace.map(|grace| Instant::now() + grace);
                        }
                        TerminationState::GracefulRequested => {
                            error!(
                                pid,
                                "Termination requested again during graceful shutdown; killing server and aborting"
                            );
                            state = TerminationState::ForceRequested;
                            publish(state);
                            grace_deadline = None;
                            force_kill(&mut child, pid);
                            host_abort.abort(STUCK_SHUTDOWN_EXIT_CODE);
                        }
                        TerminationState::ForceRequested | TerminationState::Exited => {
                            trace!(pid, %state, force, "Termination already in progress");
                        }
                    }
                }

                message = next_message(&mut channel) => {
                    match message {
                        Ok(Some(ControlMessage::Ready)) => {
                            trace!(pid, "Ignoring repeated ready message");
                        }
                        Ok(Some(ControlMessage::Other(line))) => {
                            trace!(pid, message = %line, "Ignoring control message");
                        }
                        Ok(None) => {
                            debug!(pid, "Server closed its control channel");
                            channel = None;
                        }
                        Err(e) => {
                            debug!(pid, error = %e, "Control channel failed");
                            channel = None;
                        }
                    }
                }

                () = sleep_until(grace_deadline.unwrap_or_else(Instant::now)), if grace_deadline.is_some() => {
                    warn!(
                        pid,
                        grace = ?shutdown_grace,
                        "Server did not exit within the shutdown grace period; killing"
                    );
                    grace_deadline = None;
                    state = TerminationState::ForceRequested;
                    publish(state);
                    force_kill(&mut child, pid);
                }
            }
        };

        debug!(pid, %outcome, "Server exited");
        lifecycle.send_replace(Lifecycle {
            state: TerminationState::Exited,
            outcome: Some(outcome),
        });
    }
}

#[cfg(unix)]
async fn next_message(
    channel: &mut Option<ControlChannel>,
) -> Result<Option<ControlMessage>, ControlChannelError> {
    match channel {
        Some(channel) => channel.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(unix)]
fn force_kill(child: &mut Child, pid: u32) {
    if let Err(e) = child.start_kill() {
        // Already reaped or exited; the wait branch reports the outcome
        debug!(pid, error = %e, "SIGKILL not delivered");
    }
}
