//! `corral serve`: launch the server and hold it until interrupted.
//!
//! Interrupts arrive on a channel so the shutdown sequence can be driven
//! without real signals. Every interrupt is forwarded to the controller as a
//! graceful request; the supervisor turns a second one into a kill plus host
//! abort.

use corral_core::{ExitOutcome, ServerRequest};
use corral_runtime::ServerController;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::load_config_file;
use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::ConsoleSink;

/// Launch the server, wait for Ctrl-C, and return the exit status.
pub async fn execute(
    ctx: &CliContext,
    config_file: Option<&Path>,
    raw: Vec<String>,
) -> Result<i32, CliError> {
    let config = load_config_file(config_file)?;
    let request = ServerRequest::new().with_config(config).with_raw_args(raw);

    let orchestrator = ctx
        .orchestrator()
        .clone()
        .with_output_sink(Arc::new(ConsoleSink));
    let controller = orchestrator.launch_server(request).await?;
    eprintln!(
        "Server ready (pid {}). Press Ctrl-C to stop.",
        controller.pid()
    );

    let (outcome, requested) = supervise(&controller, forward_interrupts()).await?;
    eprintln!("Server exited ({outcome})");

    Ok(exit_status(outcome, requested))
}

/// Wait for the server to exit, forwarding each interrupt as a graceful
/// termination request.
///
/// Returns the outcome and whether termination was requested by us.
pub async fn supervise(
    controller: &ServerController,
    mut interrupts: mpsc::Receiver<()>,
) -> Result<(ExitOutcome, bool), CliError> {
    let mut requested = false;
    let mut listening = true;

    loop {
        tokio::select! {
            outcome = controller.wait() => return Ok((outcome?, requested)),

            interrupt = interrupts.recv(), if listening => {
                if interrupt.is_none() {
                    listening = false;
                    continue;
                }
                if requested {
                    warn!(pid = controller.pid(), "Second interrupt while stopping; forcing shutdown");
                } else {
                    eprintln!("Stopping server (press Ctrl-C again to force)...");
                }
                requested = true;
                controller.request_termination(false)?;
            }
        }
    }
}

/// Exit status for `serve`: the server's own exit code, 0 for a server we
/// stopped with a signal, 1 for one that died of a signal unprompted.
pub const fn exit_status(outcome: ExitOutcome, requested: bool) -> i32 {
    match outcome.code {
        Some(code) => code,
        None if requested => 0,
        None => 1,
    }
}

fn forward_interrupts() -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel(4);
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received");
            if tx.send(()).await.is_err() {
                break;
            }
        }
    });
    rx
}
