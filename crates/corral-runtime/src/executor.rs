//! Short-lived command execution with combined output capture.

use crate::command::{build_command, spawn};
use crate::error::ExecError;
use crate::stream::spawn_stream_reader;
use corral_core::{ExecutionResult, ExitOutcome, OutputSinkPort, StreamKind, Transport};
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Runs a command binary to completion and collects its output.
///
/// stdout and stderr are merged into one buffer in the order lines arrive.
/// There is no ordering guarantee between the two streams beyond that.
#[derive(Clone)]
pub struct CommandExecutor {
    transport: Transport,
    sink: Arc<dyn OutputSinkPort>,
}

impl CommandExecutor {
    /// Create an executor using `transport` and forwarding lines to `sink`.
    pub fn new(transport: Transport, sink: Arc<dyn OutputSinkPort>) -> Self {
        Self { transport, sink }
    }

    /// Run `binary` with `args` in `working_dir` and wait for it to exit.
    ///
    /// A non-zero exit or a signal kill is returned as an `ExecutionResult`;
    /// only failures to start or to wait are errors. There is no retry.
    pub async fn execute(
        &self,
        binary: &Path,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<ExecutionResult, ExecError> {
        let mut cmd = build_command(binary, args, working_dir, self.transport)?;
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let (mut child, pid) = spawn(&mut cmd, binary)?;
        debug!(pid, binary = %binary.display(), ?args, "Command started");

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        if let Some(stdout) = child.stdout.take() {
            spawn_stream_reader(
                stdout,
                pid,
                StreamKind::Stdout,
                self.sink.clone(),
                Some(tx.clone()),
            );
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_stream_reader(
                stderr,
                pid,
                StreamKind::Stderr,
                self.sink.clone(),
                Some(tx.clone()),
            );
        }
        drop(tx);

        // The collector finishes once both readers hit EOF
        let collect = async {
            let mut output = String::new();
            while let Some(chunk) = rx.recv().await {
                output.push_str(&chunk);
            }
            output
        };

        let (status, output) = tokio::join!(child.wait(), collect);
        let outcome = ExitOutcome::from(status.map_err(ExecError::Wait)?);

        debug!(pid, %outcome, bytes = output.len(), "Command finished");
        Ok(ExecutionResult::new(outcome, output))
    }
}

impl std::fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}
