//! `corral exec`: run the command binary once.

use corral_core::{CommandRequest, ExecutionResult};
use std::io::Write;
use std::path::Path;
use tracing::debug;

use super::load_config_file;
use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Parameters of one `exec` invocation.
#[derive(Debug, Clone, Default)]
pub struct ExecArgs<'a> {
    pub config_file: Option<&'a Path>,
    pub raw: Vec<String>,
    pub command: Option<String>,
    pub args: Vec<String>,
}

/// Run the command, print its combined output and return its exit status.
pub async fn execute(ctx: &CliContext, args: ExecArgs<'_>) -> Result<i32, CliError> {
    let config = load_config_file(args.config_file)?;

    let mut request = CommandRequest::new()
        .with_config(config)
        .with_raw_args(args.raw)
        .with_command_args(args.args);
    if let Some(command) = args.command {
        request = request.with_command(command);
    }

    let result = ctx.orchestrator().run_command(request).await?;
    debug!(exit_code = ?result.exit_code, signal = ?result.signal, "Command finished");

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(result.output.as_bytes())?;
    stdout.flush()?;

    Ok(exit_status(&result))
}

/// The command's exit code, or 1 when it was killed by a signal.
pub fn exit_status(result: &ExecutionResult) -> i32 {
    result.exit_code.unwrap_or(1)
}
