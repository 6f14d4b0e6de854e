//! Socket-pair control channel for Unix hosts.

use super::ControlMessage;
use crate::error::ControlChannelError;
use std::os::fd::OwnedFd;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};

/// The orchestrator's end of the control channel.
pub struct ControlChannel {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

/// The worker's end, handed to the child as stdin.
///
/// Dropping the spawning `Command` after spawn closes the parent's copy, so
/// EOF on [`ControlChannel::recv`] really means the worker side is gone.
#[derive(Debug)]
pub struct ChildEnd(std::os::unix::net::UnixStream);

impl ChildEnd {
    /// Convert into a stdio handle for `Command::stdin`.
    pub fn into_stdio(self) -> Stdio {
        Stdio::from(OwnedFd::from(self.0))
    }
}

impl ControlChannel {
    /// Create a connected channel and the end to pass to the worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn pair() -> Result<(Self, ChildEnd), ControlChannelError> {
        let (ours, theirs) =
            std::os::unix::net::UnixStream::pair().map_err(ControlChannelError::Setup)?;
        ours.set_nonblocking(true)
            .map_err(ControlChannelError::Setup)?;
        let ours = UnixStream::from_std(ours).map_err(ControlChannelError::Setup)?;

        let (reader, writer) = ours.into_split();
        let channel = Self {
            lines: BufReader::new(reader).lines(),
            writer,
        };
        Ok((channel, ChildEnd(theirs)))
    }

    /// Wait for the next message from the worker.
    ///
    /// Returns `Ok(None)` once the worker's end is closed. Blank lines are
    /// skipped. Cancel safe: no message is lost if the future is dropped.
    pub async fn recv(&mut self) -> Result<Option<ControlMessage>, ControlChannelError> {
        while let Some(line) = self.lines.next_line().await? {
            if let Some(message) = ControlMessage::parse(&line) {
                return Ok(Some(message));
            }
        }
        Ok(None)
    }

    /// Disconnect: shut down our write direction and close the socket.
    ///
    /// Returns once the close has completed on this side. The worker sees EOF
    /// on its end and is expected to treat it as a shutdown request.
    pub async fn close(self) -> Result<(), ControlChannelError> {
        let Self { lines, mut writer } = self;
        writer.shutdown().await?;
        drop(lines);
        drop(writer);
        Ok(())
    }
}

impl std::fmt::Debug for ControlChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlChannel").finish_non_exhaustive()
    }
}
