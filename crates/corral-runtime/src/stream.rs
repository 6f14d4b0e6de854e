//! Async stream readers for worker output (non-UTF8-safe).
//!
//! Workers can emit non-UTF8 bytes on stdout/stderr. `BufReader::lines()`
//! would end the reader task on invalid UTF-8, so lines are read as bytes and
//! decoded lossily. Decoding per line also keeps multi-byte characters from
//! being split across chunks.

use corral_core::{OutputSinkPort, StreamKind};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Spawn a task that drains `stream` line by line.
///
/// Every line is logged at `debug` and forwarded to `sink`. When `capture` is
/// set, the decoded text (newline included) is also sent there so the caller
/// can rebuild the combined output in arrival order. The task ends at EOF or
/// on the first read error.
pub fn spawn_stream_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    pid: u32,
    kind: StreamKind,
    sink: Arc<dyn OutputSinkPort>,
    capture: Option<mpsc::UnboundedSender<String>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break, // EOF
                Ok(_) => {
                    let text = String::from_utf8_lossy(&buf).into_owned();
                    let line = text.trim_end_matches(['\n', '\r']);
                    debug!(pid, stream = %kind, "{}", line);
                    sink.append(pid, kind, line.to_string());

                    if let Some(tx) = &capture {
                        // Receiver gone means nobody wants the text any more
                        let _ = tx.send(text);
                    }
                }
                Err(e) => {
                    debug!(pid, stream = %kind, error = %e, "Output reader exiting due to read error");
                    break;
                }
            }
        }

        debug!(pid, stream = %kind, "Output reader task exiting");
    })
}
