//! Output sink port for worker stdout/stderr capture.
//!
//! Command output is always accumulated into the [`ExecutionResult`]; this
//! port additionally lets a host observe lines as they arrive, from both
//! commands and the long-running server (whose output is otherwise only
//! logged through `tracing`).
//!
//! [`ExecutionResult`]: crate::ExecutionResult

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which output stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    /// Stream name as used in log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Port for observing worker output lines.
///
/// Implementations must be thread-safe and should not block: they are called
/// from the stream reader tasks.
#[cfg_attr(test, mockall::automock)]
pub trait OutputSinkPort: Send + Sync {
    /// Append one line of worker output.
    ///
    /// # Arguments
    ///
    /// * `pid` - Process ID of the worker that produced the line
    /// * `stream` - Stream the line was read from
    /// * `line` - Line content without the trailing newline
    fn append(&self, pid: u32, stream: StreamKind, line: String);
}

/// A sink that discards every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOutputSink;

impl OutputSinkPort for NoopOutputSink {
    fn append(&self, _pid: u32, _stream: StreamKind, _line: String) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use std::sync::Arc;

    #[test]
    fn stream_kind_labels() {
        assert_eq!(StreamKind::Stdout.to_string(), "stdout");
        assert_eq!(StreamKind::Stderr.as_str(), "stderr");
    }

    #[test]
    fn sinks_are_usable_as_trait_objects() {
        let mut mock = MockOutputSinkPort::new();
        mock.expect_append()
            .with(eq(42), eq(StreamKind::Stderr), eq("boom".to_string()))
            .times(1)
            .return_const(());

        let sinks: Vec<Arc<dyn OutputSinkPort>> = vec![Arc::new(NoopOutputSink), Arc::new(mock)];
        for sink in &sinks {
            sink.append(42, StreamKind::Stderr, "boom".to_string());
        }
    }
}
