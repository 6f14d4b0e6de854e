//! Terminal presentation of worker output.

use corral_core::{OutputSinkPort, StreamKind};
use std::io::Write;

/// Echoes server output to the terminal as it arrives.
///
/// Server stdout goes to our stdout and server stderr to our stderr, one line
/// at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl OutputSinkPort for ConsoleSink {
    fn append(&self, _pid: u32, stream: StreamKind, line: String) {
        // Write errors on a closed terminal are dropped
        let _ = match stream {
            StreamKind::Stdout => writeln!(std::io::stdout().lock(), "{line}"),
            StreamKind::Stderr => writeln!(std::io::stderr().lock(), "{line}"),
        };
    }
}
