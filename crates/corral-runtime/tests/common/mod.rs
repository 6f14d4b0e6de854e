//! Common test utilities.
//!
//! Fake worker binaries are small `/bin/sh` scripts written into a temporary
//! directory. Server scripts talk to the orchestrator over fd 0, which is the
//! control channel socket.

#![allow(dead_code)]

pub mod workers;

use corral_core::{HostAbortPort, OutputSinkPort, StreamKind};
use std::sync::Mutex;

/// Records every line forwarded by the runtime.
#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<(u32, StreamKind, String)>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<(u32, StreamKind, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn lines_for(&self, stream: StreamKind) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(_, kind, _)| *kind == stream)
            .map(|(_, _, line)| line)
            .collect()
    }
}

impl OutputSinkPort for RecordingSink {
    fn append(&self, pid: u32, stream: StreamKind, line: String) {
        self.lines.lock().unwrap().push((pid, stream, line));
    }
}

/// Records abort requests instead of exiting the test binary.
#[derive(Default)]
pub struct RecordingAbort {
    codes: Mutex<Vec<i32>>,
}

impl RecordingAbort {
    pub fn codes(&self) -> Vec<i32> {
        self.codes.lock().unwrap().clone()
    }
}

impl HostAbortPort for RecordingAbort {
    fn abort(&self, code: i32) {
        self.codes.lock().unwrap().push(code);
    }
}
