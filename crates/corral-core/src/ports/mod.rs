//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define what the orchestration runtime expects from its host
//! application. They contain no process or filesystem details.

pub mod host_abort;
pub mod output_sink;

pub use host_abort::{ExitProcessAbort, HostAbortPort};
pub use output_sink::{NoopOutputSink, OutputSinkPort, StreamKind};
