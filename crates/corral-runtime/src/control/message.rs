//! Control channel message parsing.
//!
//! Messages are newline-delimited. Each line is normally a JSON value; the
//! only one that means anything is the string `"ready"`. A bare `ready` token
//! is accepted too. Everything else is preserved as [`ControlMessage::Other`]
//! and ignored by the handshake, so newer workers can send message types this
//! runtime does not know.

use serde_json::Value;

/// The readiness token.
pub const READY: &str = "ready";

/// A message received from a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    /// The worker finished initializing and may be controlled.
    Ready,
    /// Any other message, kept verbatim for logging.
    Other(String),
}

impl ControlMessage {
    /// Parse one line. Blank lines carry no message.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        let message = match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::String(token)) if token == READY => Self::Ready,
            Ok(_) => Self::Other(trimmed.to_string()),
            Err(_) if trimmed == READY => Self::Ready,
            Err(_) => Self::Other(trimmed.to_string()),
        };
        Some(message)
    }
}
