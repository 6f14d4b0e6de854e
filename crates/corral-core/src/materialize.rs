//! Configuration materialization.
//!
//! Workers read their configuration from a JSON file named on the command
//! line. Every invocation gets its own file; nothing here deletes it.

use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Errors raised while writing a configuration file.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// The configuration value could not be represented as JSON.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The file could not be created or written.
    #[error("Failed to write configuration file: {0}")]
    Io(#[from] io::Error),
}

/// Writes configuration values to uniquely named JSON files.
#[derive(Debug, Clone, Default)]
pub struct ConfigMaterializer {
    dir: Option<PathBuf>,
}

impl ConfigMaterializer {
    /// Create a materializer writing into `dir`, or the system temp dir when `None`.
    pub const fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Serialize `config` and write it to a fresh file.
    ///
    /// The file name starts with `{label}-{hint}-config` (or `{label}-config`
    /// without a hint) and ends in `.json`; a random infix keeps concurrent
    /// calls from colliding. The write has completed when this returns.
    ///
    /// # Errors
    ///
    /// Returns [`MaterializeError::Serialize`] before touching the filesystem
    /// when the value is not representable as JSON, and
    /// [`MaterializeError::Io`] when the file cannot be created or written.
    pub fn materialize<C>(
        &self,
        config: &C,
        label: &str,
        hint: Option<&str>,
    ) -> Result<PathBuf, MaterializeError>
    where
        C: Serialize + ?Sized,
    {
        let contents = to_pretty_json(config)?;
        let prefix = file_prefix(label, hint);

        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix).suffix(".json");

        let mut file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(&contents)?;
        file.flush()?;

        let (_, path) = file.keep().map_err(|e| MaterializeError::Io(e.error))?;
        debug!(path = %path.display(), bytes = contents.len(), "Materialized worker config");
        Ok(path)
    }
}

/// Four-space indented JSON.
fn to_pretty_json<C: Serialize + ?Sized>(config: &C) -> Result<Vec<u8>, MaterializeError> {
    let mut buf = Vec::with_capacity(128);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    config
        .serialize(&mut serializer)
        .map_err(MaterializeError::Serialize)?;
    Ok(buf)
}

fn file_prefix(label: &str, hint: Option<&str>) -> String {
    match hint.filter(|h| !h.is_empty()) {
        Some(hint) => format!("{label}-{}-config", sanitize(hint)),
        None => format!("{label}-config"),
    }
}

// Command names end up in a file name.
fn sanitize(hint: &str) -> String {
    hint.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
