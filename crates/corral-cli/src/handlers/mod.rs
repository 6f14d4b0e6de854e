//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<i32, CliError>`
//! - The returned value is the process exit status.

pub mod exec;
pub mod serve;

use serde_json::{Map, Value};
use std::path::Path;

use crate::error::CliError;

/// Read the worker configuration passed with `--config-file`.
///
/// Without a file the configuration is an empty JSON object.
pub fn load_config_file(path: Option<&Path>) -> Result<Value, CliError> {
    let Some(path) = path else {
        return Ok(Value::Object(Map::new()));
    };

    let contents = std::fs::read_to_string(path).map_err(|source| CliError::ConfigFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CliError::ConfigFileParse {
        path: path.to_path_buf(),
        source,
    })
}
