//! Structured parameters for command and server invocations.
//!
//! Every optional piece of a call is a named field; the configuration value is
//! generic so any `Serialize` type can be handed to a worker unchanged.

use serde_json::{Map, Value};

/// A short-lived command invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest<C = Value> {
    /// Configuration written to the worker's `--config` file.
    pub config: C,
    /// Flags placed before `--config`.
    pub raw_args: Vec<String>,
    /// Subcommand name, also used to name the config file.
    pub command: Option<String>,
    /// Subcommand arguments, emitted after `--`.
    pub command_args: Vec<String>,
}

impl CommandRequest<Value> {
    /// A request with an empty configuration object and no arguments.
    pub fn new() -> Self {
        Self {
            config: Value::Object(Map::new()),
            raw_args: Vec::new(),
            command: None,
            command_args: Vec::new(),
        }
    }
}

impl Default for CommandRequest<Value> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> CommandRequest<C> {
    /// Replace the configuration value.
    pub fn with_config<D>(self, config: D) -> CommandRequest<D> {
        CommandRequest {
            config,
            raw_args: self.raw_args,
            command: self.command,
            command_args: self.command_args,
        }
    }

    /// Set the leading raw flags.
    #[must_use]
    pub fn with_raw_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.raw_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the subcommand name.
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Set the subcommand arguments.
    #[must_use]
    pub fn with_command_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command_args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// A long-running server launch.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerRequest<C = Value> {
    /// Configuration written to the server's `--config` file.
    pub config: C,
    /// Flags placed before `--config`.
    pub raw_args: Vec<String>,
}

impl ServerRequest<Value> {
    /// A request with an empty configuration object and no arguments.
    pub fn new() -> Self {
        Self {
            config: Value::Object(Map::new()),
            raw_args: Vec::new(),
        }
    }
}

impl Default for ServerRequest<Value> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ServerRequest<C> {
    /// Replace the configuration value.
    pub fn with_config<D>(self, config: D) -> ServerRequest<D> {
        ServerRequest {
            config,
            raw_args: self.raw_args,
        }
    }

    /// Set the leading raw flags.
    #[must_use]
    pub fn with_raw_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.raw_args = args.into_iter().map(Into::into).collect();
        self
    }
}
