//! Argument assembly for worker invocations.
//!
//! Both worker binaries parse their command line positionally, so the order
//! produced here is part of the contract:
//!
//! ```text
//! raw_args.. --config <path> [command] [-- command_args..]
//! ```

/// Flag that carries the materialized configuration path.
pub const CONFIG_FLAG: &str = "--config";

/// Token separating the subcommand from its own arguments.
pub const ARGS_DELIMITER: &str = "--";

/// Structured form of a worker argument vector.
///
/// Built by the orchestrator once the configuration file exists, so a spec
/// without a `config_path` is never assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentSpec {
    /// Flags passed through verbatim, ahead of everything else.
    pub raw_args: Vec<String>,
    /// Path of the materialized configuration file.
    pub config_path: String,
    /// Optional subcommand name.
    pub command: Option<String>,
    /// Arguments for the subcommand, emitted after [`ARGS_DELIMITER`].
    pub command_args: Vec<String>,
}

impl ArgumentSpec {
    /// Create a spec that only carries the configuration path.
    pub fn new(config_path: impl Into<String>) -> Self {
        Self {
            config_path: config_path.into(),
            ..Self::default()
        }
    }

    /// Set the raw leading flags.
    #[must_use]
    pub fn with_raw_args(mut self, raw_args: Vec<String>) -> Self {
        self.raw_args = raw_args;
        self
    }

    /// Set the subcommand name.
    #[must_use]
    pub fn with_command(mut self, command: Option<String>) -> Self {
        self.command = command;
        self
    }

    /// Set the subcommand arguments.
    #[must_use]
    pub fn with_command_args(mut self, command_args: Vec<String>) -> Self {
        self.command_args = command_args;
        self
    }

    /// Produce the final argument vector.
    pub fn assemble(&self) -> Vec<String> {
        assemble(
            &self.raw_args,
            &self.config_path,
            self.command.as_deref(),
            &self.command_args,
        )
    }
}

/// Build the ordered argument vector for a worker.
///
/// An empty or absent `command` emits no subcommand token, and an empty
/// `command_args` emits no delimiter at all. Argument content is not
/// validated or quoted.
pub fn assemble(
    raw_args: &[String],
    config_path: &str,
    command: Option<&str>,
    command_args: &[String],
) -> Vec<String> {
    let mut args = Vec::with_capacity(raw_args.len() + command_args.len() + 4);
    args.extend(raw_args.iter().cloned());
    args.push(CONFIG_FLAG.to_string());
    args.push(config_path.to_string());

    if let Some(command) = command.filter(|c| !c.is_empty()) {
        args.push(command.to_string());
    }

    if !command_args.is_empty() {
        args.push(ARGS_DELIMITER.to_string());
        args.extend(command_args.iter().cloned());
    }

    args
}

/// Render a program and its arguments as a single shell command line.
///
/// Tokens are joined with single spaces and nothing is escaped: callers using
/// the shell transport own quoting.
pub fn shell_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn config_only() {
        let args = assemble(&[], "/tmp/c.json", None, &[]);
        assert_eq!(args, strings(&["--config", "/tmp/c.json"]));
    }

    #[test]
    fn full_vector_keeps_positional_order() {
        let args = assemble(
            &strings(&["-x"]),
            "/tmp/c.json",
            Some("ping"),
            &strings(&["a", "b"]),
        );
        assert_eq!(
            args,
            strings(&["-x", "--config", "/tmp/c.json", "ping", "--", "a", "b"])
        );
    }

    #[test]
    fn command_without_args_has_no_trailing_delimiter() {
        let args = assemble(&[], "/tmp/c.json", Some("ping"), &[]);
        assert_eq!(args, strings(&["--config", "/tmp/c.json", "ping"]));
        assert!(!args.contains(&"--".to_string()));
    }

    #[test]
    fn empty_command_name_is_treated_as_absent() {
        let args = assemble(&[], "/tmp/c.json", Some(""), &[]);
        assert_eq!(args, strings(&["--config", "/tmp/c.json"]));
    }

    #[test]
    fn command_args_without_command_still_get_delimiter() {
        let args = assemble(&[], "/tmp/c.json", None, &strings(&["pkg@1.0"]));
        assert_eq!(args, strings(&["--config", "/tmp/c.json", "--", "pkg@1.0"]));
    }

    #[test]
    fn raw_args_pass_through_untouched() {
        let args = assemble(
            &strings(&["--log-level", "trace", "$HOME;rm"]),
            "/tmp/c.json",
            None,
            &[],
        );
        assert_eq!(&args[..3], &strings(&["--log-level", "trace", "$HOME;rm"])[..]);
    }

    #[test]
    fn spec_builder_matches_free_function() {
        let spec = ArgumentSpec::new("/tmp/c.json")
            .with_raw_args(strings(&["--help"]))
            .with_command(Some("install".to_string()))
            .with_command_args(strings(&["cowboy-contrib-apt@2.1.0"]));

        assert_eq!(
            spec.assemble(),
            strings(&[
                "--help",
                "--config",
                "/tmp/c.json",
                "install",
                "--",
                "cowboy-contrib-apt@2.1.0"
            ])
        );
    }

    #[test]
    fn shell_line_joins_without_quoting() {
        let line = shell_line("cowboy", &strings(&["--config", "/tmp/a b.json", "ping"]));
        assert_eq!(line, "cowboy --config /tmp/a b.json ping");
    }
}
