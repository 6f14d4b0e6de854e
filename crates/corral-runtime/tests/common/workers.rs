//! Fake worker scripts.
//!
//! Scripts are run as `sh <script> ...` (the script path is the first raw
//! argument) rather than executed directly, which avoids `ETXTBSY` when
//! another test thread forks while a script is being written.

use std::fs;
use std::path::{Path, PathBuf};

/// Prints its argument vector one per line, then a line on stderr.
pub const ECHO_ARGS: &str = r#"for arg in "$@"; do echo "$arg"; done
echo "done on stderr" >&2
"#;

/// Prints the config file named by `--config`.
pub const CAT_CONFIG: &str = r#"while [ $# -gt 0 ]; do
  if [ "$1" = "--config" ]; then cat "$2"; exit 0; fi
  shift
done
exit 2
"#;

/// Reports ready, exits cleanly when the channel closes. Ignores SIGTERM.
pub const COOPERATIVE_SERVER: &str = r#"trap '' TERM
echo "server up"
echo '"ready"' >&0
while read -r line; do :; done
echo "server stopping"
exit 0
"#;

/// Reports ready, then ignores both the channel close and SIGTERM.
pub const STUBBORN_SERVER: &str = r#"trap '' TERM
echo '"ready"' >&0
while read -r line; do :; done
exec sleep 30
"#;

/// Reports ready and exits on the default SIGTERM action.
pub const TERMINABLE_SERVER: &str = r#"echo '"ready"' >&0
exec sleep 30
"#;

/// Sends unrelated messages, waits, then reports ready twice.
pub const SLOW_DOUBLE_READY_SERVER: &str = r#"trap '' TERM
echo '{"type":"progress","pct":50}' >&0
sleep 0.3
echo '"ready"' >&0
echo 'ready' >&0
while read -r line; do :; done
exit 0
"#;

/// Crashes before reporting ready.
pub const CRASHING_SERVER: &str = r#"echo "bad config" >&2
exit 3
"#;

/// Never reports ready.
pub const SILENT_SERVER: &str = "exec sleep 30\n";

/// Reports ready, then exits on its own shortly after.
pub const SHORT_LIVED_SERVER: &str = r#"echo '"ready"' >&0
sleep 0.1
exit 5
"#;

/// Records `eof` in `events` next to the script once the channel closes.
/// A forced stop must kill it before that happens.
pub const EOF_RECORDING_SERVER: &str = r#"LOG="$(dirname "$0")/events"
echo '"ready"' >&0
while read -r line; do :; done
echo eof >> "$LOG"
exec sleep 30
"#;

/// On SIGTERM, checks whether the channel is already closed and records
/// `term closed` or `term open` in `events`, then exits 0.
pub const TERM_PROBING_SERVER: &str = r#"LOG="$(dirname "$0")/events"
trap 'if read -r line; then echo "term open"; else echo "term closed"; fi >> "$LOG"; exit 0' TERM
echo '"ready"' >&0
while read -r line; do :; done
echo eof >> "$LOG"
while :; do sleep 1; done
"#;

/// Writes its PID to `pid` next to the script, then behaves like
/// [`STUBBORN_SERVER`].
pub const PID_RECORDING_SERVER: &str = r#"echo $$ > "$(dirname "$0")/pid"
trap '' TERM
echo '"ready"' >&0
while read -r line; do :; done
exec sleep 30
"#;

/// Lines appended to `name` next to the worker scripts, empty if absent.
pub fn read_log(dir: &Path, name: &str) -> Vec<String> {
    fs::read_to_string(dir.join(name))
        .map(|text| text.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Write a `/bin/sh` script named `name` into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

/// Raw arguments that make `sh` run `script`.
pub fn script_args(script: &Path) -> Vec<String> {
    vec![script.display().to_string()]
}
