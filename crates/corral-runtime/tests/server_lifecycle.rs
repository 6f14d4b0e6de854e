//! Integration tests for the server launch handshake and termination protocol.

#![cfg(unix)]

mod common;

use common::workers::{
    COOPERATIVE_SERVER, CRASHING_SERVER, EOF_RECORDING_SERVER, PID_RECORDING_SERVER,
    SHORT_LIVED_SERVER, SILENT_SERVER, SLOW_DOUBLE_READY_SERVER, STUBBORN_SERVER,
    TERM_PROBING_SERVER, TERMINABLE_SERVER, read_log, script_args, write_script,
};
use common::{RecordingAbort, RecordingSink};
use corral_core::{
    ExitOutcome, OrchestratorConfig, ServerRequest, StreamKind, TerminationState, Transport,
};
use corral_runtime::{LaunchError, Orchestrator, STUCK_SHUTDOWN_EXIT_CODE, ServerController};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Upper bound for anything that should happen "promptly".
const PROMPT: Duration = Duration::from_secs(5);

struct Harness {
    scripts: TempDir,
    config_dir: TempDir,
    abort: Arc<RecordingAbort>,
    sink: Arc<RecordingSink>,
    config: OrchestratorConfig,
}

impl Harness {
    fn new() -> Self {
        let config_dir = TempDir::new().unwrap();
        let config = OrchestratorConfig::default()
            .with_server_path("sh")
            .with_config_dir(config_dir.path())
            .with_ready_timeout(Some(Duration::from_secs(10)))
            .with_shutdown_grace(None);
        Self {
            scripts: TempDir::new().unwrap(),
            config_dir,
            abort: Arc::new(RecordingAbort::default()),
            sink: Arc::new(RecordingSink::default()),
            config,
        }
    }

    fn configure(mut self, f: impl FnOnce(OrchestratorConfig) -> OrchestratorConfig) -> Self {
        self.config = f(self.config);
        self
    }

    fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(self.config.clone())
            .unwrap()
            .with_output_sink(self.sink.clone())
            .with_host_abort(self.abort.clone())
    }

    fn request(&self, body: &str) -> ServerRequest {
        let script = write_script(self.scripts.path(), "server.sh", body);
        ServerRequest::new().with_raw_args(script_args(&script))
    }

    async fn launch(&self, body: &str) -> Result<ServerController, LaunchError> {
        self.orchestrator().launch_server(self.request(body)).await
    }
}

async fn within<F: std::future::Future>(future: F) -> F::Output {
    tokio::time::timeout(PROMPT, future)
        .await
        .expect("operation did not finish promptly")
}

/// Poll `check` until it holds or `PROMPT` elapses.
async fn eventually(check: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + PROMPT;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

#[tokio::test]
async fn test_graceful_termination_of_cooperative_server() {
    let harness = Harness::new();
    let controller = harness.launch(COOPERATIVE_SERVER).await.unwrap();

    assert!(controller.pid() > 0);
    assert_eq!(controller.state(), TerminationState::Running);

    let outcome = within(controller.terminate(false)).await.unwrap();

    assert_eq!(outcome, ExitOutcome::exited(0));
    assert_eq!(controller.state(), TerminationState::Exited);
    assert!(harness.abort.codes().is_empty());
    assert!(
        eventually(|| harness
            .sink
            .lines_for(StreamKind::Stdout)
            .contains(&"server stopping".to_string()))
        .await
    );
}

#[tokio::test]
async fn test_server_config_file_is_named_after_binary() {
    let harness = Harness::new();
    let controller = harness.launch(COOPERATIVE_SERVER).await.unwrap();

    let names: Vec<String> = std::fs::read_dir(harness.config_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("sh-config"));
    assert!(names[0].ends_with(".json"));

    within(controller.terminate(false)).await.unwrap();
}

#[tokio::test]
async fn test_ready_callback_fires_once_and_only_after_ready() {
    let harness = Harness::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = tokio::sync::oneshot::channel();
    let counter = calls.clone();

    let started = Instant::now();
    harness
        .orchestrator()
        .spawn_server(harness.request(SLOW_DOUBLE_READY_SERVER), move |result| {
            counter.fetch_add(1, Ordering::SeqCst);
            tx.send(result).unwrap();
        });

    let controller = within(rx).await.unwrap().unwrap();
    assert!(started.elapsed() >= Duration::from_millis(300));

    // The second "ready" must not deliver the controller again
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(controller.state(), TerminationState::Running);

    let outcome = within(controller.terminate(false)).await.unwrap();
    assert_eq!(outcome, ExitOutcome::exited(0));
}

#[tokio::test]
async fn test_terminate_with_calls_on_exited_once() {
    let harness = Harness::new();
    let controller = harness.launch(COOPERATIVE_SERVER).await.unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = tokio::sync::oneshot::channel();
    let counter = calls.clone();

    controller.terminate_with(false, move |result| {
        counter.fetch_add(1, Ordering::SeqCst);
        tx.send(result).unwrap();
    });

    assert_eq!(within(rx).await.unwrap(), Ok(ExitOutcome::exited(0)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_second_request_during_graceful_shutdown_escalates() {
    let harness = Harness::new();
    let controller = harness.launch(STUBBORN_SERVER).await.unwrap();

    controller.request_termination(false).unwrap();
    let outcome = within(controller.terminate(false)).await.unwrap();

    assert_eq!(outcome, ExitOutcome::signaled(9));
    assert_eq!(harness.abort.codes(), vec![STUCK_SHUTDOWN_EXIT_CODE]);
}

#[tokio::test]
async fn test_forced_termination_does_not_wait_for_cooperation() {
    let harness = Harness::new();
    let controller = harness.launch(STUBBORN_SERVER).await.unwrap();

    let started = Instant::now();
    let outcome = within(controller.terminate(true)).await.unwrap();

    assert_eq!(outcome, ExitOutcome::signaled(9));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(harness.abort.codes().is_empty());
}

#[tokio::test]
async fn test_sigterm_follows_channel_close() {
    let harness = Harness::new();
    let controller = harness.launch(TERMINABLE_SERVER).await.unwrap();

    let outcome = within(controller.terminate(false)).await.unwrap();

    assert_eq!(outcome, ExitOutcome::signaled(15));
}

#[tokio::test]
async fn test_channel_is_closed_before_sigterm() {
    let harness = Harness::new();
    let controller = harness.launch(TERM_PROBING_SERVER).await.unwrap();

    let outcome = within(controller.terminate(false)).await.unwrap();

    assert_eq!(outcome, ExitOutcome::exited(0));
    let events = read_log(harness.scripts.path(), "events");
    assert_eq!(events.last().map(String::as_str), Some("term closed"), "{events:?}");
    assert!(!events.contains(&"term open".to_string()), "{events:?}");
}

#[tokio::test]
async fn test_forced_termination_keeps_channel_open_until_killed() {
    let harness = Harness::new();
    let controller = harness.launch(EOF_RECORDING_SERVER).await.unwrap();

    let outcome = within(controller.terminate(true)).await.unwrap();

    assert_eq!(outcome, ExitOutcome::signaled(9));
    assert!(read_log(harness.scripts.path(), "events").is_empty());
}

#[tokio::test]
async fn test_shell_transport_signals_reach_the_worker() {
    let harness = Harness::new().configure(|c| c.with_transport(Transport::Shell));
    let controller = harness.launch(PID_RECORDING_SERVER).await.unwrap();

    let recorded = read_log(harness.scripts.path(), "pid");
    assert_eq!(recorded, vec![controller.pid().to_string()]);

    let outcome = within(controller.terminate(true)).await.unwrap();
    assert_eq!(outcome, ExitOutcome::signaled(9));
}

#[tokio::test]
async fn test_shell_transport_graceful_stop_reports_worker_exit() {
    let harness = Harness::new().configure(|c| c.with_transport(Transport::Shell));
    let controller = harness.launch(COOPERATIVE_SERVER).await.unwrap();

    let outcome = within(controller.terminate(false)).await.unwrap();

    assert_eq!(outcome, ExitOutcome::exited(0));
    assert!(harness.abort.codes().is_empty());
}

#[tokio::test]
async fn test_grace_expiry_kills_without_aborting_host() {
    let harness =
        Harness::new().configure(|c| c.with_shutdown_grace(Some(Duration::from_millis(200))));
    let controller = harness.launch(STUBBORN_SERVER).await.unwrap();

    let outcome = within(controller.terminate(false)).await.unwrap();

    assert_eq!(outcome, ExitOutcome::signaled(9));
    assert_eq!(controller.state(), TerminationState::Exited);
    assert!(harness.abort.codes().is_empty());
}

#[tokio::test]
async fn test_crash_before_ready_is_reported() {
    let harness = Harness::new();

    let err = within(harness.launch(CRASHING_SERVER)).await.unwrap_err();

    assert!(matches!(
        err,
        LaunchError::ExitedBeforeReady { outcome } if outcome == ExitOutcome::exited(3)
    ));
    assert!(
        eventually(|| harness
            .sink
            .lines_for(StreamKind::Stderr)
            .contains(&"bad config".to_string()))
        .await
    );
}

#[tokio::test]
async fn test_ready_timeout_kills_silent_server() {
    let harness =
        Harness::new().configure(|c| c.with_ready_timeout(Some(Duration::from_millis(200))));

    let started = Instant::now();
    let err = within(harness.launch(SILENT_SERVER)).await.unwrap_err();

    assert!(matches!(err, LaunchError::ReadyTimeout { timeout } if timeout == Duration::from_millis(200)));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_terminate_after_exit_returns_recorded_outcome() {
    let harness = Harness::new();
    let controller = harness.launch(SHORT_LIVED_SERVER).await.unwrap();

    assert_eq!(within(controller.wait()).await.unwrap(), ExitOutcome::exited(5));
    assert_eq!(controller.state(), TerminationState::Exited);

    let outcome = within(controller.terminate(true)).await.unwrap();
    assert_eq!(outcome, ExitOutcome::exited(5));
    assert!(harness.abort.codes().is_empty());
}
