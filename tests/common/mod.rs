//! Common test utilities for integration tests
//!
//! Recording fakes for the supervisor's ports, `sh`-based process specs and
//! polling helpers shared across the integration test files.

#![allow(dead_code)]

use async_trait::async_trait;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use devsup::domain::models::{OutputLine, StepResult};
use devsup::{
    AssetStore, BrowserOpener, CommandError, CommandRunner, CommandSpec, Config, OutputSink,
    ReadinessProbe, Role, Supervisor, SupervisorPorts,
};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Poll an async condition every 50ms until it holds or `timeout_ms` passes.
pub async fn wait_for<F, Fut>(mut predicate: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    while start.elapsed() < timeout {
        if predicate().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    false
}

/// `sh -c <script>`
pub fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("sh").args(["-c", script])
}

/// A backend that prints a line and then idles until signalled.
pub fn idle_backend() -> CommandSpec {
    sh("echo listening; exec sleep 30")
}

/// A backend that cannot be stopped with SIGTERM.
pub fn stubborn_backend() -> CommandSpec {
    sh("trap '' TERM; echo armed; exec sleep 30")
}

/// Build steps are recorded by program name and never spawn anything.
pub const FRONTEND_BUILD: &str = "frontend-build";
pub const BACKEND_BUILD: &str = "backend-build";

/// Config whose builds go through the fake runner and whose backend runs
/// `backend`.
pub fn test_config(backend: CommandSpec) -> Config {
    let mut config = Config::default();
    config.grace_period_secs = 1;
    config.reader_drain_ms = 200;
    config.readiness_delay_ms = 0;
    config.poll_interval_ms = 50;
    config.force_color = false;
    config.frontend.build = CommandSpec::new(FRONTEND_BUILD);
    config.backend.build = CommandSpec::new(BACKEND_BUILD);
    config.backend.run = backend;
    config.browser.delay_ms = 10;
    config
}

/// Records every command; programs listed in `failing` exit with status 1.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<String>>,
    failing: Vec<String>,
}

impl RecordingRunner {
    pub fn failing(programs: &[&str]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: programs.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &CommandSpec) -> Result<StepResult, CommandError> {
        self.calls.lock().unwrap().push(command.program.clone());
        if self.failing.contains(&command.program) {
            Ok(StepResult::failed(Some(1), format!("{} failed\n", command.program)))
        } else {
            Ok(StepResult::succeeded(format!("{} ok\n", command.program)))
        }
    }
}

/// Asset store that always has build output and records staging calls.
#[derive(Default)]
pub struct RecordingAssets {
    copies: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl RecordingAssets {
    pub fn copies(&self) -> Vec<(PathBuf, PathBuf)> {
        self.copies.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetStore for RecordingAssets {
    async fn assets_exist(&self, _path: &Path) -> bool {
        true
    }

    async fn replace_directory(&self, source: &Path, destination: &Path) -> std::io::Result<()> {
        self.copies
            .lock()
            .unwrap()
            .push((source.to_path_buf(), destination.to_path_buf()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingBrowser {
    opened: AtomicU32,
}

impl RecordingBrowser {
    pub fn opened(&self) -> u32 {
        self.opened.load(Ordering::SeqCst)
    }
}

impl BrowserOpener for RecordingBrowser {
    fn open_tab(&self, _url: &str) -> anyhow::Result<()> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct InstantReadiness;

#[async_trait]
impl ReadinessProbe for InstantReadiness {
    async fn wait_until_ready(&self, _role: Role) {}
}

/// Keeps every forwarded line.
#[derive(Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<OutputLine>>,
}

impl CollectingSink {
    pub fn lines(&self) -> Vec<OutputLine> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|l| l.line == text)
    }
}

impl OutputSink for CollectingSink {
    fn forward(&self, line: OutputLine) {
        self.lines.lock().unwrap().push(line);
    }
}

/// A supervisor over recording fakes, with handles to inspect them.
pub struct Harness {
    pub supervisor: Arc<Supervisor>,
    pub runner: Arc<RecordingRunner>,
    pub assets: Arc<RecordingAssets>,
    pub browser: Arc<RecordingBrowser>,
    pub sink: Arc<CollectingSink>,
}

impl Harness {
    pub fn new(config: Config) -> Self {
        Self::with_runner(config, RecordingRunner::default())
    }

    pub fn with_runner(config: Config, runner: RecordingRunner) -> Self {
        let runner = Arc::new(runner);
        let assets = Arc::new(RecordingAssets::default());
        let browser = Arc::new(RecordingBrowser::default());
        let sink = Arc::new(CollectingSink::default());
        let ports = SupervisorPorts {
            runner: runner.clone(),
            assets: assets.clone(),
            browser: browser.clone(),
            readiness: Arc::new(InstantReadiness),
            sink: sink.clone(),
        };
        let supervisor = Arc::new(Supervisor::new(config, ports, CancellationToken::new()));
        Self {
            supervisor,
            runner,
            assets,
            browser,
            sink,
        }
    }
}
