//! Supervisor service.
//!
//! Owns the process registry (one [`ProcessHandle`] per supervised role) and
//! executes composite operations as ordered [`Step`] plans. The first failing
//! step aborts the rest of the plan and is named in the returned
//! [`OperationReport`]; nothing is retried.
//!
//! Operations are serialized by the registry lock for the duration of each
//! start or stop, so two commands can never race on one handle.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::domain::errors::{CommandError, SupervisorError, SupervisorResult};
use crate::domain::models::{
    Config, Operation, OperationOutcome, OperationReport, OutputLine, ProcessState, Role, Step,
    StepFailure, StepStatus, StreamKind,
};
use crate::domain::ports::{AssetStore, BrowserOpener, CommandRunner, OutputSink, ReadinessProbe};
use crate::infrastructure::process::{HandleSnapshot, ProcessHandle, StopOutcome, Transition};

/// Collaborators the supervisor drives.
#[derive(Clone)]
pub struct SupervisorPorts {
    pub runner: Arc<dyn CommandRunner>,
    pub assets: Arc<dyn AssetStore>,
    pub browser: Arc<dyn BrowserOpener>,
    pub readiness: Arc<dyn ReadinessProbe>,
    pub sink: Arc<dyn OutputSink>,
}

pub struct Supervisor {
    config: Config,
    ports: SupervisorPorts,
    registry: Mutex<BTreeMap<Role, ProcessHandle>>,
    shutdown: CancellationToken,
}

impl Supervisor {
    /// Build a supervisor with a `NotStarted` handle for every role that has
    /// a long-lived process configured.
    pub fn new(config: Config, ports: SupervisorPorts, shutdown: CancellationToken) -> Self {
        let registry = config
            .role_specs()
            .into_iter()
            .map(|spec| {
                let role = spec.role;
                let handle = ProcessHandle::new(spec, ports.sink.clone(), config.reader_drain());
                (role, handle)
            })
            .collect();

        Self {
            config,
            ports,
            registry: Mutex::new(registry),
            shutdown,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Whether `role` has a long-lived process under supervision.
    pub fn supervises(&self, role: Role) -> bool {
        match role {
            Role::Frontend => self.config.frontend.dev.is_some(),
            Role::Backend => true,
        }
    }

    /// Execute an operation's plan in order, stopping at the first failure.
    ///
    /// Once shutdown has begun only stop steps still run; any other step
    /// fails with [`SupervisorError::ShuttingDown`].
    pub async fn execute(&self, operation: Operation) -> OperationReport {
        let steps = operation.plan(self.supervises(Role::Frontend));
        tracing::info!(operation = %operation, steps = steps.len(), "Starting operation");

        let mut completed = Vec::with_capacity(steps.len());
        for step in steps {
            if self.is_shutting_down() && !matches!(step, Step::Stop(_)) {
                let failure = StepFailure {
                    step,
                    error: SupervisorError::ShuttingDown,
                };
                return Self::report(operation, completed, OperationOutcome::Failed(failure));
            }

            tracing::debug!(operation = %operation, step = %step, "Running step");
            match self.run_step(step).await {
                Ok(StepStatus::Done | StepStatus::NoOp) => completed.push(step),
                Ok(StepStatus::Refused(reason)) => {
                    return Self::report(operation, completed, OperationOutcome::Refused(reason));
                }
                Err(error) => {
                    let failure = StepFailure { step, error };
                    return Self::report(operation, completed, OperationOutcome::Failed(failure));
                }
            }
        }

        Self::report(operation, completed, OperationOutcome::Completed)
    }

    fn report(operation: Operation, completed: Vec<Step>, outcome: OperationOutcome) -> OperationReport {
        let report = OperationReport {
            operation,
            completed,
            outcome,
        };
        match report.outcome {
            OperationOutcome::Completed | OperationOutcome::Refused(_) => {
                tracing::info!(operation = %operation, "{}", report.summary());
            }
            OperationOutcome::Failed(_) => tracing::error!(
                operation = %operation,
                completed_steps = report.completed.len(),
                "{}",
                report.summary()
            ),
        }
        report
    }

    async fn run_step(&self, step: Step) -> SupervisorResult<StepStatus> {
        match step {
            Step::Stop(role) => self.stop_role(role).await,
            Step::Build(role) => self.build(role).await,
            Step::StageAssets => self.stage_assets().await,
            Step::Start(role) => self.start_role(role).await,
        }
    }

    /// Stop everything, rebuild both sides, stage assets and start the
    /// backend again.
    pub async fn restart_all(&self) -> OperationReport {
        self.execute(Operation::RestartAll).await
    }

    /// Rebuild and restage the frontend. The backend keeps running and
    /// serves the new files; open pages must be reloaded by hand.
    pub async fn restart_frontend_only(&self) -> OperationReport {
        let report = self.execute(Operation::RestartFrontendOnly).await;
        if report.is_success() {
            tracing::info!("Frontend assets refreshed; reload open browser tabs to see them");
        }
        report
    }

    pub async fn restart_backend_only(&self) -> OperationReport {
        self.execute(Operation::RestartBackendOnly).await
    }

    pub async fn start_if_stopped(&self, role: Role) -> OperationReport {
        self.execute(Operation::StartIfStopped(role)).await
    }

    pub async fn stop_if_running(&self, role: Role) -> OperationReport {
        self.execute(Operation::StopIfRunning(role)).await
    }

    /// Initial build and launch, then wait for readiness and optionally open
    /// the browser. Readiness and the browser are skipped when startup fails.
    pub async fn startup(&self, open_browser: bool) -> OperationReport {
        let report = self.execute(Operation::Startup).await;
        if report.is_success() {
            self.ports.readiness.wait_until_ready(Role::Backend).await;
            if open_browser && self.config.browser.open_on_start {
                self.open_browser().await;
            }
        }
        report
    }

    /// Open the configured number of tabs, pausing between them. Failures
    /// are logged and never abort the caller. Returns the tabs opened.
    pub async fn open_browser(&self) -> u32 {
        let browser = &self.config.browser;
        let mut opened = 0;
        for tab in 0..browser.tabs {
            if tab > 0 {
                tokio::time::sleep(browser.delay()).await;
            }
            match self.ports.browser.open_tab(&browser.url) {
                Ok(()) => opened += 1,
                Err(e) => tracing::warn!(url = %browser.url, error = %format!("{e:#}"), "Could not open browser tab"),
            }
        }
        tracing::info!(url = %browser.url, opened, "Browser tabs opened");
        opened
    }

    /// Stop every live process and refuse further starts.
    ///
    /// Safe to call more than once: later calls find nothing live and
    /// return an empty list.
    pub async fn shutdown(&self) -> Vec<(Role, StopOutcome)> {
        self.shutdown.cancel();

        let mut registry = self.registry.lock().await;
        let mut stopped = Vec::new();
        for (role, handle) in registry.iter_mut() {
            match handle.stop().await {
                Ok(StopOutcome::NotRunning) => {}
                Ok(outcome) => stopped.push((*role, outcome)),
                Err(e) => tracing::error!(role = %role, error = %e, "Failed to stop process during shutdown"),
            }
        }

        if !stopped.is_empty() {
            tracing::info!(stopped = stopped.len(), "Supervisor shut down");
        }
        stopped
    }

    /// Like [`Supervisor::shutdown`], but kills every live process without
    /// waiting out the grace period.
    ///
    /// Resumes handles an abandoned graceful shutdown left in `Stopping`.
    pub async fn force_shutdown(&self) -> Vec<(Role, StopOutcome)> {
        self.shutdown.cancel();

        let mut registry = self.registry.lock().await;
        let mut killed = Vec::new();
        for (role, handle) in registry.iter_mut() {
            match handle.kill().await {
                Ok(StopOutcome::NotRunning) => {}
                Ok(outcome) => killed.push((*role, outcome)),
                Err(e) => tracing::error!(role = %role, error = %e, "Failed to kill process during shutdown"),
            }
        }

        if !killed.is_empty() {
            tracing::warn!(killed = killed.len(), "Supervisor force shut down");
        }
        killed
    }

    /// Refresh every handle and return a snapshot per supervised role.
    pub async fn status(&self) -> Vec<HandleSnapshot> {
        let mut registry = self.registry.lock().await;
        let mut snapshots = Vec::with_capacity(registry.len());
        for handle in registry.values_mut() {
            handle.refresh().await;
            snapshots.push(handle.snapshot());
        }
        snapshots
    }

    /// Refresh every handle and return the unexpected exits found.
    pub async fn poll(&self) -> Vec<SupervisorError> {
        let mut registry = self.registry.lock().await;
        let mut exits = Vec::new();
        for handle in registry.values_mut() {
            if let Some(exit) = handle.refresh().await {
                exits.push(exit);
            }
        }
        exits
    }

    /// Recorded state, without checking whether the process is still alive.
    pub async fn state(&self, role: Role) -> Option<ProcessState> {
        self.registry.lock().await.get(&role).map(ProcessHandle::state)
    }

    /// Refreshed snapshot of one role.
    pub async fn snapshot(&self, role: Role) -> Option<HandleSnapshot> {
        let mut registry = self.registry.lock().await;
        let handle = registry.get_mut(&role)?;
        handle.refresh().await;
        Some(handle.snapshot())
    }

    pub async fn transitions(&self, role: Role) -> Vec<Transition> {
        self.registry
            .lock()
            .await
            .get(&role)
            .map(|handle| handle.transitions().to_vec())
            .unwrap_or_default()
    }

    pub async fn active_readers(&self, role: Role) -> usize {
        self.registry
            .lock()
            .await
            .get(&role)
            .map_or(0, ProcessHandle::active_readers)
    }

    async fn build(&self, role: Role) -> SupervisorResult<StepStatus> {
        let command = self.config.build_command(role);
        tracing::info!(role = %role, command = %command, "Building");

        let result = self.ports.runner.run(command).await?;
        self.forward_output(role, StreamKind::Stdout, &result.stdout);
        self.forward_output(role, StreamKind::Stderr, &result.stderr);

        if !result.success {
            return Err(CommandError::Exit {
                program: command.program.clone(),
                code: result.exit_code,
                stderr: result.stderr,
            }
            .into());
        }
        Ok(StepStatus::Done)
    }

    fn forward_output(&self, role: Role, stream: StreamKind, text: &str) {
        for line in text.lines() {
            self.ports.sink.forward(OutputLine::new(role, stream, line));
        }
    }

    async fn stage_assets(&self) -> SupervisorResult<StepStatus> {
        let source = &self.config.frontend.dist_dir;
        let destination = &self.config.backend.public_dir;

        if !self.ports.assets.assets_exist(source).await {
            return Err(SupervisorError::AssetsMissing(source.clone()));
        }

        self.ports
            .assets
            .replace_directory(source, destination)
            .await
            .map_err(|e| SupervisorError::Staging {
                destination: destination.clone(),
                source: e,
            })?;

        tracing::info!(
            source = %source.display(),
            destination = %destination.display(),
            "Staged frontend assets"
        );
        Ok(StepStatus::Done)
    }

    async fn start_role(&self, role: Role) -> SupervisorResult<StepStatus> {
        if self.is_shutting_down() {
            return Err(SupervisorError::ShuttingDown);
        }

        let mut registry = self.registry.lock().await;
        let handle = registry
            .get_mut(&role)
            .ok_or(SupervisorError::UnknownRole(role))?;

        match handle.start().await {
            Ok(_) => Ok(StepStatus::Done),
            Err(err @ SupervisorError::AlreadyRunning(_)) => {
                tracing::info!(role = %role, pid = ?handle.pid(), "Start refused: {err}");
                Ok(StepStatus::Refused(err.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn stop_role(&self, role: Role) -> SupervisorResult<StepStatus> {
        let mut registry = self.registry.lock().await;
        let Some(handle) = registry.get_mut(&role) else {
            return Ok(StepStatus::NoOp);
        };

        match handle.stop().await? {
            StopOutcome::NotRunning => Ok(StepStatus::NoOp),
            StopOutcome::Graceful => Ok(StepStatus::Done),
            StopOutcome::Killed { after } => {
                tracing::warn!(
                    role = %role,
                    after_ms = after.as_millis() as u64,
                    "Process had to be killed after the grace period"
                );
                Ok(StepStatus::Done)
            }
        }
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("shutting_down", &self.is_shutting_down())
            .finish_non_exhaustive()
    }
}
