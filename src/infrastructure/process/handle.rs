//! Lifecycle of one long-lived child process.
//!
//! ```text
//! NotStarted ──spawn──▶ Running ──stop──▶ Stopping ──exit / kill──▶ Stopped
//!                          │
//!                          └──exits on its own (seen by refresh)──▶ Failed
//! Stopped / Failed ──spawn──▶ Running
//! ```
//!
//! Crashes are detected lazily: a process that dies on its own stays
//! `Running` until the next call to [`ProcessHandle::refresh`] (every start,
//! stop and status query refreshes first).

use chrono::{DateTime, Utc};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};

use super::streamer::OutputStreamer;
use super::termination;
use crate::domain::errors::{CommandError, SupervisorError, SupervisorResult};
use crate::domain::models::{ProcessState, Role, RoleSpec};
use crate::domain::ports::OutputSink;

/// A recorded state change, timed relative to the handle's creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ProcessState,
    pub to: ProcessState,
    pub at: Duration,
}

/// How a stop request finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Nothing was running
    NotRunning,
    /// Exited within the grace period after SIGTERM
    Graceful,
    /// Grace period elapsed; SIGKILL was issued `after` the stop began
    Killed { after: Duration },
}

/// Point-in-time view of a handle for status output.
#[derive(Debug, Clone)]
pub struct HandleSnapshot {
    pub role: Role,
    pub state: ProcessState,
    pub pid: Option<u32>,
    pub started_at: Option<DateTime<Utc>>,
    pub exit_code: Option<i32>,
    pub command: String,
}

impl HandleSnapshot {
    pub fn uptime(&self) -> Option<chrono::Duration> {
        match self.state {
            ProcessState::Running | ProcessState::Stopping => {
                self.started_at.map(|started| Utc::now() - started)
            }
            _ => None,
        }
    }
}

/// The supervisor's record of one role's process.
pub struct ProcessHandle {
    spec: RoleSpec,
    state: ProcessState,
    pid: Option<u32>,
    started_at: Option<DateTime<Utc>>,
    exit_code: Option<i32>,
    child: Option<Child>,
    streamer: Option<OutputStreamer>,
    sink: Arc<dyn OutputSink>,
    reader_drain: Duration,
    created: Instant,
    transitions: Vec<Transition>,
}

impl ProcessHandle {
    pub fn new(spec: RoleSpec, sink: Arc<dyn OutputSink>, reader_drain: Duration) -> Self {
        Self {
            spec,
            state: ProcessState::NotStarted,
            pid: None,
            started_at: None,
            exit_code: None,
            child: None,
            streamer: None,
            sink,
            reader_drain,
            created: Instant::now(),
            transitions: Vec::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.spec.role
    }

    pub fn spec(&self) -> &RoleSpec {
        &self.spec
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Reader tasks still attached (two while running, none otherwise).
    pub fn active_readers(&self) -> usize {
        self.streamer.as_ref().map_or(0, OutputStreamer::active_readers)
    }

    pub fn snapshot(&self) -> HandleSnapshot {
        HandleSnapshot {
            role: self.spec.role,
            state: self.state,
            pid: self.pid,
            started_at: self.started_at,
            exit_code: self.exit_code,
            command: self.spec.command.to_string(),
        }
    }

    fn transition(&mut self, to: ProcessState) {
        let from = self.state;
        self.state = to;
        self.transitions.push(Transition {
            from,
            to,
            at: self.created.elapsed(),
        });
        tracing::debug!(role = %self.spec.role, from = %from, to = %to, "Process state changed");
    }

    fn build_command(&self) -> Command {
        let spec = &self.spec.command;
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.cwd)
            .envs(&spec.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }

    /// Spawn the role's process.
    ///
    /// Refused with [`SupervisorError::AlreadyRunning`] while a process is
    /// attached, so two servers never contend for the same port.
    pub async fn start(&mut self) -> SupervisorResult<Option<u32>> {
        self.refresh().await;
        if !self.state.can_start() {
            return Err(SupervisorError::AlreadyRunning(self.spec.role));
        }

        let role = self.spec.role;
        let mut child = self.build_command().spawn().map_err(|e| {
            tracing::error!(role = %role, command = %self.spec.command, error = %e, "Failed to spawn process");
            SupervisorError::Spawn {
                role,
                source: CommandError::from_spawn(&self.spec.command.program, e),
            }
        })?;

        let streamer = OutputStreamer::attach(
            role,
            child.stdout.take(),
            child.stderr.take(),
            self.sink.clone(),
        );

        self.pid = child.id();
        self.started_at = Some(Utc::now());
        self.exit_code = None;
        self.child = Some(child);
        self.streamer = Some(streamer);
        self.transition(ProcessState::Running);

        tracing::info!(
            role = %role,
            pid = ?self.pid,
            command = %self.spec.command,
            "Process started"
        );
        Ok(self.pid)
    }

    /// Detect a process that exited without being asked to.
    ///
    /// Moves `Running → Failed` and returns the unexpected exit, or `None`
    /// when nothing changed.
    pub async fn refresh(&mut self) -> Option<SupervisorError> {
        if self.state != ProcessState::Running {
            return None;
        }
        let child = self.child.as_mut()?;

        let status = match child.try_wait() {
            Ok(Some(status)) => status,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(role = %self.spec.role, error = %e, "Failed to poll process status");
                return None;
            }
        };

        self.exit_code = status.code();
        self.release().await;
        self.transition(ProcessState::Failed);

        let err = SupervisorError::UnexpectedProcessExit {
            role: self.spec.role,
            code: self.exit_code,
        };
        tracing::warn!(role = %self.spec.role, exit_code = ?self.exit_code, "{err}");
        Some(err)
    }

    /// Stop the process: SIGTERM, wait up to the grace period, then SIGKILL
    /// and wait for exit.
    ///
    /// Stopping a handle with nothing attached is a successful no-op. A
    /// handle left in `Stopping` by an interrupted stop is resumed.
    pub async fn stop(&mut self) -> SupervisorResult<StopOutcome> {
        self.refresh().await;
        if !self.state.is_live() {
            return Ok(StopOutcome::NotRunning);
        }

        let role = self.spec.role;
        let grace = self.spec.grace_period;
        if self.state == ProcessState::Running {
            self.transition(ProcessState::Stopping);
        }
        tracing::info!(role = %role, pid = ?self.pid, grace_ms = grace.as_millis() as u64, "Stopping process");

        let Some(child) = self.child.as_mut() else {
            self.transition(ProcessState::Stopped);
            return Ok(StopOutcome::NotRunning);
        };

        let began = Instant::now();
        if let Err(e) = termination::request_termination(child) {
            tracing::warn!(role = %role, error = %e, "Failed to send termination request");
        }

        let (outcome, status) = match tokio::time::timeout(grace, child.wait()).await {
            Ok(Ok(status)) => (StopOutcome::Graceful, status),
            waited => {
                if let Ok(Err(e)) = waited {
                    tracing::warn!(role = %role, error = %e, "Wait after termination request failed");
                } else {
                    tracing::warn!(
                        role = %role,
                        grace_ms = grace.as_millis() as u64,
                        "Process ignored termination request; escalating to kill"
                    );
                }
                let after = began.elapsed();
                if let Err(e) = termination::force_kill(child) {
                    tracing::error!(role = %role, error = %e, "Failed to kill process");
                }
                let status = child
                    .wait()
                    .await
                    .map_err(|e| SupervisorError::Unexpected(format!("waiting for {role} to exit: {e}")))?;
                (StopOutcome::Killed { after }, status)
            }
        };

        self.finish_stop(status, outcome).await;
        Ok(outcome)
    }

    /// Kill the process group at once, without a termination request or
    /// grace period, and wait for exit.
    ///
    /// Same no-op and resume rules as [`ProcessHandle::stop`].
    pub async fn kill(&mut self) -> SupervisorResult<StopOutcome> {
        self.refresh().await;
        if !self.state.is_live() {
            return Ok(StopOutcome::NotRunning);
        }

        let role = self.spec.role;
        if self.state == ProcessState::Running {
            self.transition(ProcessState::Stopping);
        }

        let Some(child) = self.child.as_mut() else {
            self.transition(ProcessState::Stopped);
            return Ok(StopOutcome::NotRunning);
        };

        tracing::warn!(role = %role, pid = ?self.pid, "Killing process without grace period");
        if let Err(e) = termination::force_kill(child) {
            tracing::error!(role = %role, error = %e, "Failed to kill process");
        }
        let status = child
            .wait()
            .await
            .map_err(|e| SupervisorError::Unexpected(format!("waiting for {role} to exit: {e}")))?;

        let outcome = StopOutcome::Killed { after: Duration::ZERO };
        self.finish_stop(status, outcome).await;
        Ok(outcome)
    }

    async fn finish_stop(&mut self, status: std::process::ExitStatus, outcome: StopOutcome) {
        self.exit_code = status.code();
        self.release().await;
        self.transition(ProcessState::Stopped);
        tracing::info!(role = %self.spec.role, outcome = ?outcome, exit_code = ?self.exit_code, "Process stopped");
    }

    /// Drop the child and wind down its readers. Identity is cleared only
    /// here, once the process has been reaped.
    async fn release(&mut self) {
        self.child = None;
        self.pid = None;
        if let Some(streamer) = self.streamer.take() {
            streamer.finish(self.reader_drain).await;
        }
    }
}

impl std::fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("role", &self.spec.role)
            .field("state", &self.state)
            .field("pid", &self.pid)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}
