//! Launcher: startup, wait, shutdown.
//!
//! ```text
//! startup ──ok──▶ command loop (or poll loop with --no-input) ──┐
//!    │                                                          ├──▶ shutdown ──▶ exit code
//!    └──failed─────────────────────────────────────────────────┘
//!         (a signal at any point skips straight to shutdown;
//!          a second signal during shutdown kills without a grace period)
//! ```
//!
//! Whatever ends the session, the registry is drained before returning.

use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::cli::display;
use crate::cli::input::spawn_stdin_reader;
use crate::cli::{CommandLoop, LoopExit};
use crate::domain::models::Config;
use crate::infrastructure::browser::SystemBrowser;
use crate::infrastructure::console::ConsoleSink;
use crate::infrastructure::filesystem::LocalAssetStore;
use crate::infrastructure::process::SystemCommandRunner;
use crate::infrastructure::signals::{ShutdownSignal, SignalHandler};
use crate::services::{FixedDelayReadiness, Supervisor, SupervisorPorts};

/// How a session is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Read commands from stdin; otherwise poll until a signal arrives
    pub interactive: bool,
    pub open_browser: bool,
    pub skip_startup: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            interactive: true,
            open_browser: true,
            skip_startup: false,
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    Quit,
    EndOfInput,
    Signal(ShutdownSignal),
    /// Shutdown began without a signal being observed here
    Cancelled,
    StartupFailed,
}

impl LaunchOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Quit | Self::EndOfInput => 0,
            Self::StartupFailed => 1,
            Self::Signal(signal) => signal.exit_code(),
            Self::Cancelled => ShutdownSignal::Interrupt.exit_code(),
        }
    }
}

impl fmt::Display for LaunchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quit => f.write_str("quit"),
            Self::EndOfInput => f.write_str("end of input"),
            Self::Signal(signal) => write!(f, "{signal}"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::StartupFailed => f.write_str("startup failed"),
        }
    }
}

pub struct Launcher {
    supervisor: Arc<Supervisor>,
    options: LaunchOptions,
}

impl Launcher {
    /// Launcher over the real process, filesystem, browser and console
    /// adapters.
    pub fn new(config: Config, options: LaunchOptions) -> Self {
        let ports = SupervisorPorts {
            runner: Arc::new(SystemCommandRunner::new()),
            assets: Arc::new(LocalAssetStore::new()),
            browser: Arc::new(SystemBrowser::new()),
            readiness: Arc::new(FixedDelayReadiness::new(config.readiness_delay())),
            sink: Arc::new(ConsoleSink::new()),
        };
        let supervisor = Supervisor::new(config, ports, tokio_util::sync::CancellationToken::new());
        Self::with_supervisor(Arc::new(supervisor), options)
    }

    pub fn with_supervisor(supervisor: Arc<Supervisor>, options: LaunchOptions) -> Self {
        Self { supervisor, options }
    }

    pub fn supervisor(&self) -> &Arc<Supervisor> {
        &self.supervisor
    }

    /// Run a session, reading commands from stdin when interactive.
    pub async fn run(&self) -> anyhow::Result<LaunchOutcome> {
        let input = if self.options.interactive {
            Some(spawn_stdin_reader()?)
        } else {
            None
        };
        Ok(self.run_with_input(input).await)
    }

    /// Run a session with commands taken from `input` (`None` polls instead).
    pub async fn run_with_input(&self, input: Option<mpsc::Receiver<String>>) -> LaunchOutcome {
        let signals = SignalHandler::new(self.supervisor.shutdown_token());

        let outcome = tokio::select! {
            biased;
            signal = Self::wait_for_signal(&signals) => LaunchOutcome::Signal(signal),
            outcome = self.drive(input) => outcome,
        };

        let stopped = tokio::select! {
            biased;
            signal = Self::wait_for_signal(&signals) => {
                tracing::warn!(signal = %signal, "Second signal during shutdown; killing remaining processes");
                self.supervisor.force_shutdown().await
            }
            stopped = self.supervisor.shutdown() => stopped,
        };
        tracing::info!(outcome = %outcome, stopped = stopped.len(), "Session ended");
        outcome
    }

    async fn wait_for_signal(signals: &SignalHandler) -> ShutdownSignal {
        match signals.listen().await {
            Ok(signal) => signal,
            Err(e) => {
                tracing::warn!(error = %e, "Signal handling unavailable; use the quit command to exit");
                std::future::pending().await
            }
        }
    }

    async fn drive(&self, input: Option<mpsc::Receiver<String>>) -> LaunchOutcome {
        if !self.options.skip_startup {
            let report = self.supervisor.startup(self.options.open_browser).await;
            display::print_report(&report);
            if !report.is_success() {
                return LaunchOutcome::StartupFailed;
            }
        }

        match input {
            Some(input) => match CommandLoop::new(self.supervisor.clone(), input).run().await {
                LoopExit::Quit => LaunchOutcome::Quit,
                LoopExit::EndOfInput => LaunchOutcome::EndOfInput,
                LoopExit::Cancelled => LaunchOutcome::Cancelled,
            },
            None => self.watch().await,
        }
    }

    /// Non-interactive wait: surface unexpected exits every poll interval
    /// until shutdown begins.
    async fn watch(&self) -> LaunchOutcome {
        let token = self.supervisor.shutdown_token();
        let mut ticker = tokio::time::interval(self.supervisor.config().poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!("Running without command input; send SIGINT or SIGTERM to stop");

        loop {
            tokio::select! {
                () = token.cancelled() => return LaunchOutcome::Cancelled,
                _ = ticker.tick() => {
                    for exit in self.supervisor.poll().await {
                        eprintln!("{}", display::action_failure(&exit.to_string()));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(LaunchOutcome::Quit.exit_code(), 0);
        assert_eq!(LaunchOutcome::EndOfInput.exit_code(), 0);
        assert_eq!(LaunchOutcome::StartupFailed.exit_code(), 1);
        assert_eq!(LaunchOutcome::Signal(ShutdownSignal::Interrupt).exit_code(), 130);
        assert_eq!(LaunchOutcome::Signal(ShutdownSignal::Terminate).exit_code(), 143);
        assert_eq!(LaunchOutcome::Cancelled.exit_code(), 130);
    }
}
