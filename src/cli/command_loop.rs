//! Interactive command loop.
//!
//! Reads one line at a time from the input channel and maps its first word
//! onto a supervisor operation. Commands run one at a time; a line typed
//! while an operation is running waits in the channel.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::display;
use crate::domain::models::Role;
use crate::services::Supervisor;

/// A parsed command token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    RestartAll,
    RestartFrontend,
    RestartBackend,
    Start(Role),
    Stop(Role),
    OpenBrowser,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command '{0}'. Type 'h' for help")]
    UnknownCommand(String),

    #[error("Unknown role '{0}'. Expected frontend or backend")]
    UnknownRole(String),

    #[error("Too many arguments for '{0}'")]
    TooManyArguments(String),
}

impl Command {
    /// Parse one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Ok(None);
        };
        let token = first.to_lowercase();
        let argument = words.next();
        let takes_role = matches!(token.as_str(), "s" | "k");

        let command = match token.as_str() {
            "r" => Self::RestartAll,
            "f" => Self::RestartFrontend,
            "b" => Self::RestartBackend,
            "s" | "k" => {
                let role = Self::parse_role(argument)?;
                if token == "s" {
                    Self::Start(role)
                } else {
                    Self::Stop(role)
                }
            }
            "o" => Self::OpenBrowser,
            "p" => Self::Status,
            "h" | "?" => Self::Help,
            "q" => Self::Quit,
            _ => return Err(ParseError::UnknownCommand(token)),
        };

        if words.next().is_some() || (argument.is_some() && !takes_role) {
            return Err(ParseError::TooManyArguments(token));
        }
        Ok(Some(command))
    }

    fn parse_role(argument: Option<&str>) -> Result<Role, ParseError> {
        match argument {
            None => Ok(Role::Backend),
            Some(word) => word
                .parse::<Role>()
                .map_err(|_| ParseError::UnknownRole(word.to_string())),
        }
    }
}

/// Why the loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Quit,
    EndOfInput,
    /// The shutdown token fired while waiting for input
    Cancelled,
}

pub struct CommandLoop {
    supervisor: Arc<Supervisor>,
    input: mpsc::Receiver<String>,
    cancel: CancellationToken,
}

impl CommandLoop {
    pub fn new(supervisor: Arc<Supervisor>, input: mpsc::Receiver<String>) -> Self {
        let cancel = supervisor.shutdown_token();
        Self {
            supervisor,
            input,
            cancel,
        }
    }

    /// Run until quit, end of input or cancellation. Never shuts the
    /// supervisor down itself.
    pub async fn run(mut self) -> LoopExit {
        println!("{}", display::help_text());

        loop {
            let line = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return LoopExit::Cancelled,
                line = self.input.recv() => line,
            };
            let Some(line) = line else {
                tracing::debug!("Command input closed");
                return LoopExit::EndOfInput;
            };

            match Command::parse(&line) {
                Ok(None) => {}
                Ok(Some(Command::Quit)) => {
                    tracing::info!("Quit requested");
                    return LoopExit::Quit;
                }
                Ok(Some(command)) => self.dispatch(command).await,
                Err(e) => eprintln!("{}", display::action_failure(&e.to_string())),
            }
        }
    }

    /// Execute one command and print its result. Crashes noticed since the
    /// last command are reported first.
    pub async fn dispatch(&self, command: Command) {
        tracing::debug!(command = ?command, "Dispatching command");
        for exit in self.supervisor.poll().await {
            eprintln!("{}", display::action_failure(&exit.to_string()));
        }

        match command {
            Command::RestartAll => display::print_report(&self.supervisor.restart_all().await),
            Command::RestartFrontend => {
                display::print_report(&self.supervisor.restart_frontend_only().await);
            }
            Command::RestartBackend => {
                display::print_report(&self.supervisor.restart_backend_only().await);
            }
            Command::Start(role) => display::print_report(&self.supervisor.start_if_stopped(role).await),
            Command::Stop(role) => display::print_report(&self.supervisor.stop_if_running(role).await),
            Command::OpenBrowser => {
                let opened = self.supervisor.open_browser().await;
                println!("{}", display::action_success(&format!("Opened {opened} browser tab(s)")));
            }
            Command::Status => println!("{}", display::status_table(&self.supervisor.status().await)),
            Command::Help => println!("{}", display::help_text()),
            Command::Quit => {}
        }
    }
}
