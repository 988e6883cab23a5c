//! Domain errors for the devsup supervisor.

use std::path::PathBuf;
use thiserror::Error;

use super::models::Role;

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "termination by signal".to_string(),
    }
}

/// Classified failure of a one-shot command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The executable could not be started (missing or not runnable).
    #[error("Failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran and reported failure.
    #[error("`{program}` failed with {}", describe_exit(.code))]
    Exit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Any other fault while running or reading the command.
    #[error("Unexpected failure running `{program}`: {source}")]
    Unexpected {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    /// Classify an I/O error raised while launching `program`.
    pub fn from_spawn(program: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Self::Spawn {
                program: program.to_string(),
                source: err,
            },
            _ => Self::Unexpected {
                program: program.to_string(),
                source: err,
            },
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exit { code, .. } => *code,
            _ => None,
        }
    }
}

/// Errors surfaced by supervisor operations.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("{0} is already running")]
    AlreadyRunning(Role),

    #[error("No long-lived process is configured for {0}")]
    UnknownRole(Role),

    #[error("{role} exited unexpectedly with {}", describe_exit(.code))]
    UnexpectedProcessExit { role: Role, code: Option<i32> },

    #[error("Frontend build output not found at {}", .0.display())]
    AssetsMissing(PathBuf),

    #[error("Failed to stage assets into {}: {source}", .destination.display())]
    Staging {
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start {role}: {source}")]
    Spawn {
        role: Role,
        #[source]
        source: CommandError,
    },

    #[error("Supervisor is shutting down")]
    ShuttingDown,

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type SupervisorResult<T> = Result<T, SupervisorError>;
