use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A logical service slot supervised by devsup.
///
/// At most one live process exists per role at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The bundled web client (built once, optionally run as a dev server)
    Frontend,
    /// The server process that serves the staged frontend assets
    Backend,
}

impl Role {
    /// Every role, in display order.
    pub const ALL: [Self; 2] = [Self::Frontend, Self::Backend];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frontend => "frontend",
            Self::Backend => "backend",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "frontend" | "front" | "fe" => Ok(Self::Frontend),
            "backend" | "back" | "be" | "server" => Ok(Self::Backend),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Lifecycle state of a [`ProcessHandle`](crate::infrastructure::process::ProcessHandle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Never spawned
    NotStarted,
    /// Spawned and believed alive
    Running,
    /// Termination requested, waiting for exit
    Stopping,
    /// Exited after a stop request
    Stopped,
    /// Exited on its own before a stop was requested
    Failed,
}

impl ProcessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    /// Whether a process may still be attached to the handle.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Running | Self::Stopping)
    }

    /// Whether a new start is permitted from this state.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::NotStarted | Self::Stopped | Self::Failed)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_aliases() {
        assert_eq!("frontend".parse::<Role>(), Ok(Role::Frontend));
        assert_eq!(" FE ".parse::<Role>(), Ok(Role::Frontend));
        assert_eq!("Server".parse::<Role>(), Ok(Role::Backend));
        assert!("database".parse::<Role>().is_err());
    }

    #[test]
    fn test_state_predicates() {
        assert!(ProcessState::Running.is_live());
        assert!(ProcessState::Stopping.is_live());
        assert!(!ProcessState::Failed.is_live());

        assert!(ProcessState::NotStarted.can_start());
        assert!(ProcessState::Failed.can_start());
        assert!(!ProcessState::Running.can_start());
        assert!(!ProcessState::Stopping.can_start());
    }
}
