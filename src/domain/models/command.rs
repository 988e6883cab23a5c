use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::role::Role;

/// An external command: executable, arguments, working directory and
/// environment overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CommandSpec {
    /// Executable name (looked up in `PATH`) or path
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory, relative to the supervisor's own cwd
    #[serde(default = "default_cwd")]
    pub cwd: PathBuf,

    /// Variables added on top of the inherited environment
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_cwd() -> PathBuf {
    PathBuf::from(".")
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: default_cwd(),
            env: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Invocation contract for one long-lived role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSpec {
    pub role: Role,
    pub command: CommandSpec,
    /// Bounded wait after SIGTERM before escalating to SIGKILL
    pub grace_period: Duration,
}

impl RoleSpec {
    pub fn new(role: Role, command: CommandSpec, grace_period: Duration) -> Self {
        Self {
            role,
            command,
            grace_period,
        }
    }
}

/// Outcome of a one-shot command that ran to completion.
///
/// Never describes a long-lived process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl StepResult {
    pub fn succeeded(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    pub fn failed(exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_args() {
        let cmd = CommandSpec::new("npm").args(["run", "build"]).cwd("frontend");
        assert_eq!(cmd.to_string(), "npm run build");
        assert_eq!(cmd.cwd, PathBuf::from("frontend"));
    }

    #[test]
    fn test_yaml_defaults() {
        let cmd: CommandSpec = serde_yaml::from_str("program: go").expect("yaml should parse");
        assert_eq!(cmd.program, "go");
        assert!(cmd.args.is_empty());
        assert_eq!(cmd.cwd, PathBuf::from("."));
        assert!(cmd.env.is_empty());
    }
}
