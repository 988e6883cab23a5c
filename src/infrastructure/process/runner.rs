//! One-shot command runner backed by `tokio::process`.
//!
//! Runs build commands (`npm run build`, `go build`) to completion in their
//! working directory and classifies the outcome. Output is captured in full;
//! nothing is streamed while the command runs.
//!
//! Each build leads its own process group. Dropping the `run` future (a
//! session torn down mid-build) kills the whole group, so compilers and
//! bundlers the build spawned do not outlive it.

use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

use super::termination;
use crate::domain::errors::CommandError;
use crate::domain::models::{CommandSpec, StepResult};
use crate::domain::ports::CommandRunner;

/// Kills the build's process group unless the build ran to completion.
struct GroupGuard {
    child: Child,
    finished: bool,
}

impl GroupGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            finished: false,
        }
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = termination::force_kill(&mut self.child) {
            tracing::warn!(pid = ?self.child.id(), error = %e, "Failed to kill abandoned build");
        }
    }
}

async fn read_all<R: AsyncRead + Unpin>(stream: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// [`CommandRunner`] that spawns real OS processes.
#[derive(Debug, Default, Clone)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }

    fn build_command(spec: &CommandSpec) -> Command {
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
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<StepResult, CommandError> {
        tracing::info!(
            command = %spec,
            cwd = %spec.cwd.display(),
            "Running one-shot command"
        );

        let mut child = Self::build_command(spec).spawn().map_err(|e| {
            tracing::error!(program = %spec.program, error = %e, "Failed to spawn command");
            CommandError::from_spawn(&spec.program, e)
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let mut guard = GroupGuard::new(child);

        let (status, stdout, stderr) =
            tokio::try_join!(guard.child.wait(), read_all(stdout), read_all(stderr)).map_err(
                |e| CommandError::Unexpected {
                    program: spec.program.clone(),
                    source: e,
                },
            )?;
        guard.finished = true;

        let result = StepResult {
            success: status.success(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_code: status.code(),
        };

        if result.success {
            tracing::info!(command = %spec, "Command finished");
        } else {
            tracing::warn!(
                command = %spec,
                exit_code = ?result.exit_code,
                "Command failed"
            );
        }

        Ok(result)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    use std::time::Duration;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh").args(["-c", script])
    }

    #[tokio::test]
    async fn test_captures_both_streams() {
        let runner = SystemCommandRunner::new();
        let result = runner
            .run(&sh("echo built; echo warning >&2"))
            .await
            .expect("sh should run");

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout.trim(), "built");
        assert_eq!(result.stderr.trim(), "warning");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_not_a_spawn_error() {
        let runner = SystemCommandRunner::new();
        let result = runner.run(&sh("echo broken >&2; exit 3")).await.expect("sh should run");
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.stderr.trim(), "broken");
    }

    #[tokio::test]
    async fn test_missing_executable_is_spawn_error() {
        let runner = SystemCommandRunner::new();
        let err = runner
            .run(&CommandSpec::new("devsup-definitely-not-installed"))
            .await
            .expect_err("missing binary should fail");
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_env_and_cwd_are_applied() {
        let dir = tempfile::tempdir().expect("tempdir");
        let runner = SystemCommandRunner::new();
        let spec = sh("printf '%s' \"$GREETING\"; pwd >&2")
            .cwd(dir.path())
            .env("GREETING", "hello");

        let result = runner.run(&spec).await.expect("sh should run");
        assert_eq!(result.stdout, "hello");
        let expected = dir.path().canonicalize().expect("canonical tempdir");
        assert_eq!(
            std::path::Path::new(result.stderr.trim())
                .canonicalize()
                .expect("canonical pwd"),
            expected
        );
    }

    /// Live and not a zombie waiting for init to reap it.
    fn is_alive(pid: i32) -> bool {
        if kill(Pid::from_raw(pid), None).is_err() {
            return false;
        }
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => !stat.contains(") Z"),
            Err(_) => true,
        }
    }

    #[tokio::test]
    async fn test_abandoned_build_takes_its_subprocesses_down() {
        let dir = tempfile::tempdir().expect("tempdir");
        let runner = SystemCommandRunner::new();
        let spec = sh("sleep 300 & echo $! > worker.pid; wait").cwd(dir.path());

        let run = tokio::time::timeout(Duration::from_millis(500), runner.run(&spec)).await;
        assert!(run.is_err(), "build should still be running when abandoned");

        let pid: i32 = std::fs::read_to_string(dir.path().join("worker.pid"))
            .expect("worker pid file")
            .trim()
            .parse()
            .expect("numeric pid");

        let mut alive = true;
        for _ in 0..50 {
            alive = is_alive(pid);
            if !alive {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!alive, "worker {pid} outlived the abandoned build");
    }
}
