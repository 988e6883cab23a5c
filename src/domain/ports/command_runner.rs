//! Command runner port - one-shot external commands.

use async_trait::async_trait;

use crate::domain::errors::CommandError;
use crate::domain::models::{CommandSpec, StepResult};

/// Executes one-shot commands (builds) to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command`, wait for it and capture all of its output.
    ///
    /// `Ok` means the process ran; `StepResult::success` tells whether it
    /// exited cleanly. Spawn failures and I/O faults are `Err`. Never
    /// retries.
    async fn run(&self, command: &CommandSpec) -> Result<StepResult, CommandError>;
}
