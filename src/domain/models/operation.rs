//! Composite operations modeled as ordered lists of fallible steps.

use std::fmt;

use super::role::Role;
use crate::domain::errors::SupervisorError;

/// A primitive supervisor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Stop(Role),
    Build(Role),
    /// Copy the frontend build output into the backend's public directory
    StageAssets,
    Start(Role),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stop(role) => write!(f, "stop {role}"),
            Self::Build(role) => write!(f, "build {role}"),
            Self::StageAssets => f.write_str("stage frontend assets"),
            Self::Start(role) => write!(f, "start {role}"),
        }
    }
}

/// Operations the supervisor exposes to the command surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Startup,
    RestartAll,
    RestartFrontendOnly,
    RestartBackendOnly,
    StartIfStopped(Role),
    StopIfRunning(Role),
}

impl Operation {
    /// The ordered steps this operation executes.
    ///
    /// `frontend_dev` adds the long-lived frontend dev server to startup.
    pub fn plan(&self, frontend_dev: bool) -> Vec<Step> {
        match self {
            Self::Startup => {
                let mut steps = vec![
                    Step::Build(Role::Frontend),
                    Step::StageAssets,
                    Step::Build(Role::Backend),
                    Step::Start(Role::Backend),
                ];
                if frontend_dev {
                    steps.push(Step::Start(Role::Frontend));
                }
                steps
            }
            Self::RestartAll => vec![
                Step::Stop(Role::Backend),
                Step::Build(Role::Frontend),
                Step::StageAssets,
                Step::Build(Role::Backend),
                Step::Start(Role::Backend),
            ],
            Self::RestartFrontendOnly => vec![Step::Build(Role::Frontend), Step::StageAssets],
            Self::RestartBackendOnly => vec![
                Step::Stop(Role::Backend),
                Step::Build(Role::Backend),
                Step::Start(Role::Backend),
            ],
            Self::StartIfStopped(role) => vec![Step::Start(*role)],
            Self::StopIfRunning(role) => vec![Step::Stop(*role)],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Startup => f.write_str("startup"),
            Self::RestartAll => f.write_str("restart all"),
            Self::RestartFrontendOnly => f.write_str("restart frontend"),
            Self::RestartBackendOnly => f.write_str("restart backend"),
            Self::StartIfStopped(role) => write!(f, "start {role}"),
            Self::StopIfRunning(role) => write!(f, "stop {role}"),
        }
    }
}

/// What a single step did when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Done,
    /// Nothing to do (e.g. stopping an already stopped role)
    NoOp,
    /// Declined without error (e.g. starting an already running role)
    Refused(String),
}

/// The step that aborted an operation and why.
#[derive(Debug)]
pub struct StepFailure {
    pub step: Step,
    pub error: SupervisorError,
}

#[derive(Debug)]
pub enum OperationOutcome {
    Completed,
    Refused(String),
    Failed(StepFailure),
}

/// Result of running one composite operation.
#[derive(Debug)]
pub struct OperationReport {
    pub operation: Operation,
    /// Steps that finished without error, in execution order
    pub completed: Vec<Step>,
    pub outcome: OperationOutcome,
}

impl OperationReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, OperationOutcome::Completed)
    }

    pub fn is_refused(&self) -> bool {
        matches!(self.outcome, OperationOutcome::Refused(_))
    }

    pub fn failed_step(&self) -> Option<Step> {
        match &self.outcome {
            OperationOutcome::Failed(failure) => Some(failure.step),
            _ => None,
        }
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        match &self.outcome {
            OperationOutcome::Completed => format!("{} complete", self.operation),
            OperationOutcome::Refused(reason) => format!("{} refused: {reason}", self.operation),
            OperationOutcome::Failed(failure) => format!(
                "{} failed at step '{}': {}",
                self.operation, failure.step, failure.error
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restart_all_plan_order() {
        assert_eq!(
            Operation::RestartAll.plan(false),
            vec![
                Step::Stop(Role::Backend),
                Step::Build(Role::Frontend),
                Step::StageAssets,
                Step::Build(Role::Backend),
                Step::Start(Role::Backend),
            ]
        );
    }

    #[test]
    fn test_frontend_only_plan_never_touches_backend_process() {
        let plan = Operation::RestartFrontendOnly.plan(true);
        assert!(plan
            .iter()
            .all(|step| !matches!(step, Step::Stop(_) | Step::Start(_))));
    }

    #[test]
    fn test_startup_plan_with_dev_server() {
        let plan = Operation::Startup.plan(true);
        assert_eq!(plan.last(), Some(&Step::Start(Role::Frontend)));
        assert_eq!(Operation::Startup.plan(false).len(), 4);
    }

    #[test]
    fn test_summary_names_failed_step() {
        let report = OperationReport {
            operation: Operation::RestartAll,
            completed: vec![Step::Stop(Role::Backend)],
            outcome: OperationOutcome::Failed(StepFailure {
                step: Step::Build(Role::Frontend),
                error: SupervisorError::ShuttingDown,
            }),
        };
        assert_eq!(report.failed_step(), Some(Step::Build(Role::Frontend)));
        assert_eq!(
            report.summary(),
            "restart all failed at step 'build frontend': Supervisor is shutting down"
        );
    }
}
