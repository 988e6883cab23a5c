pub mod command;
pub mod config;
pub mod operation;
pub mod output;
pub mod role;

pub use command::{CommandSpec, RoleSpec, StepResult};
pub use config::{BackendConfig, BrowserConfig, Config, FrontendConfig, LoggingConfig};
pub use operation::{
    Operation, OperationOutcome, OperationReport, Step, StepFailure, StepStatus,
};
pub use output::{OutputLine, StreamKind};
pub use role::{ProcessState, Role};
