//! devsup - development supervisor
//!
//! devsup builds a frontend, stages its output into a backend's public
//! directory, builds and runs the backend, and then takes single-letter
//! commands to rebuild and restart either side while streaming both
//! processes' output with a `[role]` prefix.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Roles, process states, operation plans, errors and port traits
//! - **Application Layer** (`application`): Session lifecycle from startup to shutdown
//! - **Service Layer** (`services`): The supervisor and its process registry
//! - **Infrastructure Layer** (`infrastructure`): OS processes, signals, filesystem, config and logging
//! - **CLI Layer** (`cli`): Flags, the interactive command loop and its output
//!
//! # Example
//!
//! ```ignore
//! use devsup::application::{LaunchOptions, Launcher};
//! use devsup::infrastructure::config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load(None)?;
//!     let outcome = Launcher::new(config, LaunchOptions::default()).run().await?;
//!     std::process::exit(outcome.exit_code());
//! }
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{LaunchOptions, LaunchOutcome, Launcher};
pub use domain::errors::{CommandError, SupervisorError, SupervisorResult};
pub use domain::models::{
    CommandSpec, Config, Operation, OperationReport, ProcessState, Role, RoleSpec, Step,
    StepResult,
};
pub use domain::ports::{AssetStore, BrowserOpener, CommandRunner, OutputSink, ReadinessProbe};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{Supervisor, SupervisorPorts};
