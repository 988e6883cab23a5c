//! Domain layer for the devsup supervisor
//!
//! This module contains the core models, errors and port traits.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{CommandError, SupervisorError, SupervisorResult};
