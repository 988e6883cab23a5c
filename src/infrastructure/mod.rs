//! Infrastructure layer module
//!
//! This module contains the adapters that touch the operating system:
//! - Process management (one-shot runner, long-lived handles, output readers)
//! - Configuration management
//! - Logging infrastructure
//! - Filesystem, browser and console adapters
//! - Signal handling
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod browser;
pub mod config;
pub mod console;
pub mod filesystem;
pub mod logging;
pub mod process;
pub mod signals;
