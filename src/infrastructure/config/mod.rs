//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading (devsup.yaml, devsup.local.yaml)
//! - Environment variable overrides (DEVSUP_*)
//! - Configuration validation

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
