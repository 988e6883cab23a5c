use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::models::{CommandSpec, Config};

/// Project config file, looked up in the working directory
pub const CONFIG_FILE: &str = "devsup.yaml";
/// Uncommitted local overrides
pub const LOCAL_CONFIG_FILE: &str = "devsup.local.yaml";
/// Prefix for environment overrides (`DEVSUP_BACKEND__PUBLIC_DIR=...`)
pub const ENV_PREFIX: &str = "DEVSUP_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Invalid grace_period_secs: 0. Must be at least 1")]
    ZeroGracePeriod,

    #[error("Command for {0} has an empty program")]
    EmptyProgram(String),

    #[error("Invalid browser tabs: {0}. Must be at most 10")]
    TooManyTabs(u32),

    #[error("Browser url cannot be empty")]
    EmptyUrl,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: compact, pretty, json")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid poll_interval_ms: 0. Must be positive")]
    ZeroPollInterval,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. devsup.yaml, or `path` when given
    /// 3. devsup.local.yaml (optional, not committed)
    /// 4. Environment variables (DEVSUP_* prefix, `__` separates nested keys)
    ///
    /// The implicit files are optional; an explicit `path` must exist.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        if let Some(explicit) = path {
            if !explicit.is_file() {
                return Err(ConfigError::MissingFile(explicit.to_path_buf()).into());
            }
        }
        let primary = path.unwrap_or_else(|| Path::new(CONFIG_FILE));
        let config: Config = Self::figment(primary)
            .extract()
            .with_context(|| format!("Failed to load configuration from {}", primary.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// The merged provider chain, before extraction.
    pub fn figment(primary: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(primary))
            .merge(Yaml::file(LOCAL_CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.grace_period_secs == 0 {
            return Err(ConfigError::ZeroGracePeriod);
        }

        if config.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }

        let mut commands: Vec<(&str, &CommandSpec)> = vec![
            ("frontend build", &config.frontend.build),
            ("backend build", &config.backend.build),
            ("backend run", &config.backend.run),
        ];
        if let Some(ref dev) = config.frontend.dev {
            commands.push(("frontend dev", dev));
        }
        for (name, command) in commands {
            if command.program.trim().is_empty() {
                return Err(ConfigError::EmptyProgram(name.to_string()));
            }
        }

        if config.browser.tabs > 10 {
            return Err(ConfigError::TooManyTabs(config.browser.tabs));
        }
        if config.browser.url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["compact", "pretty", "json"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}
