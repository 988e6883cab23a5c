use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::command::{CommandSpec, RoleSpec};
use super::role::Role;

/// Main configuration structure for devsup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Seconds to wait after SIGTERM before sending SIGKILL
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: u64,

    /// Fixed delay standing in for a readiness check after startup
    #[serde(default = "default_readiness_delay_ms")]
    pub readiness_delay_ms: u64,

    /// How long to wait for output readers after a process is reaped
    #[serde(default = "default_reader_drain_ms")]
    pub reader_drain_ms: u64,

    /// Registry poll interval in non-interactive mode
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Ask children to emit colors even though their output is piped
    #[serde(default = "default_true")]
    pub force_color: bool,

    #[serde(default)]
    pub frontend: FrontendConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

const fn default_grace_period_secs() -> u64 {
    5
}

const fn default_readiness_delay_ms() -> u64 {
    3000
}

const fn default_reader_drain_ms() -> u64 {
    2000
}

const fn default_poll_interval_ms() -> u64 {
    1000
}

const fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grace_period_secs: default_grace_period_secs(),
            readiness_delay_ms: default_readiness_delay_ms(),
            reader_drain_ms: default_reader_drain_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            force_color: true,
            frontend: FrontendConfig::default(),
            backend: BackendConfig::default(),
            browser: BrowserConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    pub fn readiness_delay(&self) -> Duration {
        Duration::from_millis(self.readiness_delay_ms)
    }

    pub fn reader_drain(&self) -> Duration {
        Duration::from_millis(self.reader_drain_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// One-shot build command for a role.
    pub fn build_command(&self, role: Role) -> &CommandSpec {
        match role {
            Role::Frontend => &self.frontend.build,
            Role::Backend => &self.backend.build,
        }
    }

    /// Long-lived process contracts for every role that has one configured.
    ///
    /// The frontend only has one when a dev server is configured; its
    /// `dev_port` is exported as `PORT`. With `force_color`, color hints are
    /// added for every role.
    pub fn role_specs(&self) -> Vec<RoleSpec> {
        let mut specs = Vec::with_capacity(2);

        if let Some(ref dev) = self.frontend.dev {
            let mut command = dev.clone();
            if let Some(port) = self.frontend.dev_port {
                command.env.insert("PORT".to_string(), port.to_string());
            }
            specs.push(RoleSpec::new(Role::Frontend, command, self.grace_period()));
        }

        specs.push(RoleSpec::new(
            Role::Backend,
            self.backend.run.clone(),
            self.grace_period(),
        ));

        if self.force_color {
            for spec in &mut specs {
                for (key, value) in [("FORCE_COLOR", "1"), ("CLICOLOR_FORCE", "1")] {
                    spec.command
                        .env
                        .entry(key.to_string())
                        .or_insert_with(|| value.to_string());
                }
            }
        }

        specs
    }
}

/// Frontend build and optional dev server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FrontendConfig {
    #[serde(default = "default_frontend_build")]
    pub build: CommandSpec,

    /// Long-lived dev server, run alongside the backend when set
    #[serde(default)]
    pub dev: Option<CommandSpec>,

    /// Listening port override handed to the dev server
    #[serde(default)]
    pub dev_port: Option<u16>,

    /// Bundler output directory
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
}

fn default_frontend_build() -> CommandSpec {
    CommandSpec::new("npm").args(["run", "build"]).cwd("frontend")
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("frontend/dist")
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            build: default_frontend_build(),
            dev: None,
            dev_port: None,
            dist_dir: default_dist_dir(),
        }
    }
}

/// Backend build and server process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BackendConfig {
    #[serde(default = "default_backend_build")]
    pub build: CommandSpec,

    #[serde(default = "default_backend_run")]
    pub run: CommandSpec,

    /// Directory the backend serves static assets from
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

fn default_backend_build() -> CommandSpec {
    CommandSpec::new("go")
        .args(["build", "-o", "server", "."])
        .cwd("backend")
}

fn default_backend_run() -> CommandSpec {
    let program = if cfg!(windows) { "./server.exe" } else { "./server" };
    CommandSpec::new(program).cwd("backend")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("backend/public")
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            build: default_backend_build(),
            run: default_backend_run(),
            public_dir: default_public_dir(),
        }
    }
}

/// Browser tabs opened once the backend is assumed ready
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BrowserConfig {
    #[serde(default = "default_url")]
    pub url: String,

    /// Number of tabs (two simulate two players by default)
    #[serde(default = "default_tabs")]
    pub tabs: u32,

    /// Pause between consecutive tabs
    #[serde(default = "default_tab_delay_ms")]
    pub delay_ms: u64,

    #[serde(default = "default_true")]
    pub open_on_start: bool,
}

fn default_url() -> String {
    "http://localhost:8080".to_string()
}

const fn default_tabs() -> u32 {
    2
}

const fn default_tab_delay_ms() -> u64 {
    500
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            tabs: default_tabs(),
            delay_ms: default_tab_delay_ms(),
            open_on_start: true,
        }
    }
}

impl BrowserConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: compact, pretty or json
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for JSON log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

fn default_rotation() -> String {
    "never".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_specs_without_dev_server() {
        let config = Config::default();
        let specs = config.role_specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].role, Role::Backend);
        assert_eq!(specs[0].grace_period, Duration::from_secs(5));
        assert_eq!(
            specs[0].command.env.get("FORCE_COLOR").map(String::as_str),
            Some("1")
        );
    }

    #[test]
    fn test_dev_server_gets_port_override() {
        let mut config = Config::default();
        config.force_color = false;
        config.frontend.dev = Some(CommandSpec::new("npm").args(["run", "dev"]).cwd("frontend"));
        config.frontend.dev_port = Some(5174);

        let specs = config.role_specs();
        let frontend = specs
            .iter()
            .find(|spec| spec.role == Role::Frontend)
            .expect("frontend spec");
        assert_eq!(frontend.command.env.get("PORT").map(String::as_str), Some("5174"));
        assert!(!frontend.command.env.contains_key("FORCE_COLOR"));
    }

    #[test]
    fn test_explicit_env_wins_over_color_hints() {
        let mut config = Config::default();
        config.backend.run = config.backend.run.clone().env("FORCE_COLOR", "0");
        let specs = config.role_specs();
        assert_eq!(
            specs[0].command.env.get("FORCE_COLOR").map(String::as_str),
            Some("0")
        );
    }
}
