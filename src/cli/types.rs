//! CLI type definitions
//!
//! Flags override the layered configuration file; see
//! [`ConfigLoader`](crate::infrastructure::config::ConfigLoader).

use clap::Parser;
use std::path::PathBuf;

use crate::application::LaunchOptions;
use crate::domain::models::Config;

#[derive(Parser, Debug)]
#[command(name = "devsup")]
#[command(about = "Build, run and restart a frontend/backend pair during development", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: devsup.yaml in the working directory)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not open the browser after startup
    #[arg(long)]
    pub no_browser: bool,

    /// Run without reading commands; wait for a signal instead
    #[arg(long)]
    pub no_input: bool,

    /// Seconds to wait after SIGTERM before killing a process
    #[arg(long, value_name = "SECS")]
    pub grace_period: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Skip the initial build and launch
    #[arg(long)]
    pub skip_startup: bool,
}

impl Cli {
    /// Apply flag overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(secs) = self.grace_period {
            config.grace_period_secs = secs;
        }
        if let Some(ref level) = self.log_level {
            config.logging.level.clone_from(level);
        }
        if self.no_browser {
            config.browser.open_on_start = false;
        }
    }

    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            interactive: !self.no_input,
            open_browser: !self.no_browser,
            skip_startup: self.skip_startup,
        }
    }
}
