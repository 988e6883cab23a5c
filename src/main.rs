//! devsup CLI entry point.

use clap::Parser;
use console::style;

use devsup::cli::Cli;
use devsup::infrastructure::config::ConfigLoader;
use devsup::infrastructure::logging::LoggerImpl;
use devsup::Launcher;

/// Exit status for configuration problems.
const CONFIG_EXIT_CODE: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match ConfigLoader::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => fail(&err, CONFIG_EXIT_CODE),
    };
    cli.apply_overrides(&mut config);
    if let Err(err) = ConfigLoader::validate(&config) {
        fail(&anyhow::Error::new(err), CONFIG_EXIT_CODE);
    }

    let logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => fail(&err, 1),
    };

    let launcher = Launcher::new(config, cli.launch_options());
    let code = match launcher.run().await {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "Session failed");
            1
        }
    };

    // The stdin reader thread may still be blocked; exiting ends it.
    drop(logger);
    std::process::exit(code);
}

fn fail(err: &anyhow::Error, code: i32) -> ! {
    eprintln!("{} {err:#}", style("error:").red().bold());
    std::process::exit(code);
}
