//! logocache - URL-keyed image loader
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use logocache::cli::{Cli, Commands};
use logocache::config::{Config, ConfigManager};
use logocache::error::LogoResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> LogoResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);

    match cli.command {
        Commands::Load(args) => logocache::cli::commands::load(args, &config).await,
        Commands::Config(args) => {
            logocache::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// Logs go to stderr so `load --format json` output stays parseable.
/// 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("logocache=warn"),
        1 => EnvFilter::new("logocache=info"),
        _ => EnvFilter::new("logocache=debug"),
    };

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init();
    }
}
