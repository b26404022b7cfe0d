//! Safelink CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;

use safelink::cli::{commands, handle_error, Cli, Commands};
use safelink::infrastructure::logging::LoggerImpl;
use safelink::{Config, ConfigLoader};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli.command, cli.config.as_deref(), cli.json).await {
        handle_error(err, cli.json);
    }
}

async fn run(command: Commands, config_path: Option<&std::path::Path>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let _logger = LoggerImpl::init(&config.logging).context("Failed to initialize logging")?;

    match command {
        Commands::Check(args) => commands::check::execute(args, &config, json).await,
        Commands::Serve(args) => commands::serve::execute(args, &config).await,
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}
