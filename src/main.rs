//! Endgame Gear battery reader CLI
//!
//! Finds the highest-priority Endgame Gear mouse or dongle and reports its
//! battery level, once or continuously.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use endgame_battery::Config;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.unwrap_or_else(Config::default_path);
    debug!("Loading config from {:?}", config_path);
    let config = Config::load(&config_path)?;

    match cli.command {
        None => commands::query::battery(&config, false),
        Some(Commands::Battery { quiet }) => commands::query::battery(&config, quiet),
        Some(Commands::Watch {
            interval,
            status_dir,
        }) => commands::watch::watch(&config, interval, status_dir),
        Some(Commands::Devices) => commands::query::devices(&config),
        Some(Commands::List) => commands::query::list(&config),
    }
}
