// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "endgame-battery")]
#[command(author, version, about = "Battery status for Endgame Gear wireless mice")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/endgame-battery/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connect to the best available device and print one reading
    #[command(visible_aliases = ["bat", "b"])]
    Battery {
        /// Print only the battery percentage (for scripts)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Keep polling, switching to better devices as they appear
    #[command(visible_alias = "w")]
    Watch {
        /// Seconds between readings (overrides the config file)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Export status files into this directory (overrides the config file)
        #[arg(long, value_name = "DIR")]
        status_dir: Option<PathBuf>,
    },

    /// Show supported devices in priority order
    #[command(visible_alias = "d")]
    Devices,

    /// List HID interfaces present for supported devices
    #[command(visible_alias = "ls")]
    List,
}
