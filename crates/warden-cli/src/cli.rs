//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::commands::Commands;

/// Authenticated session manager.
#[derive(Parser, Debug)]
#[command(name = "warden")]
#[command(author, version = env!("WARDEN_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Identity provider / API base URL
    #[arg(
        long,
        env = "WARDEN_API_URL",
        default_value = "https://dummyjson.com",
        global = true
    )]
    pub api_url: String,

    /// Directory holding the stored credentials
    #[arg(long, env = "WARDEN_STORE_DIR", global = true)]
    pub store_dir: Option<PathBuf>,
}
