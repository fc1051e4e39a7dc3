//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Marketplace job poller with deduplication, scoring and push notifications
#[derive(Parser, Debug)]
#[command(name = "jobsniper")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the configured searches until interrupted
    Run,

    /// Run a single search and print the results
    Search(SearchArgs),

    /// Force an OAuth2 token refresh and persist the new tokens
    Refresh,

    /// Validate configuration and credentials, then probe the API
    Check,
}

/// Arguments for the `search` subcommand.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Title expression to search for
    pub query: String,

    /// Maximum number of postings to fetch
    #[arg(short, long, default_value_t = 10)]
    pub limit: u32,

    /// Minimum hourly rate in USD
    #[arg(long, default_value_t = 0)]
    pub hourly_min: u32,

    /// Minimum fixed budget in USD
    #[arg(long, default_value_t = 0)]
    pub budget_min: u32,
}
