//! Command-line entry points.

pub mod check;
pub mod command;
pub mod output;
pub mod refresh;
pub mod run;
pub mod search;

use command::{Cli, Commands};
use output::OutputConfig;

use crate::error::Result;

/// Dispatch a parsed command line to its handler.
///
/// # Errors
///
/// Returns whatever the selected handler returns.
pub async fn dispatch(cli: Cli) -> Result<()> {
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    match cli.command {
        Commands::Run => run::execute(&cli.config).await,
        Commands::Search(args) => search::execute(&cli.config, &args).await,
        Commands::Refresh => refresh::execute(&cli.config).await,
        Commands::Check => check::execute(&cli.config).await,
    }
}
