use clap::Parser;
use jobsniper::adapter::inbound::cli::{self, command::Cli, output};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    if let Err(e) = cli::dispatch(args).await {
        tracing::error!(error = %e, fatal = e.is_fatal(), "Exiting");
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
