mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use p4_config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        cli::Commands::Search(cmd) => commands::search::handle(cmd, &config).await,
        cli::Commands::Picker(cmd) => commands::picker::handle(cmd, &config).await,
    }
}
