mod commands;
mod components;
mod config;
mod error;
mod shutdown;
mod startup;
mod utils;

use clap::Parser;
use commands::Cli;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    startup::init_logging()?;

    // Load configuration
    let config = startup::load_config().await?;

    // Run the selected command
    commands::dispatch(cli, config).await
}
