//! Driftnet CLI - Command-line interface
//!
//! Provides command-line access to Driftnet functionality.

mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "driftnet")]
#[command(about = "A federated catalog search and stream relay server")]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("driftnet=info")),
        )
        .init();

    let cli = Cli::parse();
    commands::handle_command(cli.command).await
}
