use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::Commands;

#[derive(Parser)]
#[command(name = "kanri", version, about = "Change-management workflow for IT service desks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    cli.command.run().await
}
