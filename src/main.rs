use anyhow::Result;
use clap::Parser;

use llama_relay::{cli::Cli, runtime::Orchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration and dispatch the subcommand, serving by default
    let orchestrator = Orchestrator::new(cli)?;
    orchestrator.run().await
}
