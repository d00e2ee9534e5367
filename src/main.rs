use clap::Parser;
use llm_relay_gateway::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Providers => cli::providers::run().await,
        Command::Extract(args) => cli::extract::run(args).await,
    }
}
