//! Tidemark CLI - roll out SQL migration scripts against a ledger

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod context;
#[cfg(test)]
mod test_project;

use cli::Cli;
use commands::{applied, init, rollout, status};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_target(false)
        .init();

    match &cli.command {
        cli::Commands::Init(args) => init::execute(args, &cli.global).await,
        cli::Commands::Rollout(args) => rollout::execute(args, &cli.global).await,
        cli::Commands::Applied(args) => applied::execute(args, &cli.global).await,
        cli::Commands::Status(args) => status::execute(args, &cli.global).await,
    }
}
