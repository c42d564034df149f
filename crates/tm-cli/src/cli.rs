//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use tm_core::ConnectionOverrides;

/// Tidemark - roll out SQL migration scripts and track them in a ledger table
#[derive(Parser, Debug)]
#[command(name = "tm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Connection overrides
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Connection values that take priority over the config file
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Database server host
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Database server port
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Database name
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Database user
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Schema holding the MIGRATIONS ledger table
    #[arg(long, global = true)]
    pub schema: Option<String>,

    /// DuckDB file path (duckdb only)
    #[arg(long, global = true)]
    pub db_path: Option<String>,
}

impl ConnectionArgs {
    pub fn overrides(&self) -> ConnectionOverrides {
        ConnectionOverrides {
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            username: self.username.clone(),
            schema: self.schema.clone(),
            path: self.db_path.clone(),
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the schema and MIGRATIONS ledger table
    Init(InitArgs),

    /// Apply pending migration scripts
    Rollout(RolloutArgs),

    /// List migrations recorded in the ledger
    Applied(AppliedArgs),

    /// Show applied/pending state of every script
    Status(StatusArgs),
}

/// Arguments for the init command
#[derive(Args, Debug, Default)]
pub struct InitArgs {
    /// Also create the rollout directory if it does not exist
    #[arg(long)]
    pub scaffold: bool,
}

/// Arguments for the rollout command
#[derive(Args, Debug, Default)]
pub struct RolloutArgs {
    /// Commit every migration in its own transaction
    #[arg(long, conflicts_with = "combined")]
    pub single: bool,

    /// Commit all pending migrations in one transaction
    #[arg(long)]
    pub combined: bool,

    /// Replace ${{NAME}} placeholders in scripts before execution
    #[arg(long)]
    pub replace_variables: bool,

    /// Override the rollout directory
    #[arg(short, long)]
    pub directory: Option<String>,
}

/// Arguments for the applied command
#[derive(Args, Debug)]
pub struct AppliedArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Override the rollout directory
    #[arg(short, long)]
    pub directory: Option<String>,
}

/// Output formats for ledger listings
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
