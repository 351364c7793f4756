//! warden CLI - command-line interface
//!
//! Usage:
//!   warden roles                            - list configured roles
//!   warden check --role R --action A        - offline policy evaluation
//!   warden dispatch --user U --action A     - run the full pipeline
//!   warden health                           - probe the downstream gateway
//!
//! Config files (`roles.yaml`, `identity_map.yaml`) are looked up in the
//! directory given by `--config` (default `config`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{CheckCommand, DispatchCommand, HealthCommand, RolesCommand};

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "warden - authorization relay for an agent gateway")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config directory holding roles.yaml and identity_map.yaml
    #[arg(short, long, global = true, default_value = "config")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured roles
    Roles(RolesCommand),
    /// Evaluate a policy decision without dispatching
    Check(CheckCommand),
    /// Dispatch an action through the full pipeline
    Dispatch(DispatchCommand),
    /// Probe the downstream gateway
    Health(HealthCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Roles(cmd) => cmd.run(&cli.config),
        Commands::Check(cmd) => cmd.run(&cli.config),
        Commands::Dispatch(cmd) => cmd.run(&cli.config).await,
        Commands::Health(cmd) => cmd.run().await,
    }
}
