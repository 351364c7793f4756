//! warden health command

use clap::Args;
use console::style;
use gateway::{Gateway, GatewayClient};

#[derive(Debug, Args)]
pub struct HealthCommand {}

impl HealthCommand {
    pub async fn run(&self) -> anyhow::Result<()> {
        let client = GatewayClient::from_env();

        if client.health().await {
            println!("{} gateway reachable at {}", style("OK").green().bold(), client.base_url());
            Ok(())
        } else {
            println!(
                "{} gateway unreachable at {}",
                style("FAIL").red().bold(),
                client.base_url()
            );
            std::process::exit(1);
        }
    }
}
