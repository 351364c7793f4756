//! warden check command - offline policy evaluation

use clap::Args;
use console::style;
use policy::PolicyEngine;
use shared::Identity;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Role to evaluate as
    #[arg(short, long)]
    role: String,

    /// Action to request
    #[arg(short, long)]
    action: String,

    /// Parameters as a JSON object
    #[arg(short, long)]
    params: Option<String>,
}

impl CheckCommand {
    pub fn run(&self, config_dir: &Path) -> anyhow::Result<()> {
        let roles = Arc::new(shared::load_roles(config_dir)?);
        let engine = PolicyEngine::new(roles);
        let params = super::parse_params(self.params.as_deref())?;

        let identity = Identity::new("cli", self.role.clone());
        let decision = engine.evaluate(&identity, &self.action, &params);

        if decision.allowed {
            println!("{} {}", style("ALLOWED").green().bold(), decision.reason);
            if !decision.sanitized_params.is_empty() {
                println!(
                    "sanitized params: {}",
                    serde_json::to_string_pretty(&decision.sanitized_params)?
                );
            }
        } else {
            println!("{} {}", style("DENIED").red().bold(), decision.reason);
        }
        Ok(())
    }
}
