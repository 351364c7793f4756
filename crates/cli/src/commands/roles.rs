//! warden roles command

use clap::Args;
use console::style;
use std::path::Path;

#[derive(Debug, Args)]
pub struct RolesCommand {}

impl RolesCommand {
    pub fn run(&self, config_dir: &Path) -> anyhow::Result<()> {
        let roles = shared::load_roles(config_dir)?;

        let mut names: Vec<&String> = roles.keys().collect();
        names.sort();

        for name in names {
            let cfg = &roles[name];
            println!("{}", style(name).bold());
            println!("  allowed: {}", cfg.allowed_actions.join(", "));
            if !cfg.denied_actions.is_empty() {
                println!("  denied:  {}", cfg.denied_actions.join(", "));
            }
            println!("  rate limit: {}/min", cfg.rate_limit());
            if !cfg.parameter_constraints.is_empty() {
                let mut actions: Vec<&String> = cfg.parameter_constraints.keys().collect();
                actions.sort();
                for action in actions {
                    println!("  constraints[{action}]: {:?}", cfg.parameter_constraints[action]);
                }
            }
        }
        Ok(())
    }
}
