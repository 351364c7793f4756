//! warden dispatch command - one request through the full pipeline

use clap::Args;
use gateway::GatewayClient;
use identity::IdentityResolver;
use router::{Router, RouterConfig};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct DispatchCommand {
    /// External user id to dispatch as
    #[arg(short, long)]
    user: String,

    /// Action to request
    #[arg(short, long)]
    action: String,

    /// Parameters as a JSON object
    #[arg(short, long)]
    params: Option<String>,

    /// Gateway session to post into
    #[arg(short, long, default_value = "main")]
    session: String,
}

impl DispatchCommand {
    pub async fn run(&self, config_dir: &Path) -> anyhow::Result<()> {
        let roles = Arc::new(shared::load_roles(config_dir)?);
        let resolver = Arc::new(IdentityResolver::from_sources(config_dir));
        let gateway = Arc::new(GatewayClient::from_env());

        let config = RouterConfig {
            session: self.session.clone(),
            ..Default::default()
        };
        let router = Router::new(resolver, gateway, roles, config);

        let params = super::parse_params(self.params.as_deref())?;
        let result = router.dispatch(&self.user, &self.action, &params).await;

        println!("{}", serde_json::to_string_pretty(&result)?);
        if !result.allowed {
            std::process::exit(1);
        }
        Ok(())
    }
}
