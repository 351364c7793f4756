//! Role table loading
//!
//! Roles live in a `roles.yaml` file with a single `roles:` top-level key:
//!
//! ```yaml
//! roles:
//!   operator:
//!     allowed_actions: ["search_web", "get_status"]
//!     rate_limit: 5
//! ```
//!
//! The table is loaded once at startup and shared read-only for the
//! process lifetime; a missing or empty table is a configuration error,
//! never an implicit "allow everything".

use crate::error::{Result, WardenError};
use crate::role::RoleTable;
use serde::Deserialize;
use std::path::Path;

/// File name looked up inside the config directory
pub const ROLES_FILE: &str = "roles.yaml";

#[derive(Debug, Deserialize)]
struct RolesFile {
    #[serde(default)]
    roles: RoleTable,
}

/// Parse a role table from YAML text.
pub fn parse_roles(yaml: &str) -> Result<RoleTable> {
    let file: RolesFile = serde_yaml::from_str(yaml)?;
    if file.roles.is_empty() {
        return Err(WardenError::Config("no roles defined".to_string()));
    }
    Ok(file.roles)
}

/// Load the role table from `<dir>/roles.yaml`.
pub fn load_roles(dir: &Path) -> Result<RoleTable> {
    let path = dir.join(ROLES_FILE);
    if !path.exists() {
        return Err(WardenError::Config(format!(
            "roles config not found: {}",
            path.display()
        )));
    }
    let raw = std::fs::read_to_string(&path)?;
    let roles = parse_roles(&raw)?;
    tracing::info!(count = roles.len(), path = %path.display(), "loaded role table");
    Ok(roles)
}
