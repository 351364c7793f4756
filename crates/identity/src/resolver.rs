//! IdentityResolver - external user id to role mapping
//!
//! Loading priority:
//!   1. `WARDEN_ROLE_MAP` env var (JSON object) - highest priority, keeps
//!      the mapping out of files when it carries sensitive ids
//!   2. `identity_map.yaml` in the config directory - commit-safe config
//!   3. Empty map - every caller gets the default role

use async_trait::async_trait;
use serde::Deserialize;
use shared::Identity;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Env var holding a JSON user-to-role map, e.g. `{"U123": "admin"}`
pub const ROLE_MAP_ENV: &str = "WARDEN_ROLE_MAP";

/// File name looked up inside the config directory
pub const IDENTITY_MAP_FILE: &str = "identity_map.yaml";

/// Reserved key in the identity map overriding the default role
const DEFAULT_KEY: &str = "default";

/// Failure from an identity backend.
///
/// The built-in [`IdentityResolver`] never produces one, but providers
/// backed by an external store can, and the router must treat that as an
/// infrastructure fault rather than an unknown user.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity backend failure: {0}")]
    Backend(String),
}

/// Seam between the router and whatever resolves identities.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, external_user_id: &str) -> Result<Identity, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct IdentityMapFile {
    #[serde(default)]
    identity_map: HashMap<String, String>,
}

/// Resolves external user ids to identities with roles.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    role_map: HashMap<String, String>,
    default_role: String,
}

impl IdentityResolver {
    /// Role assigned when nothing else matches
    pub const DEFAULT_ROLE: &'static str = "readonly";

    pub fn new(role_map: HashMap<String, String>, default_role: impl Into<String>) -> Self {
        Self {
            role_map,
            default_role: default_role.into(),
        }
    }

    /// Resolve a user id to an identity. Infallible: unknown and empty
    /// ids get the default role.
    pub fn resolve(&self, external_user_id: &str) -> Identity {
        if external_user_id.is_empty() {
            tracing::warn!("resolve called with empty user id, assigning default role");
            return Identity::new("", self.default_role.clone());
        }

        let role = self
            .role_map
            .get(external_user_id)
            .cloned()
            .unwrap_or_else(|| self.default_role.clone());
        tracing::debug!(user = external_user_id, %role, "resolved identity");
        Identity::new(external_user_id, role)
    }

    /// The role unknown callers receive
    pub fn default_role(&self) -> &str {
        &self.default_role
    }

    /// Number of explicit user-to-role entries
    pub fn entry_count(&self) -> usize {
        self.role_map.len()
    }

    /// Build a resolver from the environment and the config directory.
    ///
    /// Tries `WARDEN_ROLE_MAP`, then `<dir>/identity_map.yaml`, then an
    /// empty map. A malformed source is logged and skipped, never fatal:
    /// losing the map only under-privileges callers.
    pub fn from_sources(config_dir: &Path) -> Self {
        if let Ok(raw) = std::env::var(ROLE_MAP_ENV) {
            if !raw.trim().is_empty() {
                match Self::from_env_json(&raw) {
                    Ok(resolver) => {
                        tracing::info!(
                            entries = resolver.entry_count(),
                            "identity map loaded from {ROLE_MAP_ENV}"
                        );
                        return resolver;
                    }
                    Err(err) => {
                        tracing::error!(%err, "{ROLE_MAP_ENV} is not valid JSON");
                    }
                }
            }
        }

        let path = config_dir.join(IDENTITY_MAP_FILE);
        if path.exists() {
            match Self::from_yaml_file(&path) {
                Ok(resolver) => {
                    tracing::info!(
                        entries = resolver.entry_count(),
                        default_role = resolver.default_role(),
                        path = %path.display(),
                        "identity map loaded"
                    );
                    return resolver;
                }
                Err(err) => {
                    tracing::error!(%err, path = %path.display(), "failed to parse identity map");
                }
            }
        }

        tracing::warn!(
            default_role = Self::DEFAULT_ROLE,
            "no identity map found, all callers get the default role"
        );
        Self::new(HashMap::new(), Self::DEFAULT_ROLE)
    }

    /// Parse the env-var form: a JSON object of user id to role name.
    pub fn from_env_json(raw: &str) -> Result<Self, serde_json::Error> {
        let map: HashMap<String, String> = serde_json::from_str(raw)?;
        Ok(Self::new(map, Self::DEFAULT_ROLE))
    }

    /// Parse the YAML file form. The reserved `default` key inside
    /// `identity_map` overrides the default role.
    pub fn from_yaml_file(path: &Path) -> shared::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let file: IdentityMapFile = serde_yaml::from_str(&raw)?;
        let mut map = file.identity_map;
        let default_role = map
            .remove(DEFAULT_KEY)
            .unwrap_or_else(|| Self::DEFAULT_ROLE.to_string());
        Ok(Self::new(map, default_role))
    }
}

#[async_trait]
impl IdentityProvider for IdentityResolver {
    async fn resolve(&self, external_user_id: &str) -> Result<Identity, IdentityError> {
        Ok(IdentityResolver::resolve(self, external_user_id))
    }
}
