//! PolicyEngine - per-role action authorization

use crate::sanitize::sanitize;
use serde_json::{Map, Value};
use shared::{Identity, RoleTable};
use std::sync::Arc;

/// Outcome of a policy evaluation. Immutable once produced.
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub allowed: bool,
    /// Human-readable justification, user-facing on denial
    pub reason: String,
    /// Parameter bag after constraint application, safe to forward
    pub sanitized_params: Map<String, Value>,
    pub role: String,
}

impl PolicyDecision {
    fn deny(role: &str, reason: String) -> Self {
        Self {
            allowed: false,
            reason,
            sanitized_params: Map::new(),
            role: role.to_string(),
        }
    }
}

/// Decides whether an identity may perform an action with given params.
///
/// Evaluation order is fixed: unknown role, explicit denial, allow list,
/// parameter constraints. Explicit denial precedes the allow list, so a
/// `denied_actions` entry wins even against a `"*"` wildcard.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    roles: Arc<RoleTable>,
}

impl PolicyEngine {
    pub fn new(roles: Arc<RoleTable>) -> Self {
        Self { roles }
    }

    /// Evaluate an action request. Never panics, never errors: every
    /// outcome is a `PolicyDecision` with a reason.
    pub fn evaluate(
        &self,
        identity: &Identity,
        action: &str,
        params: &Map<String, Value>,
    ) -> PolicyDecision {
        let role_name = identity.role.as_str();
        let user = identity.external_user_id.as_str();

        // Fail closed: a role missing from the table denies everything.
        let Some(role_cfg) = self.roles.get(role_name) else {
            tracing::warn!(user, role = role_name, "unknown role, denying");
            return PolicyDecision::deny(
                role_name,
                format!("Unknown role '{role_name}'. Contact an administrator."),
            );
        };

        if role_cfg.denies(action) {
            tracing::info!(user, role = role_name, action, "denied: explicit deny");
            return PolicyDecision::deny(
                role_name,
                format!("Action '{action}' is explicitly denied for role '{role_name}'."),
            );
        }

        if !role_cfg.allows(action) {
            tracing::info!(user, role = role_name, action, "denied: not in allow list");
            let listed = if role_cfg.allowed_actions.is_empty() {
                "none".to_string()
            } else {
                role_cfg.allowed_actions.join(", ")
            };
            return PolicyDecision::deny(
                role_name,
                format!(
                    "Action '{action}' is not permitted for role '{role_name}'. \
                     Allowed actions: {listed}."
                ),
            );
        }

        let constraints = role_cfg.constraints_for(action).cloned().unwrap_or_default();
        let sanitized = match sanitize(&constraints, action, params) {
            Ok(sanitized) => sanitized,
            Err(violation) => {
                tracing::info!(user, role = role_name, action, %violation, "denied: constraint");
                return PolicyDecision::deny(role_name, violation.to_string());
            }
        };

        tracing::info!(user, role = role_name, action, "allowed");
        PolicyDecision {
            allowed: true,
            reason: format!("Action '{action}' permitted for role '{role_name}'."),
            sanitized_params: sanitized,
            role: role_name.to_string(),
        }
    }
}
