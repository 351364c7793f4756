//! Resolved caller identity

use serde::{Deserialize, Serialize};

/// Resolved identity for an external caller.
///
/// Built fresh for every request and never persisted. Identity resolution
/// is fail-safe: a caller the system does not recognize still gets an
/// `Identity`, just with the default (least-privileged) role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Opaque user identifier from the upstream chat surface
    pub external_user_id: String,

    /// Role name assigned to this user (e.g. "admin", "operator", "readonly")
    pub role: String,

    /// Optional human-readable name, for logs and audit entries
    #[serde(default)]
    pub display_name: String,
}

impl Identity {
    /// Create an identity with no display name
    pub fn new(external_user_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            external_user_id: external_user_id.into(),
            role: role.into(),
            display_name: String::new(),
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Identity(user={:?}, role={:?})", self.external_user_id, self.role)
    }
}
