//! Role configuration types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Wildcard entry in `allowed_actions` granting every action
pub const WILDCARD_ACTION: &str = "*";

/// Requests per window when a role does not configure `rate_limit`
pub const DEFAULT_RATE_LIMIT: usize = 10;

/// Per-action parameter constraints for a role.
///
/// Every field is optional; an absent field means the role places no
/// constraint on that dimension. `max_timeout_seconds` is a soft
/// constraint (values above it are clamped), the rest are hard
/// constraints (a violation denies the whole request).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    /// Upper bound for the `timeout_seconds` parameter
    pub max_timeout_seconds: Option<u64>,

    /// Whitelist for the `language` parameter
    pub allowed_languages: Option<Vec<String>>,

    /// Maximum UTF-8 byte length of the `content` parameter
    pub max_size_bytes: Option<usize>,

    /// Substrings that must not appear in the `path` parameter
    pub blocked_paths: Option<Vec<String>>,

    /// Substrings that must not appear in the `url` parameter
    pub blocked_patterns: Option<Vec<String>>,
}

impl ConstraintSet {
    /// True when no dimension is constrained
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Permission profile for a single role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleConfig {
    /// Actions this role may request; may contain the `"*"` wildcard
    #[serde(default)]
    pub allowed_actions: Vec<String>,

    /// Actions explicitly denied, overriding any allow entry
    #[serde(default)]
    pub denied_actions: Vec<String>,

    /// Per-action parameter constraints
    #[serde(default)]
    pub parameter_constraints: HashMap<String, ConstraintSet>,

    /// Requests per sliding window; `DEFAULT_RATE_LIMIT` when absent
    pub rate_limit: Option<usize>,
}

impl RoleConfig {
    /// Check whether an action is covered by the allow list (wildcard included).
    ///
    /// Does not consult `denied_actions` — denial precedence is the
    /// policy engine's job.
    pub fn allows(&self, action: &str) -> bool {
        self.allowed_actions
            .iter()
            .any(|a| a == WILDCARD_ACTION || a == action)
    }

    /// Check whether an action is explicitly denied
    pub fn denies(&self, action: &str) -> bool {
        self.denied_actions.iter().any(|a| a == action)
    }

    /// Constraints configured for an action, if any
    pub fn constraints_for(&self, action: &str) -> Option<&ConstraintSet> {
        self.parameter_constraints.get(action)
    }

    /// Effective rate limit for this role
    pub fn rate_limit(&self) -> usize {
        self.rate_limit.unwrap_or(DEFAULT_RATE_LIMIT)
    }
}

/// All configured roles, keyed by role name
pub type RoleTable = HashMap<String, RoleConfig>;

#[cfg(test)]
mod tests {
    use super::*;

    fn role(allowed: &[&str], denied: &[&str]) -> RoleConfig {
        RoleConfig {
            allowed_actions: allowed.iter().map(|s| s.to_string()).collect(),
            denied_actions: denied.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_allows_listed_action() {
        let r = role(&["search_web", "get_status"], &[]);
        assert!(r.allows("search_web"));
        assert!(!r.allows("run_code"));
    }

    #[test]
    fn test_wildcard_allows_everything() {
        let r = role(&["*"], &[]);
        assert!(r.allows("anything_at_all"));
    }

    #[test]
    fn test_denies_is_independent_of_allows() {
        let r = role(&["*"], &["run_code"]);
        assert!(r.allows("run_code"));
        assert!(r.denies("run_code"));
    }

    #[test]
    fn test_rate_limit_default() {
        let r = role(&[], &[]);
        assert_eq!(r.rate_limit(), DEFAULT_RATE_LIMIT);

        let mut r = role(&[], &[]);
        r.rate_limit = Some(5);
        assert_eq!(r.rate_limit(), 5);
    }

    #[test]
    fn test_constraint_set_empty() {
        assert!(ConstraintSet::default().is_empty());

        let c = ConstraintSet {
            max_timeout_seconds: Some(30),
            ..Default::default()
        };
        assert!(!c.is_empty());
    }

    #[test]
    fn test_role_config_yaml_defaults() {
        let yaml = r#"
allowed_actions: ["search_web"]
rate_limit: 7
"#;
        let r: RoleConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(r.allowed_actions, vec!["search_web"]);
        assert!(r.denied_actions.is_empty());
        assert!(r.parameter_constraints.is_empty());
        assert_eq!(r.rate_limit(), 7);
    }
}
