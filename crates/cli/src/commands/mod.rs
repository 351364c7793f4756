//! warden subcommands

mod check;
mod dispatch;
mod health;
mod roles;

pub use check::CheckCommand;
pub use dispatch::DispatchCommand;
pub use health::HealthCommand;
pub use roles::RolesCommand;

use anyhow::Context;
use serde_json::{Map, Value};

/// Parse a `--params` JSON object argument into a parameter bag.
pub(crate) fn parse_params(raw: Option<&str>) -> anyhow::Result<Map<String, Value>> {
    match raw {
        None => Ok(Map::new()),
        Some(raw) => {
            let value: Value =
                serde_json::from_str(raw).context("--params is not valid JSON")?;
            match value {
                Value::Object(map) => Ok(map),
                _ => anyhow::bail!("--params must be a JSON object"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_params_object() {
        let map = parse_params(Some(r#"{"query": "rust"}"#)).unwrap();
        assert_eq!(map["query"], "rust");
    }

    #[test]
    fn test_parse_params_absent_is_empty() {
        assert!(parse_params(None).unwrap().is_empty());
    }

    #[test]
    fn test_parse_params_rejects_non_object() {
        assert!(parse_params(Some("[1, 2]")).is_err());
        assert!(parse_params(Some("nonsense")).is_err());
    }
}
