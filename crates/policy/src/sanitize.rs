//! Parameter sanitization
//!
//! A pure transformation: the caller's parameter bag is never mutated,
//! sanitization returns a fresh map. Soft constraints clamp, hard
//! constraints abort the whole decision with a user-facing reason.

use serde_json::{Map, Value};
use shared::ConstraintSet;
use thiserror::Error;

/// A violated hard constraint. The display strings are shown to end
/// users verbatim, so they name what was rejected and why.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConstraintViolation {
    #[error("Language '{language}' is not permitted. Allowed: {allowed}.")]
    LanguageNotAllowed { language: String, allowed: String },

    #[error("Content exceeds maximum size of {max_bytes} bytes for action '{action}'.")]
    ContentTooLarge { max_bytes: usize, action: String },

    #[error("Access to path '{path}' is not permitted for your role.")]
    BlockedPath { path: String },

    #[error("URL '{url}' contains a blocked pattern '{pattern}'.")]
    BlockedUrl { url: String, pattern: String },
}

/// Parameter fields sanitization cares about. Anything else passes
/// through untouched.
const TIMEOUT_FIELD: &str = "timeout_seconds";
const LANGUAGE_FIELD: &str = "language";
const CONTENT_FIELD: &str = "content";
const PATH_FIELD: &str = "path";
const URL_FIELD: &str = "url";

/// Apply a constraint set to a parameter bag, returning the sanitized copy.
///
/// `timeout_seconds` above the configured maximum is clamped (soft); a
/// `language` outside the whitelist, oversized `content`, or a blocked
/// substring in `path`/`url` aborts with the specific violation (hard).
pub fn sanitize(
    constraints: &ConstraintSet,
    action: &str,
    params: &Map<String, Value>,
) -> Result<Map<String, Value>, ConstraintViolation> {
    let mut sanitized = params.clone();

    if constraints.is_empty() {
        return Ok(sanitized);
    }

    if let Some(max) = constraints.max_timeout_seconds {
        if let Some(requested) = sanitized.get(TIMEOUT_FIELD).and_then(Value::as_f64) {
            if requested > max as f64 {
                tracing::debug!(action, requested, max, "clamping timeout_seconds");
                sanitized.insert(TIMEOUT_FIELD.to_string(), Value::from(max));
            }
        }
    }

    if let Some(allowed) = &constraints.allowed_languages {
        if let Some(language) = field_text(&sanitized, LANGUAGE_FIELD) {
            if !language.is_empty() && !allowed.iter().any(|l| l == &language) {
                return Err(ConstraintViolation::LanguageNotAllowed {
                    language,
                    allowed: allowed.join(", "),
                });
            }
        }
    }

    if let Some(max_bytes) = constraints.max_size_bytes {
        if let Some(Value::String(content)) = sanitized.get(CONTENT_FIELD) {
            if content.len() > max_bytes {
                return Err(ConstraintViolation::ContentTooLarge {
                    max_bytes,
                    action: action.to_string(),
                });
            }
        }
    }

    if let Some(blocked) = &constraints.blocked_paths {
        if let Some(path) = field_text(&sanitized, PATH_FIELD) {
            if blocked.iter().any(|b| path.contains(b.as_str())) {
                return Err(ConstraintViolation::BlockedPath { path });
            }
        }
    }

    if let Some(patterns) = &constraints.blocked_patterns {
        if let Some(url) = field_text(&sanitized, URL_FIELD) {
            if let Some(pattern) = patterns.iter().find(|p| url.contains(p.as_str())) {
                return Err(ConstraintViolation::BlockedUrl {
                    url,
                    pattern: pattern.clone(),
                });
            }
        }
    }

    Ok(sanitized)
}

/// Textual view of a parameter: strings as-is, other JSON values via
/// their JSON rendering, so a non-string `path` still hits the blocklist.
fn field_text(params: &Map<String, Value>, key: &str) -> Option<String> {
    params.get(key).map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    // ============== Soft Constraint Tests ==============

    #[test]
    fn test_timeout_clamped_not_denied() {
        let constraints = ConstraintSet {
            max_timeout_seconds: Some(30),
            ..Default::default()
        };
        let input = params(&[("timeout_seconds", json!(600))]);

        let out = sanitize(&constraints, "run_code", &input).unwrap();
        assert_eq!(out["timeout_seconds"], json!(30));
        // purity: the caller's bag is untouched
        assert_eq!(input["timeout_seconds"], json!(600));
    }

    #[test]
    fn test_timeout_under_limit_untouched() {
        let constraints = ConstraintSet {
            max_timeout_seconds: Some(30),
            ..Default::default()
        };
        let input = params(&[("timeout_seconds", json!(10))]);
        let out = sanitize(&constraints, "run_code", &input).unwrap();
        assert_eq!(out["timeout_seconds"], json!(10));
    }

    // ============== Hard Constraint Tests ==============

    #[test]
    fn test_language_whitelist_denies() {
        let constraints = ConstraintSet {
            allowed_languages: Some(vec!["python".into(), "javascript".into()]),
            ..Default::default()
        };
        let input = params(&[("language", json!("bash"))]);

        let err = sanitize(&constraints, "run_code", &input).unwrap_err();
        assert!(matches!(err, ConstraintViolation::LanguageNotAllowed { .. }));
        assert!(err.to_string().contains("bash"));
        assert!(err.to_string().contains("python"));
    }

    #[test]
    fn test_language_in_whitelist_passes() {
        let constraints = ConstraintSet {
            allowed_languages: Some(vec!["python".into()]),
            ..Default::default()
        };
        let input = params(&[("language", json!("python"))]);
        assert!(sanitize(&constraints, "run_code", &input).is_ok());
    }

    #[test]
    fn test_empty_language_is_ignored() {
        let constraints = ConstraintSet {
            allowed_languages: Some(vec!["python".into()]),
            ..Default::default()
        };
        let input = params(&[("language", json!(""))]);
        assert!(sanitize(&constraints, "run_code", &input).is_ok());
    }

    #[test]
    fn test_content_size_denies() {
        let constraints = ConstraintSet {
            max_size_bytes: Some(8),
            ..Default::default()
        };
        let input = params(&[("content", json!("0123456789"))]);

        let err = sanitize(&constraints, "write_file", &input).unwrap_err();
        assert_eq!(
            err,
            ConstraintViolation::ContentTooLarge {
                max_bytes: 8,
                action: "write_file".to_string()
            }
        );
    }

    #[test]
    fn test_content_size_counts_utf8_bytes() {
        let constraints = ConstraintSet {
            max_size_bytes: Some(5),
            ..Default::default()
        };
        // four chars, twelve bytes
        let input = params(&[("content", json!("日本語字"))]);
        assert!(sanitize(&constraints, "write_file", &input).is_err());
    }

    #[test]
    fn test_blocked_path_substring_denies() {
        let constraints = ConstraintSet {
            blocked_paths: Some(vec!["/etc".into(), ".ssh".into()]),
            ..Default::default()
        };
        let input = params(&[("path", json!("/home/user/.ssh/id_rsa"))]);

        let err = sanitize(&constraints, "read_file", &input).unwrap_err();
        assert!(matches!(err, ConstraintViolation::BlockedPath { .. }));
    }

    #[test]
    fn test_blocked_url_pattern_denies() {
        let constraints = ConstraintSet {
            blocked_patterns: Some(vec!["169.254.".into(), "localhost".into()]),
            ..Default::default()
        };
        let input = params(&[("url", json!("http://169.254.169.254/latest/meta-data"))]);

        let err = sanitize(&constraints, "fetch_url", &input).unwrap_err();
        assert!(err.to_string().contains("169.254."));
    }

    // ============== Pass-Through Tests ==============

    #[test]
    fn test_no_constraints_passes_everything() {
        let input = params(&[
            ("path", json!("/etc/passwd")),
            ("timeout_seconds", json!(9999)),
        ]);
        let out = sanitize(&ConstraintSet::default(), "read_file", &input).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_absent_fields_are_not_violations() {
        let constraints = ConstraintSet {
            max_timeout_seconds: Some(30),
            allowed_languages: Some(vec!["python".into()]),
            max_size_bytes: Some(100),
            blocked_paths: Some(vec!["/etc".into()]),
            blocked_patterns: Some(vec!["localhost".into()]),
        };
        let out = sanitize(&constraints, "get_status", &Map::new()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_non_string_path_still_checked() {
        let constraints = ConstraintSet {
            blocked_paths: Some(vec!["/etc".into()]),
            ..Default::default()
        };
        let input = params(&[("path", json!(["/etc/passwd"]))]);
        assert!(sanitize(&constraints, "read_file", &input).is_err());
    }
}
