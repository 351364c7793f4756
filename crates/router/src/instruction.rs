//! Action-to-instruction translation
//!
//! A closed set of variants, one per known action, so a missing template
//! field is a construction-time concern instead of a silent formatting
//! fallback. Unknown actions and incomplete parameter bags become
//! `Generic`, which renders the action name and its key/value pairs.

use serde_json::{Map, Value};

/// A natural-language instruction for the downstream agent.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    SearchWeb { query: String },
    ReadFile { path: String },
    WriteFile { path: String, content: String },
    RunCode { language: String, code: String },
    RunAnalysis { description: String },
    GetStatus,
    SendMessage { target: String, content: String },
    FetchUrl { url: String },
    Generic { action: String, params: Map<String, Value> },
}

impl Instruction {
    /// Build an instruction from an action name and its sanitized
    /// params. Falls back to `Generic` when the action is unknown or a
    /// required field is absent or not a string.
    pub fn from_request(action: &str, params: &Map<String, Value>) -> Self {
        let text = |key: &str| params.get(key).and_then(Value::as_str).map(str::to_string);

        let known = match action {
            "search_web" => text("query").map(|query| Instruction::SearchWeb { query }),
            "read_file" => text("path").map(|path| Instruction::ReadFile { path }),
            "write_file" => match (text("path"), text("content")) {
                (Some(path), Some(content)) => Some(Instruction::WriteFile { path, content }),
                _ => None,
            },
            "run_code" => match (text("language"), text("code")) {
                (Some(language), Some(code)) => Some(Instruction::RunCode { language, code }),
                _ => None,
            },
            "run_analysis" => {
                text("description").map(|description| Instruction::RunAnalysis { description })
            }
            "get_status" => Some(Instruction::GetStatus),
            "send_message" => match (text("target"), text("content")) {
                (Some(target), Some(content)) => Some(Instruction::SendMessage { target, content }),
                _ => None,
            },
            "fetch_url" => text("url").map(|url| Instruction::FetchUrl { url }),
            _ => None,
        };

        known.unwrap_or_else(|| Instruction::Generic {
            action: action.to_string(),
            params: params.clone(),
        })
    }

    /// Render the instruction text sent to the gateway.
    pub fn render(&self) -> String {
        match self {
            Instruction::SearchWeb { query } => format!("Search the web for: {query}"),
            Instruction::ReadFile { path } => format!("Read the file at path: {path}"),
            Instruction::WriteFile { path, content } => {
                format!("Write to file at path: {path}\n\nContent:\n{content}")
            }
            Instruction::RunCode { language, code } => {
                format!("Run the following {language} code:\n```{language}\n{code}\n```")
            }
            Instruction::RunAnalysis { description } => format!("Run analysis: {description}"),
            Instruction::GetStatus => {
                "What is the current status of the agent and workspace?".to_string()
            }
            Instruction::SendMessage { target, content } => {
                format!("Send this message to {target}: {content}")
            }
            Instruction::FetchUrl { url } => {
                format!("Fetch and summarize the content at this URL: {url}")
            }
            Instruction::Generic { action, params } => {
                if params.is_empty() {
                    format!("Action: {action}")
                } else {
                    let rendered: Vec<String> = params
                        .iter()
                        .map(|(k, v)| match v {
                            Value::String(s) => format!("  {k}: {s}"),
                            other => format!("  {k}: {other}"),
                        })
                        .collect();
                    format!("Action: {action}\nParameters:\n{}", rendered.join("\n"))
                }
            }
        }
    }
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

    #[test]
    fn test_known_action_renders_template() {
        let instr = Instruction::from_request("search_web", &params(&[("query", json!("rust"))]));
        assert_eq!(instr, Instruction::SearchWeb { query: "rust".into() });
        assert_eq!(instr.render(), "Search the web for: rust");
    }

    #[test]
    fn test_run_code_renders_fenced_block() {
        let instr = Instruction::from_request(
            "run_code",
            &params(&[("language", json!("python")), ("code", json!("print(1)"))]),
        );
        let text = instr.render();
        assert!(text.contains("```python"));
        assert!(text.contains("print(1)"));
    }

    #[test]
    fn test_get_status_needs_no_params() {
        let instr = Instruction::from_request("get_status", &Map::new());
        assert_eq!(instr, Instruction::GetStatus);
        assert!(instr.render().contains("status"));
    }

    #[test]
    fn test_missing_field_falls_back_to_generic() {
        // write_file without content
        let instr = Instruction::from_request("write_file", &params(&[("path", json!("/tmp/x"))]));
        assert!(matches!(instr, Instruction::Generic { .. }));
        let text = instr.render();
        assert!(text.contains("Action: write_file"));
        assert!(text.contains("path: /tmp/x"));
    }

    #[test]
    fn test_non_string_field_falls_back_to_generic() {
        let instr = Instruction::from_request("search_web", &params(&[("query", json!(7))]));
        assert!(matches!(instr, Instruction::Generic { .. }));
    }

    #[test]
    fn test_unknown_action_renders_params() {
        let instr = Instruction::from_request(
            "summon_demon",
            &params(&[("name", json!("zuul")), ("count", json!(2))]),
        );
        let text = instr.render();
        assert!(text.contains("Action: summon_demon"));
        assert!(text.contains("  name: zuul"));
        assert!(text.contains("  count: 2"));
    }

    #[test]
    fn test_unknown_action_without_params() {
        let instr = Instruction::from_request("mystery", &Map::new());
        assert_eq!(instr.render(), "Action: mystery");
    }
}
