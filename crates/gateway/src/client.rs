//! GatewayClient - message endpoint and health probe
//!
//! Environment variables:
//!   WARDEN_GATEWAY_URL    gateway base URL (default http://localhost:3000)
//!   WARDEN_GATEWAY_TOKEN  bearer token if the gateway requires auth

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const GATEWAY_URL_ENV: &str = "WARDEN_GATEWAY_URL";
const GATEWAY_TOKEN_ENV: &str = "WARDEN_GATEWAY_TOKEN";
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
const BODY_SNIPPET_LEN: usize = 200;

/// Gateway call failure. The three classes the orchestrator cares about
/// stay distinguishable: unreachable, timed out, error status.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("cannot reach gateway at {url}: {detail}")]
    Unreachable { url: String, detail: String },

    #[error("gateway timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("gateway returned an invalid response body: {0}")]
    InvalidResponse(String),
}

/// Seam between the router and the gateway transport.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Send one user-turn message and return the agent's reply text
    async fn send_message(
        &self,
        message: &str,
        session: &str,
        timeout: Duration,
    ) -> Result<String, GatewayError>;

    /// Reachability probe; failures come back as `false`, never an error
    async fn health(&self) -> bool;
}

/// HTTP client for the downstream agent gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token: token.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Build a client from `WARDEN_GATEWAY_URL` / `WARDEN_GATEWAY_TOKEN`.
    pub fn from_env() -> Self {
        let url =
            std::env::var(GATEWAY_URL_ENV).unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string());
        let token = std::env::var(GATEWAY_TOKEN_ENV).unwrap_or_default();
        tracing::info!(
            gateway = %url,
            auth = if token.is_empty() { "no" } else { "yes" },
            "gateway client configured"
        );
        Self::new(url, token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn classify(&self, err: reqwest::Error, timeout: Duration) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                timeout_secs: timeout.as_secs(),
            }
        } else {
            GatewayError::Unreachable {
                url: self.base_url.clone(),
                detail: err.to_string(),
            }
        }
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.token.is_empty() {
            req
        } else {
            req.bearer_auth(&self.token)
        }
    }
}

/// Pick the reply text out of a gateway response body. The gateway
/// answers with `reply`, `text`, or `message`; first present field wins,
/// otherwise the whole body is stringified.
fn extract_reply(body: &Value) -> String {
    ["reply", "text", "message"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(|s| s.to_string())
        .unwrap_or_else(|| body.to_string())
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_LEN).collect()
}

#[async_trait]
impl Gateway for GatewayClient {
    async fn send_message(
        &self,
        message: &str,
        session: &str,
        timeout: Duration,
    ) -> Result<String, GatewayError> {
        let url = format!("{}/api/sessions/{}/messages", self.base_url, session);
        tracing::debug!(%url, session, "sending gateway message");

        let request = self
            .authorized(self.http.post(&url))
            .json(&serde_json::json!({ "message": message }))
            .timeout(timeout);

        let response = request
            .send()
            .await
            .map_err(|e| self.classify(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        Ok(extract_reply(&body))
    }

    async fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        let request = self.authorized(self.http.get(&url)).timeout(HEALTH_TIMEOUT);
        match request.send().await {
            Ok(response) => {
                let ok = response.status().as_u16() < 400;
                tracing::debug!(%url, status = response.status().as_u16(), "health check");
                ok
            }
            Err(err) => {
                tracing::debug!(%url, %err, "health check failed");
                false
            }
        }
    }
}
