//! Router - the authorization pipeline
//!
//! Five sequential stages, each able to end the pipeline early:
//! resolve identity, admit against the rate limit, evaluate policy,
//! render the instruction, forward to the gateway. Every outcome is a
//! `DispatchResult`; no stage lets a fault escape to the caller.

use crate::instruction::Instruction;
use audit::{Admission, AuditEventType, AuditLogger, AuditStats, RateLimiter};
use gateway::Gateway;
use identity::IdentityProvider;
use policy::PolicyEngine;
use serde::Serialize;
use serde_json::{Map, Value};
use shared::{RoleTable, DEFAULT_RATE_LIMIT};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

/// Router configuration
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Gateway session all instructions are posted to
    pub session: String,
    /// Timeout for the gateway call, the pipeline's only suspend point
    pub timeout: Duration,
    /// Rate limit applied when the resolved role has no configuration
    pub default_rate_limit: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            session: "main".to_string(),
            timeout: gateway::DEFAULT_TIMEOUT,
            default_rate_limit: DEFAULT_RATE_LIMIT,
        }
    }
}

/// The pipeline's only externally observable output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    pub allowed: bool,
    pub response: String,
    pub role: String,
    pub reason: String,
    pub action: String,
    pub external_user_id: String,
}

/// Routes action requests through identity, rate limiting, and policy
/// to the downstream gateway.
///
/// Explicitly constructed and dependency-injected; there is no hidden
/// module-level instance. Shared state is read-only except for the rate
/// limiter, so one `Router` serves any number of concurrent dispatches.
pub struct Router {
    provider: Arc<dyn IdentityProvider>,
    policy: PolicyEngine,
    limiter: RateLimiter,
    gateway: Arc<dyn Gateway>,
    roles: Arc<RoleTable>,
    audit: Mutex<AuditLogger>,
    config: RouterConfig,
}

impl Router {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        gateway: Arc<dyn Gateway>,
        roles: Arc<RoleTable>,
        config: RouterConfig,
    ) -> Self {
        Self {
            provider,
            policy: PolicyEngine::new(roles.clone()),
            limiter: RateLimiter::new(),
            gateway,
            roles,
            audit: Mutex::new(AuditLogger::default()),
            config,
        }
    }

    /// Dispatch one action request through the full pipeline.
    pub async fn dispatch(
        &self,
        external_user_id: &str,
        action: &str,
        params: &Map<String, Value>,
    ) -> DispatchResult {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "dispatch",
            %request_id,
            user = external_user_id,
            action
        );
        self.dispatch_inner(external_user_id, action, params)
            .instrument(span)
            .await
    }

    async fn dispatch_inner(
        &self,
        external_user_id: &str,
        action: &str,
        params: &Map<String, Value>,
    ) -> DispatchResult {
        // Stage 1: resolve identity. A provider error is an
        // infrastructure fault; the caller gets a generic message and
        // the detail stays in the logs.
        let identity = match self.provider.resolve(external_user_id).await {
            Ok(identity) => identity,
            Err(err) => {
                tracing::error!(%err, "identity resolution failed");
                self.record(
                    AuditEventType::IdentityFailure,
                    external_user_id,
                    "unknown",
                    action,
                    Some(&err.to_string()),
                );
                return DispatchResult {
                    allowed: false,
                    response: "Unable to verify your identity. Please contact an administrator."
                        .to_string(),
                    role: "unknown".to_string(),
                    reason: err.to_string(),
                    action: action.to_string(),
                    external_user_id: external_user_id.to_string(),
                };
            }
        };
        let role = identity.role.clone();

        // Stage 2: rate admission, atomically checked and recorded. An
        // unknown role uses the default limit; policy denies it next.
        let limit = self
            .roles
            .get(&role)
            .map(|cfg| cfg.rate_limit())
            .unwrap_or(self.config.default_rate_limit);
        if let Admission::Limited { count, limit } = self.limiter.acquire(external_user_id, limit) {
            tracing::warn!(%role, count, limit, "rate limit hit");
            self.record(
                AuditEventType::RateLimited,
                external_user_id,
                &role,
                action,
                Some("Rate limit exceeded"),
            );
            return DispatchResult {
                allowed: false,
                response: format!(
                    "Rate limit exceeded for role '{role}' ({limit} requests per minute). \
                     Try again shortly."
                ),
                role,
                reason: "Rate limit exceeded".to_string(),
                action: action.to_string(),
                external_user_id: external_user_id.to_string(),
            };
        }

        // Stage 3: policy. A denial hands back the admission slot so
        // refused requests consume no quota.
        let decision = self.policy.evaluate(&identity, action, params);
        if !decision.allowed {
            self.limiter.release(external_user_id);
            self.record(
                AuditEventType::PolicyDenied,
                external_user_id,
                &role,
                action,
                Some(&decision.reason),
            );
            return DispatchResult {
                allowed: false,
                response: format!("Denied: {}", decision.reason),
                role,
                reason: decision.reason,
                action: action.to_string(),
                external_user_id: external_user_id.to_string(),
            };
        }

        // Stages 4-5: render and forward. From here on the request is
        // approved; a gateway failure is an execution error, not a
        // denial, and monitoring needs to tell those apart.
        let message = Instruction::from_request(action, &decision.sanitized_params).render();
        match self
            .gateway
            .send_message(&message, &self.config.session, self.config.timeout)
            .await
        {
            Ok(reply) => {
                tracing::info!(%role, reply_len = reply.len(), "dispatch complete");
                self.record(
                    AuditEventType::Dispatched,
                    external_user_id,
                    &role,
                    action,
                    None,
                );
                DispatchResult {
                    allowed: true,
                    response: reply,
                    role,
                    reason: decision.reason,
                    action: action.to_string(),
                    external_user_id: external_user_id.to_string(),
                }
            }
            Err(err) => {
                tracing::error!(%err, "gateway call failed after approval");
                self.record(
                    AuditEventType::GatewayError,
                    external_user_id,
                    &role,
                    action,
                    Some(&err.to_string()),
                );
                DispatchResult {
                    allowed: true,
                    response: format!(
                        "Action was approved but the gateway reported an error: {err}"
                    ),
                    role,
                    reason: "Gateway execution error".to_string(),
                    action: action.to_string(),
                    external_user_id: external_user_id.to_string(),
                }
            }
        }
    }

    /// Probe the downstream gateway
    pub async fn health(&self) -> bool {
        self.gateway.health().await
    }

    /// Clear the rate window for a user (admin use)
    pub fn reset_user(&self, external_user_id: &str) {
        self.limiter.reset(external_user_id);
    }

    /// Requests recorded in the user's current window
    pub fn current_count(&self, external_user_id: &str) -> usize {
        self.limiter.current_count(external_user_id)
    }

    pub fn audit_stats(&self) -> AuditStats {
        self.audit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .stats()
    }

    pub fn recent_denials(&self, limit: usize) -> Vec<audit::AuditEntry> {
        self.audit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recent_denials(limit)
    }

    fn record(
        &self,
        event: AuditEventType,
        user: &str,
        role: &str,
        action: &str,
        reason: Option<&str>,
    ) {
        self.audit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .log_event(event, user, role, action, reason);
    }
}
