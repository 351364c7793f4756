//! AuditLogger - bounded in-memory log of dispatch outcomes
//!
//! Denials are security decisions and gateway errors are infrastructure
//! failures; the event type keeps them distinguishable after the fact.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub timestamp: String,
    pub event_type: AuditEventType,
    pub external_user_id: String,
    pub role: String,
    pub action: String,
    pub allowed: bool,
    pub reason: Option<String>,
}

/// Types of audit events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    IdentityFailure,
    RateLimited,
    PolicyDenied,
    Dispatched,
    GatewayError,
}

/// Bounded audit logger; oldest entries are dropped first.
#[derive(Debug)]
pub struct AuditLogger {
    entries: VecDeque<AuditEntry>,
    max_entries: usize,
}

impl AuditLogger {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries.min(1024)),
            max_entries,
        }
    }

    /// Log an audit entry
    pub fn log(&mut self, entry: AuditEntry) {
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Record a dispatch outcome
    pub fn log_event(
        &mut self,
        event_type: AuditEventType,
        external_user_id: &str,
        role: &str,
        action: &str,
        reason: Option<&str>,
    ) {
        let allowed = matches!(
            event_type,
            AuditEventType::Dispatched | AuditEventType::GatewayError
        );
        self.log(AuditEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            event_type,
            external_user_id: external_user_id.to_string(),
            role: role.to_string(),
            action: action.to_string(),
            allowed,
            reason: reason.map(|s| s.to_string()),
        });
    }

    /// Most recent entries, newest first
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        self.entries.iter().rev().take(limit).cloned().collect()
    }

    /// Most recent denials, newest first
    pub fn recent_denials(&self, limit: usize) -> Vec<AuditEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| !e.allowed)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Totals over the retained entries
    pub fn stats(&self) -> AuditStats {
        let total = self.entries.len();
        let denials = self.entries.iter().filter(|e| !e.allowed).count();
        AuditStats {
            total_entries: total,
            denial_count: denials,
        }
    }

    /// Export retained entries as JSON
    pub fn export_json(&self) -> serde_json::Value {
        serde_json::to_value(self.entries.iter().collect::<Vec<_>>()).unwrap_or_default()
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new(10_000)
    }
}

/// Audit statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditStats {
    pub total_entries: usize,
    pub denial_count: usize,
}
