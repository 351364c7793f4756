//! # warden audit
//!
//! Admission control and decision logging: a per-user sliding-window
//! rate limiter with atomic check-and-record, and a bounded in-memory
//! audit log of every dispatch outcome.

pub mod audit_logger;
pub mod rate_limiter;

pub use audit_logger::{AuditEntry, AuditEventType, AuditLogger, AuditStats};
pub use rate_limiter::{Admission, RateLimiter, DEFAULT_WINDOW};
