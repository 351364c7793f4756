//! # warden policy
//!
//! Role-based allow/deny decisions plus parameter sanitization.
//! Deny by default: unknown roles and unlisted actions are denied.

pub mod engine;
pub mod sanitize;

pub use engine::{PolicyDecision, PolicyEngine};
pub use sanitize::{sanitize, ConstraintViolation};
