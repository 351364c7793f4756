//! # warden router
//!
//! The single enforcement point between the chat surface and the agent
//! gateway. Callers never reach the gateway directly; every request goes
//! through `Router::dispatch`, which resolves the caller's identity,
//! admits it against the rate limit, evaluates policy, and only then
//! forwards a sanitized instruction downstream.

pub mod dispatcher;
pub mod instruction;

pub use dispatcher::{DispatchResult, Router, RouterConfig};
pub use instruction::Instruction;
