//! # warden gateway
//!
//! Thin HTTP client for the downstream agent gateway. Approved,
//! sanitized instructions go out through here; nothing in this crate
//! makes authorization decisions, and nothing in it retries.

pub mod client;

pub use client::{Gateway, GatewayClient, GatewayError, DEFAULT_GATEWAY_URL, DEFAULT_TIMEOUT};
