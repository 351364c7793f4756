//! # warden shared
//!
//! Common types used across all warden crates: identities, role
//! configuration, and the workspace error type.

pub mod config;
pub mod error;
pub mod identity;
pub mod role;

// Re-exports
pub use config::*;
pub use error::*;
pub use identity::*;
pub use role::*;
