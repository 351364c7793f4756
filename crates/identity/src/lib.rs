//! # warden identity
//!
//! Maps opaque external user identifiers to roles. An unknown or empty
//! identifier never errors, it under-privileges the caller with the
//! configured default role.

pub mod resolver;

pub use resolver::{IdentityError, IdentityProvider, IdentityResolver};
