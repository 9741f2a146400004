//! # FaaS Domain
//!
//! Domain types and models for the FaaS client.
//!
//! This crate contains:
//! - Invocation request and response types
//! - The error taxonomy with explicit cause chaining
//! - Client configuration and its defaults
//! - Platform constants and known event ids
//!
//! ## Architecture
//! - Depends only on the foundation tier of `faas-common`
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
