//! # FaaS Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - The reqwest HTTP transport with bounded retry
//! - The CSDS domain cache
//! - The client-credentials token exchange
//! - Configuration loading and metric collectors
//! - The public [`Client`] façade
//!
//! ## Architecture
//! - Implements traits defined in `faas-core`
//! - Depends on `faas-common`, `faas-domain` and `faas-core`
//! - Contains all "impure" code (network, environment, filesystem)

pub mod auth;
pub mod client;
pub mod config;
pub mod csds;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use auth::{build_header_provider, ClientCredentialsExchanger};
pub use client::{Client, ClientBuilder};
pub use config::{ConfigLoadError, LoadedConfig};
pub use csds::CsdsClient;
pub use http::{HttpTransport, TransientErrorCode};
pub use observability::metrics::{FanoutMetricCollector, InvocationMetrics, TracingMetricCollector};
