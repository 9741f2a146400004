//! # FaaS Core
//!
//! Client business logic - no HTTP or platform code.
//!
//! This crate contains:
//! - Port interfaces (traits) for discovery, transport, and metrics
//! - The credential providers behind the `Authorization` header
//! - The request orchestrator and its result cache
//!
//! ## Architecture Principles
//! - Only depends on `faas-common` and `faas-domain`
//! - No reqwest, no sockets, no filesystem
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod auth;
pub mod invocation;

// Infrastructure ports
pub mod discovery_ports;
pub mod metrics_ports;
pub mod transport_ports;

// Re-export specific items to avoid ambiguity
pub use auth::{
    AccessToken, AppJwtAuthentication, AuthStrategy, AuthorizationHeaderProvider,
    AuthorizationRequest, RequestSigner, SigningHeaderProvider, StaticHeaderProvider,
    TokenExchangeRequest, TokenExchanger,
};
pub use discovery_ports::DomainResolver;
pub use invocation::{InvocationService, IsImplementedCache};
pub use metrics_ports::{InvocationMetric, MetricCollector, MetricError};
pub use transport_ports::{FetchRequest, IdGenerator, Transport, UuidGenerator};
