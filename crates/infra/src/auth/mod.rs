//! Credential adapters
//!
//! The AppJWT provider itself lives in `faas-core`; this module supplies the
//! HTTP token exchange it needs and wires a strategy into a provider.

pub mod exchanger;

use std::sync::Arc;

use faas_common::time::SharedClock;
use faas_core::{AuthStrategy, AuthorizationHeaderProvider, DomainResolver};
use faas_domain::{ClientConfig, Result};

pub use exchanger::ClientCredentialsExchanger;

/// Build the header provider for `strategy`.
///
/// The AppJWT variant resolves the auth domain through `resolver` and
/// exchanges credentials over HTTP.
pub fn build_header_provider(
    strategy: AuthStrategy,
    config: &ClientConfig,
    resolver: Arc<dyn DomainResolver>,
    clock: SharedClock,
) -> Result<Arc<dyn AuthorizationHeaderProvider>> {
    let exchanger = Arc::new(ClientCredentialsExchanger::from_config(config)?);
    Ok(strategy.into_provider(config, resolver, exchanger, clock))
}
