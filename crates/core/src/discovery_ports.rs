//! Service discovery port
//!
//! Maps an account and a service name to the base domain hosting that
//! service. The infra layer backs it with a TTL-cached discovery client.

use async_trait::async_trait;
use faas_domain::Result;

/// Resolves service domains for an account
#[async_trait]
pub trait DomainResolver: Send + Sync {
    /// Base domain (host, optionally with port) of `service` for `account_id`
    ///
    /// Fails with `CSDSDomainNotFound` when the service is not registered and
    /// with `CSDSFailure` when discovery itself failed.
    async fn resolve(&self, account_id: &str, service: &str) -> Result<String>;
}
