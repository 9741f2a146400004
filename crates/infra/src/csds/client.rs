//! CSDS discovery client with a per-account TTL cache
//!
//! One discovery request fetches every service entry of an account; the list
//! is cached for the configured TTL and lookups by service name are served
//! from it. Concurrent misses for the same account share one request.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use faas_common::cache::{Cache, CacheConfig};
use faas_common::time::SharedClock;
use faas_core::DomainResolver;
use faas_domain::{ClientConfig, FaasError, FaasErrorKind, Result, ServiceDomain};
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

pub const DEV_BOOTSTRAP_HOST: &str = "hc1n.dev.lprnd.net";
pub const INTEGRATION_BOOTSTRAP_HOST: &str = "adminlogin-z0-intg.liveperson.net";
pub const PRODUCTION_BOOTSTRAP_HOST: &str = "adminlogin.liveperson.net";

/// Bootstrap host serving discovery for `account_id`
pub fn bootstrap_host(account_id: &str) -> &'static str {
    if account_id.starts_with("le") || account_id.starts_with("qa") {
        DEV_BOOTSTRAP_HOST
    } else if account_id.starts_with("fr") {
        INTEGRATION_BOOTSTRAP_HOST
    } else {
        PRODUCTION_BOOTSTRAP_HOST
    }
}

#[derive(Debug, Deserialize)]
struct DiscoveryResponse {
    #[serde(rename = "baseURIs", default)]
    base_uris: Vec<ServiceDomain>,
}

/// Domain cache backed by the CSDS discovery endpoint
pub struct CsdsClient {
    http: ReqwestClient,
    domains: Cache<String, Vec<ServiceDomain>, SharedClock>,
    inflight: DashMap<String, Arc<Mutex<()>>>,
    headers: BTreeMap<String, String>,
    base_url: Option<String>,
}

impl CsdsClient {
    /// Client using the configured TTL, timeout and discovery headers.
    pub fn from_config(config: &ClientConfig, clock: SharedClock) -> Result<Self> {
        let http = ReqwestClient::builder().timeout(config.timeout()).build().map_err(|err| {
            FaasError::wrap(FaasErrorKind::Config, "HTTP client could not be built", err)
        })?;
        Ok(Self::new(http, config.csds_ttl(), clock).with_headers(config.csds_http_headers.clone()))
    }

    pub fn new(http: ReqwestClient, ttl: Duration, clock: SharedClock) -> Self {
        let config = CacheConfig::builder().ttl(ttl).track_metrics(true).build();
        Self {
            http,
            domains: Cache::with_clock(config, clock),
            inflight: DashMap::new(),
            headers: BTreeMap::new(),
            base_url: None,
        }
    }

    /// Headers sent with every discovery request
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Send discovery requests to `base_url` instead of the bootstrap host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Discovery endpoint for an account
    pub fn discovery_url(&self, account_id: &str) -> String {
        let base = self
            .base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", bootstrap_host(account_id)));
        format!("{base}/api/account/{account_id}/service/baseURI.json?version=1.0")
    }

    /// Every service entry of an account, from cache while fresh
    ///
    /// # Errors
    /// `CSDSFailure` when the discovery request fails.
    pub async fn service_domains(&self, account_id: &str) -> Result<Vec<ServiceDomain>> {
        let key = account_id.to_string();
        if let Some(domains) = self.domains.get(&key) {
            return Ok(domains);
        }

        // Clone the guard out so the map shard is not held across the await.
        let guard = self.inflight.entry(key.clone()).or_default().clone();
        let outcome = {
            let _permit = guard.lock().await;
            self.refresh(account_id).await
        };

        // Only the map and this call still hold the guard: nobody is waiting.
        self.inflight.remove_if(&key, |_, entry| Arc::strong_count(entry) <= 2);
        outcome
    }

    async fn refresh(&self, account_id: &str) -> Result<Vec<ServiceDomain>> {
        let key = account_id.to_string();
        if let Some(domains) = self.domains.get(&key) {
            debug!(account_id, "discovery entries filled by a concurrent request");
            return Ok(domains);
        }

        let domains = self.fetch(account_id).await?;
        if domains.is_empty() {
            warn!(account_id, "discovery returned no entries, not caching");
        } else {
            info!(account_id, entries = domains.len(), "discovery entries cached");
            self.domains.insert(key, domains.clone());
        }
        Ok(domains)
    }

    /// Drop the cached entries of an account
    pub fn invalidate(&self, account_id: &str) {
        self.domains.remove(&account_id.to_string());
    }

    async fn fetch(&self, account_id: &str) -> Result<Vec<ServiceDomain>> {
        let url = self.discovery_url(account_id);
        debug!(account_id, %url, "fetching discovery entries");

        let mut request = self.http.get(&url);
        for (name, value) in &self.headers {
            request = request.header(name, value);
        }

        let outcome = async {
            let response = request.send().await?.error_for_status()?;
            response.json::<DiscoveryResponse>().await
        }
        .await;

        outcome.map(|parsed| parsed.base_uris).map_err(|err| {
            FaasError::wrap(
                FaasErrorKind::DiscoveryFailure,
                "Error while fetching CSDS entries",
                err,
            )
        })
    }
}

#[async_trait]
impl DomainResolver for CsdsClient {
    #[instrument(skip(self))]
    async fn resolve(&self, account_id: &str, service: &str) -> Result<String> {
        let domains = self.service_domains(account_id).await?;
        domains
            .into_iter()
            .find(|entry| entry.service == service)
            .map(|entry| entry.base_uri)
            .ok_or_else(|| {
                FaasError::new(
                    FaasErrorKind::DomainNotFound,
                    format!("Service \"{service}\" could not be found"),
                )
            })
    }
}
