//! Public client façade
//!
//! [`ClientBuilder`] fills in a default for every collaborator that is not
//! supplied: the reqwest transport, the CSDS domain cache, the credential
//! provider selected by the [`AuthStrategy`], UUID request ids, the system
//! clock and a fresh result cache.

use std::sync::Arc;

use faas_common::time::{SharedClock, SystemClock};
use faas_core::{
    AuthStrategy, AuthorizationHeaderProvider, DomainResolver, IdGenerator, InvocationService,
    IsImplementedCache, MetricCollector, Transport,
};
use faas_domain::constants::CLIENT_VERSION;
use faas_domain::{
    AppJwtCredentials, ClientConfig, FaasError, FaasErrorKind, Invocation, IsImplementedRequest,
    LambdaFilter, Response, Result,
};
use tracing::info;

use crate::auth::build_header_provider;
use crate::config::LoadedConfig;
use crate::csds::CsdsClient;
use crate::http::HttpTransport;

/// FaaS platform client
pub struct Client {
    service: InvocationService,
}

impl Client {
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Client using AppJWT credentials and every default collaborator
    pub fn with_app_jwt(config: ClientConfig, credentials: AppJwtCredentials) -> Result<Self> {
        Self::builder(config).auth(AuthStrategy::AppJwt(credentials)).build()
    }

    /// Client from a loaded configuration; requires credentials in it
    pub fn from_loaded(loaded: LoadedConfig) -> Result<Self> {
        let credentials = loaded.credentials.ok_or_else(|| {
            FaasError::new(FaasErrorKind::Config, "AppJWT credentials are required")
        })?;
        Self::builder(loaded.client).auth(AuthStrategy::AppJwt(credentials)).build()
    }

    /// Invoke a lambda by event or UUID
    pub async fn invoke(&self, invocation: &Invocation) -> Result<Response> {
        self.service.invoke(invocation).await
    }

    /// List the account's lambdas
    pub async fn get_lambdas(&self, filter: &LambdaFilter) -> Result<Response> {
        self.service.get_lambdas(filter).await
    }

    /// Whether an event has an implementing lambda
    pub async fn is_implemented(&self, request: &IsImplementedRequest) -> Result<bool> {
        self.service.is_implemented(request).await
    }

    pub fn version(&self) -> &'static str {
        CLIENT_VERSION
    }

    pub fn config(&self) -> &ClientConfig {
        self.service.config()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("account_id", &self.config().account_id)
            .field("version", &CLIENT_VERSION)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    config: ClientConfig,
    auth: Option<AuthStrategy>,
    transport: Option<Arc<dyn Transport>>,
    resolver: Option<Arc<dyn DomainResolver>>,
    ids: Option<Arc<dyn IdGenerator>>,
    metrics: Option<Arc<dyn MetricCollector>>,
    result_cache: Option<Arc<IsImplementedCache>>,
    clock: Option<SharedClock>,
    csds_base_url: Option<String>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            auth: None,
            transport: None,
            resolver: None,
            ids: None,
            metrics: None,
            result_cache: None,
            clock: None,
            csds_base_url: None,
        }
    }

    /// How the `Authorization` header is produced (required)
    pub fn auth(mut self, strategy: AuthStrategy) -> Self {
        self.auth = Some(strategy);
        self
    }

    /// Shorthand for [`AuthStrategy::Header`]
    pub fn header_provider(self, provider: Arc<dyn AuthorizationHeaderProvider>) -> Self {
        self.auth(AuthStrategy::Header(provider))
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn domain_resolver(mut self, resolver: Arc<dyn DomainResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn metric_collector(mut self, collector: Arc<dyn MetricCollector>) -> Self {
        self.metrics = Some(collector);
        self
    }

    /// Share a result cache between clients
    pub fn result_cache(mut self, cache: Arc<IsImplementedCache>) -> Self {
        self.result_cache = Some(cache);
        self
    }

    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Send discovery requests to `base_url` instead of the bootstrap host
    pub fn csds_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.csds_base_url = Some(base_url.into());
        self
    }

    /// Validate the configuration and assemble the client.
    ///
    /// # Errors
    /// `FaaSConfigError` for an invalid configuration or a missing auth
    /// strategy.
    pub fn build(self) -> Result<Client> {
        self.config.validate()?;
        let strategy = self.auth.ok_or_else(|| {
            FaasError::new(FaasErrorKind::Config, "an authentication strategy is required")
        })?;

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let resolver = match self.resolver {
            Some(resolver) => resolver,
            None => {
                let mut csds = CsdsClient::from_config(&self.config, clock.clone())?;
                if let Some(base_url) = self.csds_base_url {
                    csds = csds.with_base_url(base_url);
                }
                Arc::new(csds)
            }
        };
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::from_config(&self.config)?),
        };
        let auth = build_header_provider(strategy, &self.config, resolver.clone(), clock.clone())?;

        let config = Arc::new(self.config);
        let mut service = InvocationService::new(config.clone(), resolver, transport, auth, clock);
        if let Some(ids) = self.ids {
            service = service.with_id_generator(ids);
        }
        if let Some(collector) = self.metrics {
            service = service.with_metric_collector(collector);
        }
        if let Some(cache) = self.result_cache {
            service = service.with_result_cache(cache);
        }

        info!(account_id = %config.account_id, version = CLIENT_VERSION, "FaaS client ready");
        Ok(Client { service })
    }
}
