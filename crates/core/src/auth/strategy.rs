//! Credential provider variants and their selection
//!
//! Whatever the caller supplies is turned into a single
//! [`AuthorizationHeaderProvider`] once, when the client is built.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use faas_common::time::SharedClock;
use faas_domain::{AppJwtCredentials, ClientConfig, Result};
use futures::future::BoxFuture;

use super::app_jwt::AppJwtAuthentication;
use super::ports::{
    AuthorizationHeaderProvider, AuthorizationRequest, RequestSigner, TokenExchanger,
};
use crate::discovery_ports::DomainResolver;

type HeaderFn =
    dyn Fn(AuthorizationRequest) -> BoxFuture<'static, Result<String>> + Send + Sync;

/// Calls a caller-supplied async function for every request
pub struct StaticHeaderProvider {
    produce: Box<HeaderFn>,
}

impl StaticHeaderProvider {
    /// Wrap an async header function
    ///
    /// # Example
    /// ```
    /// use faas_core::auth::StaticHeaderProvider;
    ///
    /// let provider = StaticHeaderProvider::new(|_request| async {
    ///     Ok("Bearer precomputed".to_string())
    /// });
    /// # let _ = provider;
    /// ```
    pub fn new<F, Fut>(produce: F) -> Self
    where
        F: Fn(AuthorizationRequest) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<String>> + Send + 'static,
    {
        Self {
            produce: Box::new(move |request| -> BoxFuture<'static, Result<String>> {
                Box::pin(produce(request))
            }),
        }
    }
}

impl fmt::Debug for StaticHeaderProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticHeaderProvider")
    }
}

#[async_trait]
impl AuthorizationHeaderProvider for StaticHeaderProvider {
    async fn authorization_header(&self, request: &AuthorizationRequest) -> Result<String> {
        (self.produce)(request.clone()).await
    }
}

/// Delegates to a [`RequestSigner`]; nothing is cached
pub struct SigningHeaderProvider {
    signer: Arc<dyn RequestSigner>,
}

impl SigningHeaderProvider {
    pub fn new(signer: Arc<dyn RequestSigner>) -> Self {
        Self { signer }
    }
}

#[async_trait]
impl AuthorizationHeaderProvider for SigningHeaderProvider {
    async fn authorization_header(&self, request: &AuthorizationRequest) -> Result<String> {
        self.signer.sign(request)
    }
}

/// How the client authenticates its requests
#[derive(Clone)]
pub enum AuthStrategy {
    /// Client-credentials exchange for an AppJWT bearer token
    AppJwt(AppJwtCredentials),
    /// Caller-supplied header provider, invoked per request
    Header(Arc<dyn AuthorizationHeaderProvider>),
    /// Caller-supplied request signer
    Signer(Arc<dyn RequestSigner>),
}

impl AuthStrategy {
    /// Strategy from an async header function
    pub fn header_fn<F, Fut>(produce: F) -> Self
    where
        F: Fn(AuthorizationRequest) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<String>> + Send + 'static,
    {
        Self::Header(Arc::new(StaticHeaderProvider::new(produce)))
    }

    /// Build the provider for this strategy.
    ///
    /// `resolver` and `exchanger` are only used by the AppJWT variant.
    pub fn into_provider(
        self,
        config: &ClientConfig,
        resolver: Arc<dyn DomainResolver>,
        exchanger: Arc<dyn TokenExchanger>,
        clock: SharedClock,
    ) -> Arc<dyn AuthorizationHeaderProvider> {
        match self {
            Self::AppJwt(credentials) => Arc::new(AppJwtAuthentication::from_config(
                config,
                credentials,
                resolver,
                exchanger,
                clock,
            )),
            Self::Header(provider) => provider,
            Self::Signer(signer) => Arc::new(SigningHeaderProvider::new(signer)),
        }
    }
}

impl fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AppJwt(credentials) => f.debug_tuple("AppJwt").field(credentials).finish(),
            Self::Header(_) => f.write_str("Header"),
            Self::Signer(_) => f.write_str("Signer"),
        }
    }
}

impl From<AppJwtCredentials> for AuthStrategy {
    fn from(credentials: AppJwtCredentials) -> Self {
        Self::AppJwt(credentials)
    }
}
