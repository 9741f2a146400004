//! AppJWT credential provider (OAuth2 client-credentials)
//!
//! Manages the bearer token lifecycle:
//! - Authentication domain resolved through service discovery
//! - Token exchanged through a [`TokenExchanger`]
//! - Expiry read from the token's unverified `exp` claim
//! - Refresh once the token is within the configured buffer of expiry
//!
//! The token slot sits behind an async mutex held across the refresh, so
//! concurrent callers share a single exchange.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use faas_common::time::SharedClock;
use faas_domain::{AppJwtCredentials, ClientConfig, FaasError, FaasErrorKind, Protocol, Result};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::ports::{
    AuthorizationHeaderProvider, AuthorizationRequest, TokenExchangeRequest, TokenExchanger,
};
use crate::discovery_ports::DomainResolver;

const EXPIRED_MESSAGE: &str = "Current AppJWT is expired and new Jwt could not be retrieved.";
const AUTHENTICATION_MESSAGE: &str =
    "Error while creating authentication bearer via AppJWT (Client Credentials)";

#[derive(Debug, Default)]
struct TokenState {
    access_token: String,
    /// `exp` claim in seconds since the UNIX epoch; 0 before the first exchange
    expires_at: f64,
}

#[derive(Deserialize)]
struct JwtClaims {
    exp: f64,
}

/// Produces `Bearer <AppJWT>` headers, refreshing the token near expiry
pub struct AppJwtAuthentication {
    account_id: String,
    credentials: AppJwtCredentials,
    auth_service_name: String,
    protocol: Protocol,
    expiration_buffer: Duration,
    resolver: Arc<dyn DomainResolver>,
    exchanger: Arc<dyn TokenExchanger>,
    clock: SharedClock,
    state: Mutex<TokenState>,
}

impl AppJwtAuthentication {
    /// Create a provider for `account_id`
    ///
    /// # Arguments
    /// * `expiration_buffer` - refresh once the token expires within this
    ///   window
    #[must_use]
    pub fn new(
        account_id: impl Into<String>,
        credentials: AppJwtCredentials,
        expiration_buffer: Duration,
        resolver: Arc<dyn DomainResolver>,
        exchanger: Arc<dyn TokenExchanger>,
        clock: SharedClock,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            credentials,
            auth_service_name: faas_domain::constants::DEFAULT_AUTH_SERVICE_NAME.to_string(),
            protocol: Protocol::Https,
            expiration_buffer,
            resolver,
            exchanger,
            clock,
            state: Mutex::new(TokenState::default()),
        }
    }

    /// Create a provider using the account, buffer, discovery service name
    /// and protocol of `config`
    #[must_use]
    pub fn from_config(
        config: &ClientConfig,
        credentials: AppJwtCredentials,
        resolver: Arc<dyn DomainResolver>,
        exchanger: Arc<dyn TokenExchanger>,
        clock: SharedClock,
    ) -> Self {
        let mut provider = Self::new(
            config.account_id.clone(),
            credentials,
            config.jwt_refresh_buffer(),
            resolver,
            exchanger,
            clock,
        );
        provider.auth_service_name.clone_from(&config.auth_csds_service_name);
        provider.protocol = config.protocol;
        provider
    }

    /// Current access token, exchanging a new one if needed
    ///
    /// # Errors
    /// Fails only when the exchange failed and the cached token is already
    /// past its `exp`. A failed refresh inside the buffer window keeps
    /// serving the cached token.
    #[instrument(skip(self), fields(account_id = %self.account_id))]
    pub async fn access_token(&self) -> Result<String> {
        let mut state = self.state.lock().await;
        let now = self.now_secs();

        if !self.is_expiring(&state, now) {
            return Ok(state.access_token.clone());
        }

        debug!(expires_at = state.expires_at, "AppJWT expiring, exchanging client credentials");
        match self.fetch_token().await {
            Ok((access_token, expires_at)) => {
                *state = TokenState { access_token, expires_at };
                info!(expires_at, "AppJWT refreshed");
                Ok(state.access_token.clone())
            }
            Err(err) if is_expired(&state, self.now_secs()) => {
                Err(FaasError::wrap(FaasErrorKind::AppJwtRetrieval, EXPIRED_MESSAGE, err))
            }
            Err(err) => {
                warn!(error = %err, "AppJWT refresh failed, keeping current token until expiry");
                Ok(state.access_token.clone())
            }
        }
    }

    fn is_expiring(&self, state: &TokenState, now: f64) -> bool {
        now > state.expires_at - self.expiration_buffer.as_secs_f64()
    }

    fn now_secs(&self) -> f64 {
        Duration::from_millis(self.clock.millis_since_epoch()).as_secs_f64()
    }

    async fn fetch_token(&self) -> Result<(String, f64)> {
        let domain = self.resolver.resolve(&self.account_id, &self.auth_service_name).await?;
        let request = TokenExchangeRequest {
            token_url: format!(
                "{}://{}/sentinel/api/account/{}/app/token?v=2.0",
                self.protocol.as_str(),
                domain,
                self.account_id
            ),
            client_id: self.credentials.client_id.clone(),
            client_secret: self.credentials.client_secret.clone(),
        };

        let token = self.exchanger.exchange(&request).await?;
        let expires_at = decode_expiry(&token.access_token)?;
        Ok((token.access_token, expires_at))
    }
}

fn is_expired(state: &TokenState, now: f64) -> bool {
    now > state.expires_at
}

/// Read the `exp` claim from a JWT without verifying its signature
pub fn decode_expiry(token: &str) -> Result<f64> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<JwtClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims.exp)
        .map_err(|err| {
            FaasError::wrap(
                FaasErrorKind::AppJwtRetrieval,
                "access token could not be decoded",
                err,
            )
        })
}

#[async_trait]
impl AuthorizationHeaderProvider for AppJwtAuthentication {
    async fn authorization_header(&self, _request: &AuthorizationRequest) -> Result<String> {
        self.access_token().await.map(|token| format!("Bearer {token}")).map_err(|err| {
            FaasError::wrap(FaasErrorKind::AppJwtAuthentication, AUTHENTICATION_MESSAGE, err)
        })
    }
}
