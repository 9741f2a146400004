//! Credential ports

use std::fmt;

use async_trait::async_trait;
use faas_domain::{HttpMethod, Result};

/// The request an Authorization header is produced for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub url: String,
    pub method: HttpMethod,
}

/// Produces the `Authorization` header value for each request
#[async_trait]
pub trait AuthorizationHeaderProvider: Send + Sync {
    async fn authorization_header(&self, request: &AuthorizationRequest) -> Result<String>;
}

/// Computes a per-request signature synchronously (e.g. OAuth 1.0a HMAC).
pub trait RequestSigner: Send + Sync {
    /// Full header value for the request
    fn sign(&self, request: &AuthorizationRequest) -> Result<String>;
}

/// Client-credentials grant input
#[derive(Clone, PartialEq, Eq)]
pub struct TokenExchangeRequest {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for TokenExchangeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenExchangeRequest")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Token returned by the exchange
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Exchanges client credentials for a bearer token
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange(&self, request: &TokenExchangeRequest) -> Result<AccessToken>;
}
