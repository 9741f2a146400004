//! Credential providers
//!
//! Three variants produce the `Authorization` header value:
//! - [`AppJwtAuthentication`]: client-credentials exchange with cached token
//! - [`StaticHeaderProvider`]: caller-supplied async function
//! - [`SigningHeaderProvider`]: caller-supplied request signer
//!
//! [`AuthStrategy`] selects one when the client is built.

pub mod app_jwt;
pub mod ports;
pub mod strategy;

pub use app_jwt::AppJwtAuthentication;
pub use ports::{
    AccessToken, AuthorizationHeaderProvider, AuthorizationRequest, RequestSigner,
    TokenExchangeRequest, TokenExchanger,
};
pub use strategy::{AuthStrategy, SigningHeaderProvider, StaticHeaderProvider};
