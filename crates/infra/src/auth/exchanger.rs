//! Client-credentials token exchange over HTTP

use async_trait::async_trait;
use faas_core::{AccessToken, TokenExchangeRequest, TokenExchanger};
use faas_domain::{ClientConfig, FaasError, FaasErrorKind, Result};
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use tracing::{debug, instrument};

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Posts `grant_type=client_credentials` forms to the token endpoint
#[derive(Debug, Clone)]
pub struct ClientCredentialsExchanger {
    http: ReqwestClient,
}

impl ClientCredentialsExchanger {
    pub fn new(http: ReqwestClient) -> Self {
        Self { http }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let http = ReqwestClient::builder().timeout(config.timeout()).build().map_err(|err| {
            FaasError::wrap(FaasErrorKind::Config, "HTTP client could not be built", err)
        })?;
        Ok(Self::new(http))
    }
}

#[async_trait]
impl TokenExchanger for ClientCredentialsExchanger {
    #[instrument(skip_all, fields(url = %request.token_url))]
    async fn exchange(&self, request: &TokenExchangeRequest) -> Result<AccessToken> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", request.client_id.as_str()),
            ("client_secret", request.client_secret.as_str()),
        ];

        let outcome = async {
            let response =
                self.http.post(&request.token_url).form(&form).send().await?.error_for_status()?;
            response.json::<TokenResponse>().await
        }
        .await;

        match outcome {
            Ok(token) => {
                debug!("client credentials exchanged");
                Ok(AccessToken { access_token: token.access_token })
            }
            Err(err) => Err(FaasError::wrap(
                FaasErrorKind::AppJwtRetrieval,
                "Client credentials could not be exchanged for an AppJWT",
                err,
            )),
        }
    }
}
