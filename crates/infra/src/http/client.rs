use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use faas_common::resilience::{RetryConfig, RetryDecision, RetryError, RetryExecutor, RetryPolicy};
use faas_core::{FetchRequest, Transport};
use faas_domain::{ClientConfig, FaasError, FaasErrorKind, HttpMethod, Response, Result};
use reqwest::{Client as ReqwestClient, Method};
use serde_json::Value;
use tracing::debug;

/// Network failures worth another attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientErrorCode {
    ConnectionReset,
    ConnectionRefused,
    ConnectionAborted,
    TimedOut,
    BrokenPipe,
    UnexpectedEof,
    /// Name resolution or connection establishment failed
    Connect,
}

impl TransientErrorCode {
    /// Classify a reqwest failure, `None` when it is not on the allow-list.
    pub fn classify(err: &reqwest::Error) -> Option<Self> {
        if err.is_timeout() {
            return Some(Self::TimedOut);
        }
        if let Some(code) = io_source(err).and_then(|io| Self::from_io_kind(io.kind())) {
            return Some(code);
        }
        if err.is_connect() {
            return Some(Self::Connect);
        }
        None
    }

    pub fn from_io_kind(kind: io::ErrorKind) -> Option<Self> {
        match kind {
            io::ErrorKind::ConnectionReset => Some(Self::ConnectionReset),
            io::ErrorKind::ConnectionRefused => Some(Self::ConnectionRefused),
            io::ErrorKind::ConnectionAborted => Some(Self::ConnectionAborted),
            io::ErrorKind::TimedOut => Some(Self::TimedOut),
            io::ErrorKind::BrokenPipe => Some(Self::BrokenPipe),
            io::ErrorKind::UnexpectedEof => Some(Self::UnexpectedEof),
            _ => None,
        }
    }
}

fn io_source(err: &reqwest::Error) -> Option<&io::Error> {
    let mut source = err.source();
    while let Some(current) = source {
        if let Some(io) = current.downcast_ref::<io::Error>() {
            return Some(io);
        }
        source = current.source();
    }
    None
}

/// Why one attempt did not produce a final response
#[derive(Debug)]
enum AttemptFailure {
    Network(reqwest::Error),
    /// A gateway status configured as retryable
    Status(Response),
}

#[derive(Debug, Clone)]
struct TransportRetryPolicy {
    retryable_statuses: Vec<u16>,
}

impl RetryPolicy<AttemptFailure> for TransportRetryPolicy {
    fn should_retry(&self, error: &AttemptFailure, _attempt: u32) -> RetryDecision {
        match error {
            AttemptFailure::Network(err) if TransientErrorCode::classify(err).is_some() => {
                RetryDecision::Retry
            }
            AttemptFailure::Status(response)
                if self.retryable_statuses.contains(&response.status) =>
            {
                RetryDecision::Retry
            }
            _ => RetryDecision::Stop,
        }
    }
}

/// reqwest transport with bounded retry on transient failures.
///
/// Delay before retry `n` is `n * delay_step`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
    executor: RetryExecutor<TransportRetryPolicy>,
}

impl HttpTransport {
    /// Start building a new transport.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Transport configured from the client's timeout and retry settings.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::builder()
            .timeout(config.timeout())
            .max_attempts(config.retry.max_attempts)
            .delay_step(config.retry.delay_step())
            .retryable_statuses(config.retry.retryable_statuses.clone())
            .build()
    }

    async fn attempt(
        &self,
        request: &FetchRequest,
        attempt: u32,
    ) -> std::result::Result<Response, AttemptFailure> {
        debug!(attempt, method = %request.method, url = %request.url, "sending HTTP request");

        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };
        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| {
            debug!(attempt, url = %request.url, error = %err, "HTTP request failed");
            AttemptFailure::Network(err)
        })?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect::<BTreeMap<_, _>>();
        let text = response.text().await.map_err(AttemptFailure::Network)?;
        debug!(attempt, url = %request.url, %status, "received HTTP response");

        let response = Response {
            url: request.url.clone(),
            headers,
            body: parse_body(&text),
            ok: status.is_success(),
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            retry_count: None,
        };

        if self.executor.policy().retryable_statuses.contains(&response.status) {
            return Err(AttemptFailure::Status(response));
        }
        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: FetchRequest) -> Result<Response> {
        let outcome =
            self.executor.execute_with_outcome(|attempt| self.attempt(&request, attempt)).await;
        let retries = outcome.retries();

        match outcome.result {
            Ok(mut response) => {
                response.retry_count = Some(retries);
                Ok(response)
            }
            Err(err) => {
                let attempts = err.attempts();
                match err {
                    RetryError::InvalidConfiguration { message } => {
                        Err(FaasError::new(FaasErrorKind::Config, message))
                    }
                    RetryError::AttemptsExhausted { last_error, .. }
                    | RetryError::NonRetryable { error: last_error, .. } => match last_error {
                        AttemptFailure::Status(mut response) => {
                            response.retry_count = Some(retries);
                            Ok(response)
                        }
                        AttemptFailure::Network(cause) => Err(FaasError::wrap(
                            FaasErrorKind::Transport,
                            format!(
                                "Request to {} failed after {attempts} attempt(s)",
                                request.url
                            ),
                            cause,
                        )),
                    },
                }
            }
        }
    }
}

/// JSON when possible, the raw text as a JSON string otherwise, `null` when
/// empty.
pub fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Builder for [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    timeout: Duration,
    max_attempts: u32,
    delay_step: Duration,
    retryable_statuses: Vec<u16>,
    accept_invalid_certs: bool,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        let defaults = ClientConfig::default();
        Self {
            timeout: defaults.timeout(),
            max_attempts: defaults.retry.max_attempts,
            delay_step: defaults.retry.delay_step(),
            retryable_statuses: defaults.retry.retryable_statuses,
            accept_invalid_certs: false,
        }
    }
}

impl HttpTransportBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn delay_step(mut self, step: Duration) -> Self {
        self.delay_step = step;
        self
    }

    /// Statuses retried like transient network failures.
    pub fn retryable_statuses(mut self, statuses: Vec<u16>) -> Self {
        self.retryable_statuses = statuses;
        self
    }

    /// Test-only helper to allow insecure TLS (e.g., self-signed certs).
    #[cfg(test)]
    pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.accept_invalid_certs = enabled;
        self
    }

    pub fn build(self) -> Result<HttpTransport> {
        let retry = RetryConfig::builder()
            .max_attempts(self.max_attempts)
            .linear_backoff(self.delay_step, self.delay_step)
            .build()
            .map_err(|err| FaasError::new(FaasErrorKind::Config, err.to_string()))?;

        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();
        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build().map_err(|err| {
            FaasError::wrap(FaasErrorKind::Config, "HTTP client could not be built", err)
        })?;

        let policy = TransportRetryPolicy { retryable_statuses: self.retryable_statuses };
        Ok(HttpTransport { client, executor: RetryExecutor::new(retry, policy) })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn transport() -> HttpTransport {
        HttpTransport::builder()
            .delay_step(Duration::from_millis(5))
            .max_attempts(3)
            .retryable_statuses(vec![502, 503, 504])
            .build()
            .expect("http transport")
    }

    fn get(url: String) -> FetchRequest {
        FetchRequest { url, method: HttpMethod::Get, headers: BTreeMap::new(), body: None }
    }

    #[tokio::test]
    async fn returns_successful_response_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"implemented": true})))
            .expect(1)
            .mount(&server)
            .await;

        let response = transport().fetch(get(server.uri())).await.expect("response");

        assert!(response.ok);
        assert_eq!(response.status, 200);
        assert_eq!(response.status_text, "OK");
        assert_eq!(response.body, json!({"implemented": true}));
        assert_eq!(response.retry_count, Some(0));
    }

    #[tokio::test]
    async fn sends_headers_and_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/invoke"))
            .and(header("X-Request-ID", "req-1"))
            .and(body_json(json!({"payload": {"a": 1}})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let request = FetchRequest {
            url: format!("{}/invoke", server.uri()),
            method: HttpMethod::Post,
            headers: BTreeMap::from([("X-Request-ID".to_string(), "req-1".to_string())]),
            body: Some(json!({"payload": {"a": 1}})),
        };
        let response = transport().fetch(request).await.expect("response");

        assert_eq!(response.status, 200);
        assert_eq!(response.body, Value::Null);
    }

    #[tokio::test]
    async fn retries_gateway_errors_until_success() {
        let server = MockServer::start().await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();
        Mock::given(method("GET"))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                let current = attempts_clone.fetch_add(1, Ordering::SeqCst);
                if current < 2 {
                    ResponseTemplate::new(503)
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .expect(3)
            .mount(&server)
            .await;

        let response = transport().fetch(get(server.uri())).await.expect("response");

        assert_eq!(response.status, 200);
        assert_eq!(response.retry_count, Some(2));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn returns_last_gateway_error_when_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
            .expect(3)
            .mount(&server)
            .await;

        let response = transport().fetch(get(server.uri())).await.expect("response");

        assert!(!response.ok);
        assert_eq!(response.status, 502);
        assert_eq!(response.body, json!("upstream down"));
        assert_eq!(response.retry_count, Some(2));
    }

    #[tokio::test]
    async fn default_builder_sends_gateway_errors_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&server)
            .await;

        let request = FetchRequest {
            url: format!("{}/invoke", server.uri()),
            method: HttpMethod::Post,
            headers: BTreeMap::new(),
            body: Some(json!({"payload": {}})),
        };
        let transport = HttpTransport::builder()
            .delay_step(Duration::from_millis(5))
            .build()
            .expect("http transport");
        let response = transport.fetch(request).await.expect("response");

        assert_eq!(response.status, 502);
        assert_eq!(response.retry_count, Some(0));
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let response = transport().fetch(get(server.uri())).await.expect("response");

        assert_eq!(response.status, 404);
        assert_eq!(response.status_text, "Not Found");
        assert_eq!(response.retry_count, Some(0));
    }

    #[tokio::test]
    async fn surfaces_network_failure_as_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let err = transport().fetch(get(format!("http://{addr}"))).await.expect_err("failure");

        assert_eq!(err.kind(), FaasErrorKind::Transport);
        assert!(err.message().contains("after 3 attempt(s)"));
        assert!(err.cause().is_some());
    }

    #[test]
    fn parse_body_falls_back_to_text() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("  "), Value::Null);
        assert_eq!(parse_body("{\"a\":1}"), json!({"a": 1}));
        assert_eq!(parse_body("plain text"), json!("plain text"));
    }

    #[test]
    fn io_kinds_on_allow_list() {
        assert_eq!(
            TransientErrorCode::from_io_kind(io::ErrorKind::ConnectionReset),
            Some(TransientErrorCode::ConnectionReset)
        );
        assert_eq!(
            TransientErrorCode::from_io_kind(io::ErrorKind::BrokenPipe),
            Some(TransientErrorCode::BrokenPipe)
        );
        assert_eq!(TransientErrorCode::from_io_kind(io::ErrorKind::PermissionDenied), None);
        assert_eq!(TransientErrorCode::from_io_kind(io::ErrorKind::InvalidData), None);
    }
}
