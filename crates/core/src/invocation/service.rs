//! Request orchestration - the client's core business logic
//!
//! Every public operation follows the same shape: resolve the target domain,
//! build the URL from the configured template, attach an Authorization
//! header, hand the request to the transport, classify the outcome, and emit
//! one metric record whether the operation succeeded or not.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use faas_common::time::SharedClock;
use faas_domain::constants::user_agent;
use faas_domain::{
    render_template, ClientConfig, DebugContext, FaasError, FaasErrorKind, HttpMethod,
    Invocation, InvocationBody, InvocationTarget, IsImplementedRequest, LambdaFilter, Response,
    Result,
};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use super::result_cache::IsImplementedCache;
use crate::auth::{AuthorizationHeaderProvider, AuthorizationRequest};
use crate::discovery_ports::DomainResolver;
use crate::metrics_ports::{InvocationMetric, MetricCollector};
use crate::transport_ports::{FetchRequest, IdGenerator, Transport, UuidGenerator};

/// Orchestrates invocations against the FaaS platform
pub struct InvocationService {
    config: Arc<ClientConfig>,
    resolver: Arc<dyn DomainResolver>,
    transport: Arc<dyn Transport>,
    auth: Arc<dyn AuthorizationHeaderProvider>,
    ids: Arc<dyn IdGenerator>,
    metrics: Option<Arc<dyn MetricCollector>>,
    result_cache: Arc<IsImplementedCache>,
    clock: SharedClock,
}

impl InvocationService {
    /// Create a service with a fresh result cache and UUID request ids
    pub fn new(
        config: Arc<ClientConfig>,
        resolver: Arc<dyn DomainResolver>,
        transport: Arc<dyn Transport>,
        auth: Arc<dyn AuthorizationHeaderProvider>,
        clock: SharedClock,
    ) -> Self {
        let result_cache = Arc::new(IsImplementedCache::new(
            config.is_implemented_cache_duration(),
            clock.clone(),
        ));
        Self {
            config,
            resolver,
            transport,
            auth,
            ids: Arc::new(UuidGenerator),
            metrics: None,
            result_cache,
            clock,
        }
    }

    /// Report every operation to `collector`
    pub fn with_metric_collector(mut self, collector: Arc<dyn MetricCollector>) -> Self {
        self.metrics = Some(collector);
        self
    }

    /// Use `ids` for `X-Request-ID` values
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Share an existing result cache
    pub fn with_result_cache(mut self, cache: Arc<IsImplementedCache>) -> Self {
        self.result_cache = cache;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn result_cache(&self) -> &IsImplementedCache {
        &self.result_cache
    }

    /// Invoke a lambda by event or UUID
    ///
    /// # Errors
    /// `FaaSLambdaError` when the platform reports a handler error code,
    /// `FaaSInvokeError` for every other failure. A non-success status is
    /// only an error when fail-on-error-status is enabled.
    #[instrument(skip(self, invocation), fields(account_id = %self.config.account_id))]
    pub async fn invoke(&self, invocation: &Invocation) -> Result<Response> {
        let mut metric = self.base_metric(Some(&invocation.external_system));
        metric.user_id.clone_from(&invocation.user_id);
        match &invocation.target {
            InvocationTarget::Event { event_id } => metric.event = Some(event_id.clone()),
            InvocationTarget::Uuid { lambda_uuid } => metric.uuid = Some(lambda_uuid.clone()),
        }
        let started = self.clock.now();

        let result = match self.resolve_domain(&self.config.gw_csds_service_name).await {
            Ok(domain) => {
                let outcome = self.perform_invocation(invocation, &domain).await;
                metric.domain = domain;
                outcome
            }
            Err(err) => Err(err),
        };

        self.finish(&mut metric, started, &result);
        self.emit(&metric, |collector, m| collector.on_invoke(m));
        result
    }

    /// List the account's lambdas
    ///
    /// # Errors
    /// `FaaSGetLambdasError` wrapping the underlying failure.
    #[instrument(skip(self, filter), fields(account_id = %self.config.account_id))]
    pub async fn get_lambdas(&self, filter: &LambdaFilter) -> Result<Response> {
        let mut metric = self.base_metric(filter.external_system.as_deref());
        metric.user_id.clone_from(&filter.user_id);
        metric.event.clone_from(&filter.event_id);
        let started = self.clock.now();

        let result = match self.resolve_domain(&self.config.ui_csds_service_name).await {
            Ok(domain) => {
                let outcome = self.perform_get_lambdas(filter, &domain).await;
                metric.domain = domain;
                outcome
            }
            Err(err) => Err(err),
        };

        self.finish(&mut metric, started, &result);
        self.emit(&metric, |collector, m| collector.on_get_lambdas(m));
        result
    }

    /// Check whether an event has an implementing lambda
    ///
    /// Answers are served from the result cache while fresh; a cache hit
    /// makes no network call and is reported with `from_cache = true`.
    ///
    /// # Errors
    /// `FaaSIsImplementedError` wrapping the underlying failure, including a
    /// response without an `implemented` flag.
    #[instrument(
        skip(self, request),
        fields(account_id = %self.config.account_id, event_id = %request.event_id)
    )]
    pub async fn is_implemented(&self, request: &IsImplementedRequest) -> Result<bool> {
        let mut metric = self.base_metric(Some(&request.external_system));
        metric.user_id.clone_from(&request.user_id);
        metric.event = Some(request.event_id.clone());
        let started = self.clock.now();
        let scope = request.skill_id.as_deref();

        if let Some(cached) = self.result_cache.get(&request.event_id, scope) {
            debug!(implemented = cached, "is-implemented answer served from cache");
            metric.from_cache = true;
            self.finish(&mut metric, started, &Ok::<_, FaasError>(cached));
            self.emit(&metric, |collector, m| collector.on_is_implemented(m));
            return Ok(cached);
        }

        let result = match self.resolve_domain(&self.config.gw_csds_service_name).await {
            Ok(domain) => {
                let outcome = self.perform_is_implemented(request, &domain).await;
                metric.domain = domain;
                outcome
            }
            Err(err) => Err(err),
        };

        if let Ok(implemented) = result {
            self.result_cache.put(&request.event_id, implemented, scope);
        }
        self.finish(&mut metric, started, &result);
        self.emit(&metric, |collector, m| collector.on_is_implemented(m));
        result
    }

    async fn perform_invocation(&self, invocation: &Invocation, domain: &str) -> Result<Response> {
        let account_id = self.config.account_id.as_str();
        let (path, message) = match &invocation.target {
            InvocationTarget::Event { event_id } => (
                render_template(
                    &self.config.invoke_event_uri,
                    &[("accountId", account_id), ("eventId", event_id)],
                ),
                format!("Failed to invoke lambda for event: \"{event_id}\""),
            ),
            InvocationTarget::Uuid { lambda_uuid } => (
                render_template(
                    &self.config.invoke_uuid_uri,
                    &[("accountId", account_id), ("lambdaUuid", lambda_uuid)],
                ),
                format!("Failed to invoke lambda: {lambda_uuid}"),
            ),
        };

        let mut query = vec![
            ("v", self.api_version(invocation.api_version.as_deref())),
            ("externalSystem", invocation.external_system.clone()),
        ];
        if let Some(skill_id) = &invocation.skill_id {
            query.push(("skillId", skill_id.clone()));
        }
        let fail_on_error = self.fail_on_error(invocation.fail_on_error_status_code);

        let outcome = async {
            let body = self.timestamped_body(&invocation.body)?;
            let url = self.build_url(domain, &path, &query)?;
            self.do_fetch(url, HttpMethod::Post, Some(body), fail_on_error).await
        }
        .await;

        outcome.map_err(|err| {
            let kind = if self.is_lambda_error(&err) {
                FaasErrorKind::LambdaExecution
            } else {
                FaasErrorKind::Invoke
            };
            FaasError::wrap(kind, message, err).with_context(self.debug_context())
        })
    }

    async fn perform_get_lambdas(&self, filter: &LambdaFilter, domain: &str) -> Result<Response> {
        let path = render_template(
            &self.config.get_lambdas_uri,
            &[("accountId", self.config.account_id.as_str())],
        );

        let mut query = Vec::new();
        if let Some(event_id) = &filter.event_id {
            query.push(("eventId", event_id.clone()));
        }
        for state in &filter.states {
            query.push(("state", state.clone()));
        }
        if let Some(user_id) = &filter.user_id {
            query.push(("userId", user_id.clone()));
        }
        query.push(("v", self.api_version(filter.api_version.as_deref())));
        let fail_on_error = self.fail_on_error(filter.fail_on_error_status_code);

        let outcome = async {
            let url = self.build_url(domain, &path, &query)?;
            self.do_fetch(url, HttpMethod::Get, None, fail_on_error).await
        }
        .await;

        outcome.map_err(|err| {
            FaasError::wrap(
                FaasErrorKind::GetLambdas,
                format!("Failed to get functions from account Id \"{}\".", self.config.account_id),
                err,
            )
            .with_context(self.debug_context())
        })
    }

    async fn perform_is_implemented(
        &self,
        request: &IsImplementedRequest,
        domain: &str,
    ) -> Result<bool> {
        let path = render_template(
            &self.config.is_implemented_uri,
            &[("accountId", self.config.account_id.as_str()), ("eventId", &request.event_id)],
        );

        let mut query = vec![
            ("v", self.api_version(request.api_version.as_deref())),
            ("externalSystem", request.external_system.clone()),
        ];
        if let Some(skill_id) = &request.skill_id {
            query.push(("skillId", skill_id.clone()));
        }
        let fail_on_error = self.fail_on_error(request.fail_on_error_status_code);

        let outcome = async {
            let url = self.build_url(domain, &path, &query)?;
            let response = self.do_fetch(url, HttpMethod::Get, None, fail_on_error).await?;
            response.body.get("implemented").and_then(Value::as_bool).ok_or_else(|| {
                FaasError::new(FaasErrorKind::IsImplementedParse, "Response could not be parsed")
                    .with_response(response.clone())
            })
        }
        .await;

        outcome.map_err(|err| {
            FaasError::wrap(
                FaasErrorKind::IsImplemented,
                format!("Failed to check if event \"{}\" is implemented.", request.event_id),
                err,
            )
            .with_context(self.debug_context())
        })
    }

    /// Send one request with the standard headers
    ///
    /// Failures, including a non-success status when `fail_on_error` is set,
    /// come back wrapped as `FaaSRequestError`.
    async fn do_fetch(
        &self,
        url: String,
        method: HttpMethod,
        body: Option<Value>,
        fail_on_error: bool,
    ) -> Result<Response> {
        let request_id = self.ids.generate();
        debug!(%method, %url, %request_id, "sending request");

        let outcome = async {
            let authorization = self
                .auth
                .authorization_header(&AuthorizationRequest { url: url.clone(), method })
                .await?;

            let headers = BTreeMap::from([
                ("Authorization".to_string(), authorization),
                ("Content-Type".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), user_agent()),
                ("X-Request-ID".to_string(), request_id.clone()),
            ]);
            let request = FetchRequest { url: url.clone(), method, headers, body };
            let response = self.transport.fetch(request).await?;

            if !response.ok && fail_on_error {
                return Err(status_error(response));
            }
            Ok(response)
        }
        .await;

        outcome.map_err(|err| {
            warn!(%request_id, error = %err, "request failed");
            FaasError::wrap(FaasErrorKind::Request, format!("Failed on request: {url}"), err)
                .with_context(self.debug_context())
        })
    }

    async fn resolve_domain(&self, service: &str) -> Result<String> {
        self.resolver.resolve(&self.config.account_id, service).await.map_err(|err| {
            FaasError::wrap(
                FaasErrorKind::DomainResolution,
                format!("Failed to resolve domain for csdsService: {service}."),
                err,
            )
            .with_context(self.debug_context())
        })
    }

    fn build_url(&self, domain: &str, path: &str, query: &[(&str, String)]) -> Result<String> {
        let create_url_error = |cause: url::ParseError| {
            FaasError::wrap(
                FaasErrorKind::CreateUrl,
                format!(
                    "Could not create URL. Failed to fetch domain for {}. Domain: {domain}",
                    self.config.account_id
                ),
                cause,
            )
            .with_context(self.debug_context())
        };

        let base = Url::parse(&format!("{}://{domain}/", self.config.protocol.as_str()))
            .map_err(create_url_error)?;
        let mut url = base.join(path.trim_start_matches('/')).map_err(create_url_error)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url.into())
    }

    /// The body as JSON, stamped with the current time unless it carries
    /// its own timestamp
    fn timestamped_body(&self, body: &InvocationBody) -> Result<Value> {
        let mut value = serde_json::to_value(body).map_err(|err| {
            FaasError::wrap(FaasErrorKind::Request, "invocation body could not be serialized", err)
        })?;
        if body.timestamp.is_none() {
            if let Value::Object(map) = &mut value {
                map.insert("timestamp".to_string(), Value::from(self.clock.millis_since_epoch()));
            }
        }
        Ok(value)
    }

    fn is_lambda_error(&self, err: &FaasError) -> bool {
        err.find_kind(FaasErrorKind::HttpRequest)
            .and_then(FaasError::response)
            .and_then(Response::error_code)
            .is_some_and(|code| code.starts_with(&self.config.lambda_error_code_prefix))
    }

    fn api_version(&self, requested: Option<&str>) -> String {
        requested.unwrap_or(&self.config.api_version).to_string()
    }

    fn fail_on_error(&self, requested: Option<bool>) -> bool {
        requested.unwrap_or(self.config.fail_on_error_status_code)
    }

    fn debug_context(&self) -> DebugContext {
        DebugContext::for_account(self.config.account_id.clone())
    }

    fn base_metric(&self, external_system: Option<&str>) -> InvocationMetric {
        let mut metric = InvocationMetric::new(self.config.account_id.clone());
        metric.external_system = external_system.map(str::to_string);
        metric
    }

    fn finish<T>(&self, metric: &mut InvocationMetric, started: Instant, result: &Result<T>) {
        let elapsed = self.clock.now().saturating_duration_since(started);
        metric.request_duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        if let Err(err) = result {
            metric.record_error(err);
        }
    }

    fn emit(
        &self,
        metric: &InvocationMetric,
        send: impl FnOnce(&dyn MetricCollector, &InvocationMetric),
    ) {
        if let Some(collector) = &self.metrics {
            send(collector.as_ref(), metric);
        }
    }
}

fn status_error(response: Response) -> FaasError {
    let mut message = format!(
        "Request did not respond with a success status: {} - {}.",
        response.status, response.status_text
    );
    if !response.body.is_null() {
        message.push_str(&format!(" Response body: {}", response.body));
    }
    FaasError::new(FaasErrorKind::HttpRequest, message).with_response(response)
}
