//! Shared test helpers for `faas-core` integration tests.
//!
//! In-memory fakes for every port the orchestrator talks to, so tests can
//! script platform responses and inspect what was sent.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use faas_common::time::MockClock;
use faas_core::{
    AuthorizationHeaderProvider, AuthorizationRequest, DomainResolver, FetchRequest,
    IdGenerator, InvocationMetric, InvocationService, MetricCollector, Transport,
};
use faas_domain::{ClientConfig, FaasError, FaasErrorKind, Response, Result as DomainResult};
use parking_lot::Mutex;
use serde_json::Value;

pub const ACCOUNT_ID: &str = "123456";
pub const GW_DOMAIN: &str = "gw.example.com";
pub const UI_DOMAIN: &str = "ui.example.com";
pub const REQUEST_ID: &str = "req-0001";
pub const EPOCH_SECS: u64 = 1_700_000_000;

/// Build a response the way the HTTP transport would
pub fn response(status: u16, status_text: &str, body: Value) -> Response {
    Response {
        url: String::new(),
        headers: BTreeMap::new(),
        body,
        ok: (200..300).contains(&status),
        status,
        status_text: status_text.to_string(),
        retry_count: None,
    }
}

/// Transport that replays scripted outcomes and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<DomainResult<Response>>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next request.
    pub fn respond(&self, response: Response) -> &Self {
        self.outcomes.lock().push_back(Ok(response));
        self
    }

    /// Queue a transport failure for the next request.
    pub fn fail(&self, message: &str) -> &Self {
        self.outcomes.lock().push_back(Err(FaasError::new(FaasErrorKind::Transport, message)));
        self
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch(&self, request: FetchRequest) -> DomainResult<Response> {
        let url = request.url.clone();
        self.requests.lock().push(request);
        let next = self.outcomes.lock().pop_front();
        let outcome = next.unwrap_or_else(|| {
            Err(FaasError::new(FaasErrorKind::Transport, "no scripted outcome"))
        });
        outcome.map(|mut response| {
            response.url = url;
            response
        })
    }
}

/// Resolver backed by a fixed service table.
pub struct StaticResolver {
    domains: BTreeMap<String, String>,
    calls: AtomicUsize,
}

impl StaticResolver {
    /// The default gateway and UI services
    pub fn platform() -> Self {
        Self {
            domains: BTreeMap::from([
                ("faasGW".to_string(), GW_DOMAIN.to_string()),
                ("faasUI".to_string(), UI_DOMAIN.to_string()),
            ]),
            calls: AtomicUsize::new(0),
        }
    }

    /// A resolver that knows no services
    pub fn empty() -> Self {
        Self { domains: BTreeMap::new(), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DomainResolver for StaticResolver {
    async fn resolve(&self, _account_id: &str, service: &str) -> DomainResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.domains.get(service).cloned().ok_or_else(|| {
            FaasError::new(
                FaasErrorKind::DomainNotFound,
                format!("Service \"{service}\" could not be found"),
            )
        })
    }
}

/// Header provider returning a fixed bearer token.
pub struct FixedAuth;

#[async_trait]
impl AuthorizationHeaderProvider for FixedAuth {
    async fn authorization_header(&self, _request: &AuthorizationRequest) -> DomainResult<String> {
        Ok("Bearer test-token".to_string())
    }
}

/// Always the same request id.
pub struct FixedIds;

impl IdGenerator for FixedIds {
    fn generate(&self) -> String {
        REQUEST_ID.to_string()
    }
}

/// Collector keeping every metric with the hook that received it.
#[derive(Default)]
pub struct RecordingMetrics {
    records: Mutex<Vec<(&'static str, InvocationMetric)>>,
}

impl RecordingMetrics {
    pub fn records(&self) -> Vec<(&'static str, InvocationMetric)> {
        self.records.lock().clone()
    }

    pub fn last(&self) -> Option<(&'static str, InvocationMetric)> {
        self.records.lock().last().cloned()
    }
}

impl MetricCollector for RecordingMetrics {
    fn on_invoke(&self, metric: &InvocationMetric) {
        self.records.lock().push(("invoke", metric.clone()));
    }

    fn on_get_lambdas(&self, metric: &InvocationMetric) {
        self.records.lock().push(("get_lambdas", metric.clone()));
    }

    fn on_is_implemented(&self, metric: &InvocationMetric) {
        self.records.lock().push(("is_implemented", metric.clone()));
    }
}

/// Everything a test needs to drive and inspect the orchestrator.
pub struct Harness {
    pub service: InvocationService,
    pub transport: Arc<ScriptedTransport>,
    pub resolver: Arc<StaticResolver>,
    pub metrics: Arc<RecordingMetrics>,
    pub clock: Arc<MockClock>,
}

impl Harness {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_resolver(config, StaticResolver::platform())
    }

    pub fn with_resolver(config: ClientConfig, resolver: StaticResolver) -> Self {
        let transport = Arc::new(ScriptedTransport::new());
        let resolver = Arc::new(resolver);
        let metrics = Arc::new(RecordingMetrics::default());
        let clock = Arc::new(MockClock::at_epoch_secs(EPOCH_SECS));

        let service = InvocationService::new(
            Arc::new(config),
            resolver.clone(),
            transport.clone(),
            Arc::new(FixedAuth),
            clock.clone(),
        )
        .with_id_generator(Arc::new(FixedIds))
        .with_metric_collector(metrics.clone());

        Self { service, transport, resolver, metrics, clock }
    }
}

pub fn config() -> ClientConfig {
    ClientConfig::new(ACCOUNT_ID)
}
