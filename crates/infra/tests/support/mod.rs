//! Shared fixtures for `faas-infra` integration tests.

use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use faas_core::{InvocationMetric, MetricCollector};
use faas_domain::{ClientConfig, Protocol};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ACCOUNT_ID: &str = "123456";

/// Unsigned JWT whose `exp` claim lies `ttl_secs` in the future.
pub fn jwt_expiring_in(ttl_secs: u64) -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).expect("clock after epoch").as_secs();
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({"exp": now + ttl_secs}).to_string());
    format!("{header}.{payload}.signature")
}

/// Client configuration pointing every service at plain-HTTP mock servers.
pub fn test_config() -> ClientConfig {
    let mut config = ClientConfig::new(ACCOUNT_ID);
    config.protocol = Protocol::Http;
    config.timeout_ms = 2_000;
    config.retry.delay_step_ms = 1;
    config
}

/// Mount a discovery response mapping the gateway, UI and auth services to
/// `server` itself.
pub async fn mount_discovery(server: &MockServer, expected_calls: u64) {
    let host = server.address().to_string();
    Mock::given(method("GET"))
        .and(path(format!("/api/account/{ACCOUNT_ID}/service/baseURI.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "baseURIs": [
                {"service": "faasGW", "account": ACCOUNT_ID, "baseURI": host},
                {"service": "faasUI", "account": ACCOUNT_ID, "baseURI": host},
                {"service": "sentinel", "account": ACCOUNT_ID, "baseURI": host},
            ]
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mount the AppJWT token endpoint returning `token`.
pub async fn mount_token(server: &MockServer, token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/sentinel/api/account/{ACCOUNT_ID}/app/token")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": token})))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Collector keeping every metric with the hook that received it.
#[derive(Default)]
pub struct RecordingMetrics {
    records: Mutex<Vec<(&'static str, InvocationMetric)>>,
}

impl RecordingMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn records(&self) -> Vec<(&'static str, InvocationMetric)> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn push(&self, hook: &'static str, metric: &InvocationMetric) {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).push((hook, metric.clone()));
    }
}

impl MetricCollector for RecordingMetrics {
    fn on_invoke(&self, metric: &InvocationMetric) {
        self.push("invoke", metric);
    }

    fn on_get_lambdas(&self, metric: &InvocationMetric) {
        self.push("get_lambdas", metric);
    }

    fn on_is_implemented(&self, metric: &InvocationMetric) {
        self.push("is_implemented", metric);
    }
}
