//! Metrics port - receives one record per logical client operation
//!
//! Records are emitted on success and failure alike, and for result-cache
//! hits. Collectors must be cheap: they run inline on the caller's task.

use faas_domain::constants::UNRESOLVED_DOMAIN;
use faas_domain::FaasError;

/// Failure details carried by a metric record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricError {
    /// Stable error name, e.g. `FaaSInvokeError`
    pub name: &'static str,
    /// Rendered error chain
    pub message: String,
}

/// One operation's metric record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationMetric {
    pub account_id: String,
    /// Wall-clock duration of the operation in milliseconds
    pub request_duration_ms: u64,
    /// Resolved domain, `unresolved` if resolution did not complete
    pub domain: String,
    pub external_system: Option<String>,
    pub user_id: Option<String>,
    pub event: Option<String>,
    pub uuid: Option<String>,
    /// HTTP status of a failed request, when one was received
    pub status_code: Option<u16>,
    pub error: Option<MetricError>,
    pub from_cache: bool,
}

impl InvocationMetric {
    /// Base record for an account before anything is resolved
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            request_duration_ms: 0,
            domain: UNRESOLVED_DOMAIN.to_string(),
            external_system: None,
            user_id: None,
            event: None,
            uuid: None,
            status_code: None,
            error: None,
            from_cache: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Attach failure details from `error`
    pub fn record_error(&mut self, error: &FaasError) {
        self.status_code = error.status_code();
        self.error = Some(MetricError { name: error.name(), message: error.to_string() });
    }
}

/// Receives operation metrics
pub trait MetricCollector: Send + Sync {
    fn on_invoke(&self, metric: &InvocationMetric);
    fn on_get_lambdas(&self, metric: &InvocationMetric);
    fn on_is_implemented(&self, metric: &InvocationMetric);
}
