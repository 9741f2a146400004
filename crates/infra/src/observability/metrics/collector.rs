//! Log-based and fan-out metric collectors

use std::sync::Arc;

use faas_core::{InvocationMetric, MetricCollector};
use tracing::{info, warn};

/// Emits every metric record as a structured `tracing` event
///
/// Successes log at `info`, failures at `warn`, under the
/// `faas_client::metrics` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetricCollector;

impl TracingMetricCollector {
    fn record(operation: &'static str, metric: &InvocationMetric) {
        match &metric.error {
            None => info!(
                target: "faas_client::metrics",
                operation,
                account_id = %metric.account_id,
                domain = %metric.domain,
                duration_ms = metric.request_duration_ms,
                event = metric.event.as_deref(),
                uuid = metric.uuid.as_deref(),
                external_system = metric.external_system.as_deref(),
                from_cache = metric.from_cache,
                "operation succeeded"
            ),
            Some(error) => warn!(
                target: "faas_client::metrics",
                operation,
                account_id = %metric.account_id,
                domain = %metric.domain,
                duration_ms = metric.request_duration_ms,
                event = metric.event.as_deref(),
                uuid = metric.uuid.as_deref(),
                external_system = metric.external_system.as_deref(),
                status_code = metric.status_code,
                error_name = error.name,
                error = %error.message,
                "operation failed"
            ),
        }
    }
}

impl MetricCollector for TracingMetricCollector {
    fn on_invoke(&self, metric: &InvocationMetric) {
        Self::record("invoke", metric);
    }

    fn on_get_lambdas(&self, metric: &InvocationMetric) {
        Self::record("get_lambdas", metric);
    }

    fn on_is_implemented(&self, metric: &InvocationMetric) {
        Self::record("is_implemented", metric);
    }
}

/// Forwards every record to each inner collector in order
#[derive(Clone, Default)]
pub struct FanoutMetricCollector {
    collectors: Vec<Arc<dyn MetricCollector>>,
}

impl FanoutMetricCollector {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, collector: Arc<dyn MetricCollector>) -> Self {
        self.collectors.push(collector);
        self
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}

impl std::fmt::Debug for FanoutMetricCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutMetricCollector").field("collectors", &self.collectors.len()).finish()
    }
}

impl MetricCollector for FanoutMetricCollector {
    fn on_invoke(&self, metric: &InvocationMetric) {
        self.collectors.iter().for_each(|c| c.on_invoke(metric));
    }

    fn on_get_lambdas(&self, metric: &InvocationMetric) {
        self.collectors.iter().for_each(|c| c.on_get_lambdas(metric));
    }

    fn on_is_implemented(&self, metric: &InvocationMetric) {
        self.collectors.iter().for_each(|c| c.on_is_implemented(metric));
    }
}
