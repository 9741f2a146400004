//! Observability adapters for operation metrics
//!
//! Collectors implementing `faas_core::MetricCollector`:
//! - [`metrics::TracingMetricCollector`] logs each record as a structured
//!   `tracing` event
//! - [`metrics::InvocationMetrics`] aggregates counts and P50/P95/P99
//!   durations in process
//! - [`metrics::FanoutMetricCollector`] forwards to several collectors
//!
//! Aggregates use a ring buffer (`VecDeque`) for duration samples and
//! recover from mutex poisoning instead of panicking.

pub mod metrics;

/// Metrics error type
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Empty data set - cannot calculate aggregate metric
    #[error("Empty data: cannot calculate {metric}")]
    EmptyData {
        /// Metric name that failed (e.g., "P95", "P50")
        metric: &'static str,
    },
}

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;
