//! In-process aggregation of operation metrics
//!
//! ## Design
//! - **VecDeque ring buffer** of the last 1000 durations per operation
//! - **Poison-safe locking** with explicit match pattern (no .expect())
//! - **Relaxed counters**: no derived metric reads two counters atomically

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use faas_core::{InvocationMetric, MetricCollector};

use crate::observability::{MetricsError, MetricsResult};

const MAX_SAMPLES: usize = 1000;

/// Counters and duration samples for one operation
#[derive(Debug)]
pub struct OperationMetrics {
    calls: AtomicUsize,
    failures: AtomicUsize,
    cache_hits: AtomicUsize,
    durations_ms: Mutex<VecDeque<u64>>,
}

impl Default for OperationMetrics {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
            durations_ms: Mutex::new(VecDeque::with_capacity(MAX_SAMPLES)),
        }
    }
}

impl OperationMetrics {
    fn record(&self, metric: &InvocationMetric) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if !metric.is_success() {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        if metric.from_cache {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        }

        let mut samples = self.samples();
        samples.push_back(metric.request_duration_ms);
        if samples.len() > MAX_SAMPLES {
            samples.pop_front();
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Share of calls that failed, 0.0 before the first call
    pub fn failure_rate(&self) -> f64 {
        let calls = self.calls();
        if calls == 0 {
            return 0.0;
        }
        self.failures() as f64 / calls as f64
    }

    /// Returns `MetricsError::EmptyData` if no samples recorded.
    pub fn p50_ms(&self) -> MetricsResult<u64> {
        self.percentile(0.50, "P50")
    }

    pub fn p95_ms(&self) -> MetricsResult<u64> {
        self.percentile(0.95, "P95")
    }

    pub fn p99_ms(&self) -> MetricsResult<u64> {
        self.percentile(0.99, "P99")
    }

    fn percentile(&self, percentile: f64, metric: &'static str) -> MetricsResult<u64> {
        let samples = self.samples();
        if samples.is_empty() {
            return Err(MetricsError::EmptyData { metric });
        }

        let mut sorted: Vec<u64> = samples.iter().copied().collect();
        sorted.sort_unstable();
        let index = ((sorted.len() as f64 * percentile) as usize).min(sorted.len() - 1);
        Ok(sorted[index])
    }

    fn samples(&self) -> MutexGuard<'_, VecDeque<u64>> {
        match self.durations_ms.lock() {
            Ok(guard) => guard,
            Err(poison_err) => {
                tracing::warn!(
                    metric = "OperationMetrics::durations_ms",
                    "Mutex poisoned, recovering data"
                );
                poison_err.into_inner()
            }
        }
    }
}

/// Aggregating collector with one [`OperationMetrics`] per operation
#[derive(Debug, Default)]
pub struct InvocationMetrics {
    invoke: OperationMetrics,
    get_lambdas: OperationMetrics,
    is_implemented: OperationMetrics,
}

impl InvocationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invoke(&self) -> &OperationMetrics {
        &self.invoke
    }

    pub fn get_lambdas(&self) -> &OperationMetrics {
        &self.get_lambdas
    }

    pub fn is_implemented(&self) -> &OperationMetrics {
        &self.is_implemented
    }
}

impl MetricCollector for InvocationMetrics {
    fn on_invoke(&self, metric: &InvocationMetric) {
        self.invoke.record(metric);
    }

    fn on_get_lambdas(&self, metric: &InvocationMetric) {
        self.get_lambdas.record(metric);
    }

    fn on_is_implemented(&self, metric: &InvocationMetric) {
        self.is_implemented.record(metric);
    }
}
