//! Metric collectors

pub mod collector;
pub mod invocation;

pub use collector::{FanoutMetricCollector, TracingMetricCollector};
pub use invocation::{InvocationMetrics, OperationMetrics};
