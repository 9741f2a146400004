//! Resilience patterns for fault tolerance
//!
//! Currently a generic retry executor. Transport adapters supply the
//! [`RetryPolicy`] deciding which failures are transient.

pub mod retry;

pub use retry::{
    policies, BackoffStrategy, RetryConfig, RetryConfigBuilder, RetryDecision, RetryError,
    RetryExecutor, RetryOutcome, RetryPolicy, RetryResult,
};
