//! Generic in-memory caching
//!
//! A single synchronous [`Cache`] type backs both the service-discovery cache
//! and the is-implemented result cache. It supports:
//! - TTL expiry evaluated lazily against an injectable [`Clock`](crate::time::Clock)
//! - unbounded storage: every key lives until it expires or is removed
//! - hit/miss/expiration counters via [`CacheStats`]
//!
//! All operations take a short `parking_lot` lock and never await, so a
//! lookup followed by an insert from the same task cannot interleave with
//! another task's access.

pub mod config;
pub mod core;
pub mod stats;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use self::core::Cache;
pub use stats::CacheStats;
