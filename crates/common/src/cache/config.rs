//! Cache configuration types and builder patterns

use std::time::Duration;

/// Configuration for cache behavior
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Time-to-live for entries (None = no expiration)
    pub ttl: Option<Duration>,

    /// Whether to collect hit/miss/expiration counters
    pub track_metrics: bool,
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Quick preset for TTL-based cache
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use faas_common::cache::CacheConfig;
    ///
    /// let config = CacheConfig::ttl(Duration::from_secs(600));
    /// assert_eq!(config.ttl, Some(Duration::from_secs(600)));
    /// ```
    pub fn ttl(duration: Duration) -> Self {
        Self { ttl: Some(duration), ..Self::default() }
    }
}

/// Builder for CacheConfig with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Set the time-to-live for entries
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.config.ttl = Some(ttl);
        self
    }

    /// Enable or disable metrics tracking
    pub fn track_metrics(mut self, enabled: bool) -> Self {
        self.config.track_metrics = enabled;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> CacheConfig {
        self.config
    }
}
