//! HTTP client tuning.
//!
//! This module provides timeouts and connection pool settings used when
//! building an [`HttpConnection`](crate::connection::HttpConnection).

use std::time::Duration;

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Default number of workers used by bulk operations
pub const DEFAULT_THREAD_COUNT: usize = 8;

/// HTTP client configuration.
///
/// Configures HTTP client behavior including timeouts, connection pooling, and
/// the worker count used by bulk operations.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Connect timeout
    pub connect_timeout: Duration,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Number of concurrent workers for bulk operations
    pub thread_count: usize,

    /// Enable request logging
    pub enable_logging: bool,

    /// Enable response compression
    pub enable_compression: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            thread_count: DEFAULT_THREAD_COUNT,
            enable_logging: true,
            enable_compression: true,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Set the bulk operation worker count. Zero is raised to one.
    #[must_use]
    pub const fn with_thread_count(mut self, count: usize) -> Self {
        self.thread_count = if count == 0 { 1 } else { count };
        self
    }

    /// Enable or disable logging.
    #[must_use]
    pub const fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_new() {
        let config = ClientConfig::new();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.thread_count, DEFAULT_THREAD_COUNT);
        assert!(config.enable_logging);
        assert!(config.enable_compression);
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT));
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new()
            .with_timeout(Duration::from_secs(60))
            .with_connect_timeout(Duration::from_secs(2))
            .with_pool_idle_timeout(Duration::from_secs(120))
            .with_pool_max_idle(20)
            .with_thread_count(4)
            .with_logging(false)
            .with_compression(false);

        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.pool_idle_timeout, Duration::from_secs(120));
        assert_eq!(config.pool_max_idle_per_host, 20);
        assert_eq!(config.thread_count, 4);
        assert!(!config.enable_logging);
        assert!(!config.enable_compression);
    }

    #[test]
    fn test_thread_count_never_zero() {
        let config = ClientConfig::new().with_thread_count(0);
        assert_eq!(config.thread_count, 1);
    }

    #[test]
    fn test_pool_constants() {
        assert_eq!(DEFAULT_POOL_IDLE_TIMEOUT, 90);
        assert_eq!(DEFAULT_POOL_MAX_IDLE_PER_HOST, 10);
    }
}
