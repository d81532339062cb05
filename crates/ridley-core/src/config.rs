//! Configuration structures for Ridley connections.
//!
//! This module provides the serializable, validated configuration used to
//! connect to a configuration-management server.

use crate::client::DEFAULT_THREAD_COUNT;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Configuration for a server connection.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConnectionConfig {
    /// Server base URL
    #[validate(url)]
    pub server_url: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Worker count for bulk operations
    #[validate(range(min = 1, max = 64))]
    #[serde(default = "default_thread_count")]
    pub thread_count: usize,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_thread_count() -> usize {
    DEFAULT_THREAD_COUNT
}

const fn default_tls_verify() -> bool {
    true
}

impl ConnectionConfig {
    /// Create a new connection configuration with required parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or validation fails.
    pub fn new(server_url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            server_url: server_url.into(),
            request_timeout_secs: default_request_timeout_secs(),
            thread_count: default_thread_count(),
            tls_verify: default_tls_verify(),
        };

        config.check()?;
        Ok(config)
    }

    /// Run field validation, reporting failures as configuration errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing every invalid field.
    pub fn check(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set the bulk operation worker count.
    #[must_use]
    pub const fn with_thread_count(mut self, count: usize) -> Self {
        self.thread_count = count;
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse the server URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_server_url(&self) -> Result<Url, Error> {
        Url::parse(&self.server_url)
            .map_err(|e| Error::ConfigError(format!("Invalid server URL: {e}")))
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:4000".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
            thread_count: default_thread_count(),
            tls_verify: default_tls_verify(),
        }
    }
}
