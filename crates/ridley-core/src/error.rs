//! Error types for Ridley operations.
//!
//! This module provides the single error type shared by the resource layer and
//! the connector selector, along with conversions from transport errors.

use std::io;
use thiserror::Error;
use validator::ValidationErrors;

/// Main error type for Ridley operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The remote has no resource at the resolved identity
    #[error("Not found: {0}")]
    NotFound(String),

    /// The remote rejected a write because the identity already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Local validation failed before any request was sent
    #[error("Invalid resource: {0}")]
    InvalidResource(ValidationErrors),

    /// None of the probed connector ports answered
    #[error("Unknown connector for host {host}")]
    UnknownConnector {
        /// Host that was probed
        host: String,
    },

    /// Socket level failure other than a refused or unreachable connection
    #[error("I/O error ({kind:?}): {message}")]
    Io {
        /// Kind reported by the operating system
        kind: io::ErrorKind,
        /// Error message
        message: String,
    },

    /// Remote service is unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Operation timed out
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Bad request with details
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Failed to parse a response body
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Specialized result type for Ridley operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::InvalidResource(_) => "INVALID_RESOURCE",
            Self::UnknownConnector { .. } => "UNKNOWN_CONNECTOR",
            Self::Io { .. } => "IO_ERROR",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::ParseError(_) => "PARSE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(self, Self::InternalError(_) | Self::ConfigError(_))
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<ValidationErrors> for Error {
    fn from(err: ValidationErrors) -> Self {
        Self::InvalidResource(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
