//! Connection abstraction and the reqwest-backed implementation.
//!
//! Resource clients talk to the server exclusively through the [`Connection`]
//! trait so that tests can substitute a mock and callers can wrap the
//! transport with their own signing or retry layers.

use crate::client::ClientConfig;
use crate::config::ConnectionConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("ridley-core/", env!("CARGO_PKG_VERSION"));

/// Transport used by resource clients.
///
/// Every method returns the JSON-decoded response body. Implementations map
/// HTTP 404 to [`Error::NotFound`] and HTTP 409 to [`Error::Conflict`]; all
/// other failures are reported without further interpretation.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait Connection: Send + Sync {
    /// Issue a GET request.
    async fn get(&self, path: &str) -> Result<Value>;

    /// Issue a POST request with a JSON body.
    async fn post(&self, path: &str, body: &Value) -> Result<Value>;

    /// Issue a PUT request with a JSON body.
    async fn put(&self, path: &str, body: &Value) -> Result<Value>;

    /// Issue a DELETE request.
    async fn delete(&self, path: &str) -> Result<Value>;

    /// Worker pool size for bulk operations.
    fn thread_count(&self) -> usize;
}

/// Builder for [`HttpConnection`].
#[derive(Debug, Clone)]
pub struct HttpConnectionBuilder {
    base_url: Url,
    http_config: ClientConfig,
    tls_verify: bool,
}

impl HttpConnectionBuilder {
    /// Create a builder for the specified base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the URL cannot be parsed.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidEndpoint(format!(
                "{base_url} cannot be used as a base URL"
            )));
        }

        Ok(Self {
            base_url,
            http_config: ClientConfig::new(),
            tls_verify: true,
        })
    }

    /// Create a builder from a validated [`ConnectionConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn from_config(config: &ConnectionConfig) -> Result<Self> {
        config.check()?;
        let base_url = config.parse_server_url()?;
        let http_config = ClientConfig::new()
            .with_timeout(config.timeout())
            .with_thread_count(config.thread_count);

        Ok(Self {
            base_url,
            http_config,
            tls_verify: config.tls_verify,
        })
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Set the bulk operation worker count.
    #[must_use]
    pub fn with_thread_count(mut self, count: usize) -> Self {
        self.http_config = self.http_config.with_thread_count(count);
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Build the connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<HttpConnection> {
        let config = self.http_config;
        let mut builder = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .gzip(config.enable_compression);

        if !self.tls_verify {
            warn!(url = %self.base_url, "TLS verification disabled for connection");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(HttpConnection {
            http,
            base_url: self.base_url,
            thread_count: config.thread_count,
            enable_logging: config.enable_logging,
        })
    }
}

/// Asynchronous HTTP connection to a configuration-management server.
#[derive(Clone)]
pub struct HttpConnection {
    http: Client,
    base_url: Url,
    thread_count: usize,
    enable_logging: bool,
}

impl fmt::Debug for HttpConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConnection")
            .field("base_url", &self.base_url.as_str())
            .field("thread_count", &self.thread_count)
            .finish_non_exhaustive()
    }
}

impl HttpConnection {
    /// Construct a connection directly from the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the client cannot be built.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        HttpConnectionBuilder::new(base_url)?.build()
    }

    /// Construct a connection from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &ConnectionConfig) -> Result<Self> {
        HttpConnectionBuilder::from_config(config)?.build()
    }

    /// Start a builder for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn builder(base_url: impl AsRef<str>) -> Result<HttpConnectionBuilder> {
        HttpConnectionBuilder::new(base_url)
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                Error::InvalidEndpoint(format!("{} cannot be used as a base URL", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|segment| !segment.is_empty()));
        }
        Ok(url)
    }

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = self.build_url(path)?;
        let mut request = self
            .http
            .request(method.clone(), url)
            .header("Accept", "application/json");

        if let Some(payload) = body {
            request = request.json(payload);
        }

        if self.enable_logging {
            info!(%method, path, "Sending request");
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let err = map_status_to_error(status, text);
            debug!(%method, path, %status, code = err.error_code(), "Request failed");
            return Err(err);
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|err| {
            Error::ParseError(format!("Failed to parse response for `{path}`: {err}"))
        })
    }
}

#[async_trait]
impl Connection for HttpConnection {
    async fn get(&self, path: &str) -> Result<Value> {
        self.send(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.send(Method::PUT, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Value> {
        self.send(Method::DELETE, path, None).await
    }

    fn thread_count(&self) -> usize {
        self.thread_count
    }
}

fn map_status_to_error(status: StatusCode, text: String) -> Error {
    match status {
        StatusCode::NOT_FOUND => Error::NotFound(text),
        StatusCode::CONFLICT => Error::Conflict(text),
        StatusCode::BAD_REQUEST => Error::BadRequest(text),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::InvalidRequest(format!("authentication failed: {text}"))
        }
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => {
            Error::ServiceUnavailable(format!("server temporarily unavailable: {text}"))
        }
        status if status.is_server_error() => {
            Error::ServiceUnavailable(format!("server error {status}: {text}"))
        }
        _ => Error::HttpError(format!("server error {status}: {text}")),
    }
}
