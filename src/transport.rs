//! HTTP plumbing: URL joining, client configuration and the blocking GET.

use std::time::Duration;

use tracing::debug;

use crate::error::TransportError;

/// Default connect timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default read timeout (30 seconds), applied to the whole request.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Join a base URL and an endpoint path with exactly one separating slash.
///
/// Trailing slashes are trimmed from `base_url` and leading slashes stripped
/// from `path`, so `http://h/` + `/users` and `http://h` + `users` both give
/// `http://h/users`.
pub fn build_full_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Timeouts for the HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    /// Deadline for the whole exchange, from connecting until the body has
    /// been read. `reqwest` has no separate per-read timeout.
    pub read_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the total request deadline.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Blocking GET used by the orchestrator.
///
/// Any status counts as a completed exchange; only connection, timeout and
/// body-read failures are errors.
pub trait Transport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Build a client with the given timeouts.
    pub fn new(config: &HttpConfig) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .build()
            .map_err(|source| TransportError::Client { source })?;
        debug!(
            connect_ms = config.connect_timeout.as_millis() as u64,
            request_ms = config.read_timeout.as_millis() as u64,
            "HTTP client configured"
        );
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|source| TransportError::Request { source })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|source| TransportError::Body { source })?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_with_single_slash() {
        assert_eq!(
            build_full_url("https://api.example.com", "/users"),
            "https://api.example.com/users"
        );
        assert_eq!(
            build_full_url("https://api.example.com/", "users"),
            "https://api.example.com/users"
        );
        assert_eq!(
            build_full_url("https://api.example.com///", "///users/{id}"),
            "https://api.example.com/users/{id}"
        );
    }

    #[test]
    fn keeps_base_path_and_scheme() {
        assert_eq!(
            build_full_url("http://localhost:8080/api/v1/", "/items"),
            "http://localhost:8080/api/v1/items"
        );
    }

    #[test]
    fn root_path() {
        assert_eq!(build_full_url("http://h", "/"), "http://h/");
    }

    #[test]
    fn http_config_defaults_and_setters() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.read_timeout, Duration::from_secs(30));

        let config = config
            .connect_timeout(Duration::from_secs(1))
            .read_timeout(Duration::from_secs(2));
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.read_timeout, Duration::from_secs(2));
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let transport = HttpTransport::new(
            &HttpConfig::default().connect_timeout(Duration::from_secs(2)),
        )
        .unwrap();
        // Port 1 on loopback is not listening.
        let result = transport.get("http://127.0.0.1:1/users");
        assert!(matches!(result, Err(TransportError::Request { .. })));
    }
}
