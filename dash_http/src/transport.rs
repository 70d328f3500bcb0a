use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use reqwest::ClientBuilder;

use crate::errors::HttpError;
use crate::errors::Result;
use crate::request::TransportRequest;

/// Status and undecoded body of a successful response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, body: body.into() }
    }
}

pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<RawResponse>> + Send + 'a>>;

/// Primitive that performs one HTTP exchange
///
/// Implementations return [`HttpError::Status`] for non-2xx responses and
/// never retry on their own.
pub trait Transport: Send + Sync {
    fn send(&self, request: TransportRequest) -> TransportFuture<'_>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
        (**self).send(request)
    }
}

/// Configuration for the reqwest transport.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum idle connections per host (default: 16)
    pub pool_max_idle_per_host: usize,

    /// Idle timeout for connections (default: 90s)
    pub pool_idle_timeout: Duration,

    /// Connection establishment timeout (default: 10s)
    pub connect_timeout: Duration,

    /// Ceiling for a whole request; per-call timeouts may be shorter (default: 300s)
    pub request_timeout: Duration,

    /// TCP keepalive interval (default: 60s)
    pub tcp_keepalive: Duration,

    /// Enable TCP_NODELAY (default: true)
    pub tcp_nodelay: bool,

    /// Keep session cookies between calls (default: true)
    pub cookie_store: bool,

    /// Enable Hickory DNS for async resolution (default: true)
    pub hickory_dns: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 16,
            pool_idle_timeout: Duration::from_secs(90),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_millis(300_000),
            tcp_keepalive: Duration::from_secs(60),
            tcp_nodelay: true,
            cookie_store: true,
            hickory_dns: true,
        }
    }
}

/// [`Transport`] backed by a pooled reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    config: HttpClientConfig,
}

impl ReqwestTransport {
    /// Create a transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a transport with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            // Connection pooling
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            // TCP optimization
            .tcp_nodelay(config.tcp_nodelay)
            .tcp_keepalive(Some(config.tcp_keepalive))
            // Timeouts
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            // TLS with rustls
            .use_rustls_tls()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            // Session credentials
            .cookie_store(config.cookie_store)
            // Compression
            .gzip(true)
            .brotli(true)
            .hickory_dns(config.hickory_dns)
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the transport configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    async fn exchange(&self, request: TransportRequest) -> Result<RawResponse> {
        let mut builder = self.client.request(request.method.into(), &request.url).timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| timeout_or(err, request.timeout))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|err| timeout_or(err, request.timeout))?;

        if !status.is_success() {
            return Err(HttpError::Status { status: status.as_u16(), body: String::from_utf8_lossy(&body).into_owned() });
        }

        Ok(RawResponse { status: status.as_u16(), body })
    }
}

fn timeout_or(err: reqwest::Error, timeout: Duration) -> HttpError {
    if err.is_timeout() { HttpError::Timeout(timeout) } else { HttpError::RequestFailed(err) }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
        Box::pin(self.exchange(request))
    }
}
