//! # dash_http
//!
//! Typed access to the dashboard REST backend: circuit breaker, retry with
//! exponential backoff, schema validation and a [`RemoteClient`] that returns
//! [`dash_types::ApiResult`] for every call.

pub mod circuit_breaker;
pub mod client;
pub mod config;
pub mod errors;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod request;
pub mod retry;
pub mod schema;
pub mod transport;

pub use circuit_breaker::CircuitBreaker;
pub use circuit_breaker::CircuitBreakerConfig;
pub use circuit_breaker::CircuitState;
pub use client::AntiForgerySource;
pub use client::RemoteClient;
pub use config::RemoteClientConfig;
pub use errors::HttpError;
pub use errors::RequestError;
pub use errors::Result;
pub use request::Method;
pub use request::Request;
pub use request::TransportRequest;
pub use retry::RetryConfig;
pub use retry::with_retry;
pub use schema::Schema;
pub use schema::SchemaError;
pub use transport::HttpClientConfig;
pub use transport::RawResponse;
pub use transport::ReqwestTransport;
pub use transport::Transport;
