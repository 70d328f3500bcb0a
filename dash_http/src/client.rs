use std::sync::Arc;

use dash_types::ApiError;
use dash_types::ApiResult;
use parking_lot::RwLock;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use url::Url;

use crate::circuit_breaker::CircuitBreaker;
use crate::config::RemoteClientConfig;
use crate::errors::HttpError;
use crate::errors::Result;
use crate::request::Method;
use crate::request::Request;
use crate::request::TransportRequest;
use crate::retry::with_retry;
use crate::schema;
use crate::schema::Schema;
use crate::transport::HttpClientConfig;
use crate::transport::RawResponse;
use crate::transport::ReqwestTransport;
use crate::transport::Transport;

/// Supplies the anti-forgery token attached to every call
pub trait AntiForgerySource: Send + Sync {
    fn token(&self) -> Option<String>;
}

impl<F> AntiForgerySource for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self()
    }
}

#[derive(Debug, Clone)]
struct Settings {
    base_url: Url,
    token: Option<String>,
    headers: Vec<(String, String)>,
}

/// Single point of outbound access to one backend
///
/// Every call goes through the circuit breaker, then retry with backoff, then
/// the transport. Successful payloads are validated against the caller's
/// [`Schema`]; all failures come back as [`ApiError`].
pub struct RemoteClient<T: Transport = ReqwestTransport> {
    transport: T,
    config: RemoteClientConfig,
    breaker: CircuitBreaker,
    settings: RwLock<Settings>,
    anti_forgery: Option<Arc<dyn AntiForgerySource>>,
}

impl RemoteClient<ReqwestTransport> {
    /// Client over reqwest configured from the environment
    pub fn from_env() -> Result<Self> {
        Self::new(RemoteClientConfig::from_env())
    }

    /// Client over reqwest with the given configuration
    pub fn new(config: RemoteClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::with_config(HttpClientConfig { request_timeout: config.timeout, ..Default::default() })?;
        Self::with_transport(transport, config)
    }
}

impl<T: Transport> RemoteClient<T> {
    pub fn with_transport(transport: T, config: RemoteClientConfig) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;
        HeaderName::from_bytes(config.anti_forgery_header.as_bytes())
            .map_err(|err| HttpError::InvalidHeader { name: config.anti_forgery_header.clone(), reason: err.to_string() })?;
        let breaker = CircuitBreaker::with_config(config.breaker.clone());

        tracing::debug!(
            base_url = %base_url,
            retries = config.retry.retries,
            timeout_ms = config.timeout.as_millis() as u64,
            "Remote client created"
        );

        Ok(Self {
            transport,
            breaker,
            settings: RwLock::new(Settings { base_url, token: None, headers: Vec::new() }),
            anti_forgery: None,
            config,
        })
    }

    /// Attach an anti-forgery token source
    pub fn with_anti_forgery(mut self, source: impl AntiForgerySource + 'static) -> Self {
        self.anti_forgery = Some(Arc::new(source));
        self
    }

    pub async fn get<M: Schema>(&self, request: Request) -> ApiResult<M> {
        self.send(Method::Get, request).await
    }

    pub async fn post<M: Schema>(&self, request: Request) -> ApiResult<M> {
        self.send(Method::Post, request).await
    }

    pub async fn patch<M: Schema>(&self, request: Request) -> ApiResult<M> {
        self.send(Method::Patch, request).await
    }

    pub async fn delete<M: Schema>(&self, request: Request) -> ApiResult<M> {
        self.send(Method::Delete, request).await
    }

    /// Change the backend root for subsequent calls
    pub fn set_base_url(&self, url: &str) -> Result<()> {
        let base_url = parse_base_url(url)?;
        self.settings.write().base_url = base_url;
        Ok(())
    }

    /// Send `Authorization: Bearer <token>` on subsequent calls
    pub fn set_token(&self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        check_header("Authorization", &format!("Bearer {token}"))?;
        self.settings.write().token = Some(token);
        Ok(())
    }

    pub fn clear_token(&self) {
        self.settings.write().token = None;
    }

    /// Add or replace a header sent on subsequent calls
    pub fn set_header(&self, name: &str, value: &str) -> Result<()> {
        check_header(name, value)?;

        let mut settings = self.settings.write();
        settings.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        settings.headers.push((name.to_string(), value.to_string()));
        Ok(())
    }

    pub fn base_url(&self) -> Url {
        self.settings.read().base_url.clone()
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn config(&self) -> &RemoteClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn send<M: Schema>(&self, method: Method, request: Request) -> ApiResult<M> {
        let request = self.prepare(method, request).map_err(|err| {
            tracing::error!(%method, error = %err, "Failed to build request");
            ApiError::from(err)
        })?;
        let url = request.url.clone();

        let outcome = self.breaker.execute(|| with_retry(&self.config.retry, || self.attempt(request.clone()))).await;

        let response = match outcome {
            Ok(response) => response,
            Err(err) if err.is_circuit_open() => {
                tracing::warn!(%method, %url, "Call rejected, circuit breaker open");
                return Err(err.into());
            }
            Err(err) => {
                tracing::warn!(%method, %url, status = err.status(), error = %err, "Call failed");
                return Err(err.into());
            }
        };

        schema::parse::<M>(&response.body).map_err(|err| {
            tracing::warn!(%method, %url, path = %err.path, error = %err.message, "Response does not match schema");
            ApiError::serialization(err.to_string())
        })
    }

    async fn attempt(&self, request: TransportRequest) -> Result<RawResponse> {
        let timeout = request.timeout;
        match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(HttpError::Timeout(timeout)),
        }
    }

    fn prepare(&self, method: Method, request: Request) -> Result<TransportRequest> {
        let settings = self.settings.read().clone();
        let url = resolve_url(&settings.base_url, &request.url, &request.segments)?;

        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];

        if let Some(token) = self.anti_forgery.as_ref().and_then(|source| source.token()) {
            check_header(&self.config.anti_forgery_header, &token)?;
            headers.push((self.config.anti_forgery_header.clone(), token));
        }

        if let Some(token) = settings.token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        for (name, value) in settings.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
            headers.push((name, value));
        }

        Ok(TransportRequest { method, url, headers, query: request.params, body: request.body, timeout: self.config.timeout })
    }
}

fn parse_base_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|err| HttpError::InvalidUrl(format!("{url}: {err}")))?;
    if parsed.cannot_be_a_base() {
        return Err(HttpError::InvalidUrl(format!("{url}: cannot be a base")));
    }
    Ok(parsed)
}

/// Rejects header names and values reqwest would refuse to send
fn check_header(name: &str, value: &str) -> Result<()> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|err| HttpError::InvalidHeader { name: name.to_string(), reason: err.to_string() })?;
    HeaderValue::from_str(value).map_err(|err| HttpError::InvalidHeader { name: name.to_string(), reason: err.to_string() })?;
    Ok(())
}

/// Absolute URLs pass through; relative ones are appended to the base path
fn resolve_url(base: &Url, path: &str, segments: &[String]) -> Result<String> {
    let mut url = match Url::parse(path) {
        Ok(absolute) => absolute,
        Err(_) => {
            let joined = format!("{}/{}", base.as_str().trim_end_matches('/'), path.trim_start_matches('/'));
            Url::parse(&joined).map_err(|err| HttpError::InvalidUrl(format!("{path}: {err}")))?
        }
    };

    if !segments.is_empty() {
        url.path_segments_mut()
            .map_err(|_| HttpError::InvalidUrl(format!("{path}: cannot be a base")))?
            .pop_if_empty()
            .extend(segments);
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use dash_types::ErrorCode;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::circuit_breaker::CircuitBreakerConfig;
    use crate::circuit_breaker::CircuitState;
    use crate::mock::MockReply;
    use crate::mock::MockTransport;
    use crate::retry::RetryConfig;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Ping {
        ok: bool,
    }

    impl Schema for Ping {}

    fn config() -> RemoteClientConfig {
        RemoteClientConfig {
            base_url: "http://backend.test/api".to_string(),
            retry: RetryConfig { retries: 3, base_delay: Duration::from_millis(10) },
            timeout: Duration::from_secs(5),
            breaker: CircuitBreakerConfig {
                failure_threshold: 2,
                failure_window: Duration::from_secs(10),
                cooldown: Duration::from_secs(15),
            },
            ..Default::default()
        }
    }

    fn client() -> RemoteClient<MockTransport> {
        RemoteClient::with_transport(MockTransport::new(), config()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_success() {
        let client = client();
        client.transport().push_json(json!({"ok": true}));

        let ping: Ping = client.get(Request::new("/ping").param("verbose", true)).await.unwrap();
        assert_eq!(ping, Ping { ok: true });

        let sent = client.transport().last_request().unwrap();
        assert_eq!(sent.method, Method::Get);
        assert_eq!(sent.url, "http://backend.test/api/ping");
        assert_eq!(sent.query, vec![("verbose".to_string(), "true".to_string())]);
        assert_eq!(sent.timeout, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_schema_mismatch_is_serialization_without_retry() {
        let client = client();
        client.transport().push_json(json!({"ok": "yes"}));

        let err = client.get::<Ping>(Request::new("/ping")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::Serialization);
        assert_eq!(client.transport().calls(), 1);
        assert_eq!(client.circuit_breaker().stats().failure_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_mapped_after_retries() {
        let client = client();
        client.transport().always(MockReply::Status(404, "missing".into()));

        let err = client.get::<Ping>(Request::new("/ping")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.status, Some(404));
        assert_eq!(client.transport().calls(), 3);
        assert_eq!(client.circuit_breaker().stats().failure_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers() {
        let client = client();
        client.transport().push_status(503).push(MockReply::Network("reset".into())).push_json(json!({"ok": true}));

        let ping: Ping = client.get(Request::new("/ping")).await.unwrap();

        assert!(ping.ok);
        assert_eq!(client.transport().calls(), 3);
        assert_eq!(client.circuit_breaker().stats().failure_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_circuit_fails_fast() {
        let client = client();
        client.transport().always(MockReply::Status(500, String::new()));

        for _ in 0..2 {
            let err = client.get::<Ping>(Request::new("/ping")).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::UnknownError);
        }
        assert_eq!(client.circuit_breaker().current_state(), CircuitState::Open);
        let calls = client.transport().calls();

        let err = client.get::<Ping>(Request::new("/ping")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownError);
        assert_eq!(err.message, "Circuit breaker open");
        assert_eq!(client.transport().calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_timeout() {
        let config = RemoteClientConfig { timeout: Duration::from_millis(50), retry: RetryConfig::none(), ..config() };
        let client = RemoteClient::with_transport(SlowTransport, config).unwrap();

        let err = client.get::<Ping>(Request::new("/slow")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownError);
        assert!(err.message.contains("Timeout"), "{}", err.message);
    }

    #[tokio::test(start_paused = true)]
    async fn test_security_headers() {
        let client = client().with_anti_forgery(|| Some("csrf-123".to_string()));
        client.set_token("secret").unwrap();
        client.set_header("X-Tenant", "acme").unwrap();
        client.transport().push_json(json!({"ok": true}));

        client.post::<Ping>(Request::new("coupons").body(&json!({"code": "X"})).unwrap()).await.unwrap();

        let sent = client.transport().last_request().unwrap();
        assert_eq!(sent.method, Method::Post);
        assert_eq!(sent.url, "http://backend.test/api/coupons");
        assert_eq!(sent.header("x-xsrf-token"), Some("csrf-123"));
        assert_eq!(sent.header("authorization"), Some("Bearer secret"));
        assert_eq!(sent.header("x-tenant"), Some("acme"));
        assert_eq!(sent.body, Some(json!({"code": "X"})));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfiguration_applies_to_later_calls() {
        let client = client();
        client.transport().always(MockReply::json(&json!({"ok": true})));

        client.get::<Ping>(Request::new("/ping")).await.unwrap();
        assert_eq!(client.transport().last_request().unwrap().header("authorization"), None);

        client.set_base_url("https://other.test/v2/").unwrap();
        client.set_token("t1").unwrap();
        client.get::<Ping>(Request::new("/ping")).await.unwrap();

        let sent = client.transport().last_request().unwrap();
        assert_eq!(sent.url, "https://other.test/v2/ping");
        assert_eq!(sent.header("authorization"), Some("Bearer t1"));

        client.clear_token();
        client.set_header("X-Tenant", "a").unwrap();
        client.set_header("x-tenant", "b").unwrap();
        client.get::<Ping>(Request::new("/ping")).await.unwrap();

        let sent = client.transport().last_request().unwrap();
        assert_eq!(sent.header("authorization"), None);
        assert_eq!(sent.headers.iter().filter(|(name, _)| name.eq_ignore_ascii_case("x-tenant")).count(), 1);
        assert_eq!(sent.header("x-tenant"), Some("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_with_empty_body() {
        let client = client();
        client.transport().push(MockReply::Body(204, bytes::Bytes::new()));

        let result: ApiResult<()> = client.delete(Request::new("/coupons/1")).await;
        assert!(result.is_ok());
        assert_eq!(client.transport().last_request().unwrap().method, Method::Delete);
    }

    #[tokio::test(start_paused = true)]
    async fn test_patch_absolute_url() {
        let client = client();
        client.transport().push_json(json!({"ok": false}));

        let ping: Ping = client.patch(Request::new("https://elsewhere.test/ping")).await.unwrap();
        assert!(!ping.ok);
        assert_eq!(client.transport().last_request().unwrap().url, "https://elsewhere.test/ping");
    }

    #[test]
    fn test_invalid_configuration() {
        let bad = RemoteClientConfig { base_url: "not a url".to_string(), ..Default::default() };
        assert!(matches!(RemoteClient::with_transport(MockTransport::new(), bad), Err(HttpError::InvalidUrl(_))));

        let client = client();
        assert!(client.set_base_url("mailto:someone@example.com").is_err());
        assert!(matches!(client.set_header("bad header", "x"), Err(HttpError::InvalidHeader { .. })));
        assert!(client.set_header("X-Ok", "line\nbreak").is_err());
        assert_eq!(client.base_url().as_str(), "http://backend.test/api");
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_token_rejected_before_transport() {
        let client = client();
        client.transport().always(MockReply::json(&json!({"ok": true})));

        assert!(matches!(client.set_token("abc\ndef"), Err(HttpError::InvalidHeader { .. })));
        client.get::<Ping>(Request::new("/ping")).await.unwrap();
        assert_eq!(client.transport().last_request().unwrap().header("authorization"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_anti_forgery_token_skips_breaker() {
        let client = client().with_anti_forgery(|| Some("csrf\r\n".to_string()));
        client.transport().always(MockReply::json(&json!({"ok": true})));

        for _ in 0..3 {
            let err = client.get::<Ping>(Request::new("/ping")).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::UnknownError);
            assert!(err.message.contains("X-XSRF-TOKEN"), "{}", err.message);
        }

        assert_eq!(client.transport().calls(), 0);
        assert_eq!(client.circuit_breaker().stats().failure_count, 0);
        assert_eq!(client.circuit_breaker().current_state(), CircuitState::Closed);
    }

    #[test]
    fn test_bad_anti_forgery_header_name() {
        let bad = RemoteClientConfig { anti_forgery_header: "X XSRF".to_string(), ..config() };
        let err = RemoteClient::with_transport(MockTransport::new(), bad).err().unwrap();
        assert!(matches!(err, HttpError::InvalidHeader { ref name, .. } if name == "X XSRF"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_segments_are_encoded() {
        let client = client();
        client.transport().always(MockReply::Body(204, bytes::Bytes::new()));

        client.delete::<()>(Request::new("/coupons/").segment("a/b?c#d").segment("role")).await.unwrap();
        assert_eq!(client.transport().last_request().unwrap().url, "http://backend.test/api/coupons/a%2Fb%3Fc%23d/role");

        client.get::<()>(Request::new("https://elsewhere.test/users").segment(42)).await.unwrap();
        assert_eq!(client.transport().last_request().unwrap().url, "https://elsewhere.test/users/42");
    }

    struct SlowTransport;

    impl Transport for SlowTransport {
        fn send(&self, _request: TransportRequest) -> crate::transport::TransportFuture<'_> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(RawResponse::new(200, "{}"))
            })
        }
    }
}
