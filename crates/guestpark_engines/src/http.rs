#![forbid(unsafe_code)]

use std::env;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::schema::{self, SchemaMismatch, Shape};

pub const DEFAULT_API_BASE_URL: &str = "https://api.parkingboss.com/v1";
pub const DEFAULT_HTTP_TIMEOUT_MS: u32 = 15_000;
const HTTP_TIMEOUT_MS_RANGE: std::ops::RangeInclusive<u32> = 100..=120_000;
const DEFAULT_USER_AGENT: &str = concat!("guestpark/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("transport failure ({kind})")]
pub struct TransportError {
    pub kind: &'static str,
}

impl TransportError {
    pub const fn new(kind: &'static str) -> Self {
        Self { kind }
    }
}

/// One outbound HTTP exchange. Non-2xx statuses are replies, not errors.
pub trait HttpTransport: Send + Sync {
    fn send(&self, method: HttpMethod, url: &Url) -> Result<HttpReply, TransportError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn send(&self, method: HttpMethod, url: &Url) -> Result<HttpReply, TransportError> {
        (**self).send(method, url)
    }
}

/// Failures of a single upstream call. `endpoint` is the URL path only; query
/// strings carry credentials and are never rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("network failure calling {endpoint}: {kind}")]
    Network { endpoint: String, kind: &'static str },
    #[error("{endpoint} answered with http status {status}")]
    HttpStatus { endpoint: String, status: u16 },
    #[error("{endpoint} response rejected: {mismatch}")]
    Schema {
        endpoint: String,
        #[source]
        mismatch: SchemaMismatch,
    },
}

impl UpstreamError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::HttpStatus { .. } => "http_status",
            Self::Schema { .. } => "schema_mismatch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub timeout_ms: u32,
    pub user_agent: String,
    pub proxy_url: Option<String>,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy_url: None,
        }
    }
}

impl UpstreamSettings {
    pub fn from_env() -> Self {
        Self::from_env_var_map(|key| env::var(key).ok())
    }

    pub fn from_env_var_map<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            base_url: get("GUESTPARK_API_BASE_URL")
                .and_then(trim_non_empty)
                .unwrap_or(defaults.base_url),
            timeout_ms: get("GUESTPARK_HTTP_TIMEOUT_MS")
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|v| HTTP_TIMEOUT_MS_RANGE.contains(v))
                .unwrap_or(defaults.timeout_ms),
            user_agent: get("GUESTPARK_USER_AGENT")
                .and_then(trim_non_empty)
                .unwrap_or(defaults.user_agent),
            proxy_url: get("GUESTPARK_PROXY_URL").and_then(trim_non_empty),
        }
    }
}

fn trim_non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(settings: &UpstreamSettings) -> Result<Self, String> {
        Ok(Self {
            agent: build_http_agent(settings)?,
        })
    }
}

impl HttpTransport for UreqTransport {
    fn send(&self, method: HttpMethod, url: &Url) -> Result<HttpReply, TransportError> {
        let response = match self.agent.request_url(method.as_str(), url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => {
                return Err(transport_error_from_ureq(&transport));
            }
        };
        let status = response.status();
        let body = response
            .into_string()
            .map_err(|_| TransportError::new("body_read"))?;
        Ok(HttpReply { status, body })
    }
}

fn build_http_agent(settings: &UpstreamSettings) -> Result<ureq::Agent, String> {
    if settings.timeout_ms == 0 {
        return Err("timeout must be > 0".to_string());
    }
    let timeout = Duration::from_millis(u64::from(settings.timeout_ms).max(100));
    let mut builder = ureq::AgentBuilder::new()
        .timeout_connect(timeout)
        .timeout_read(timeout)
        .timeout_write(timeout)
        .user_agent(&settings.user_agent)
        .try_proxy_from_env(false);
    if let Some(proxy_url) = settings.proxy_url.as_deref() {
        let proxy = ureq::Proxy::new(proxy_url).map_err(|_| "invalid proxy url".to_string())?;
        builder = builder.proxy(proxy);
    }
    Ok(builder.build())
}

fn transport_error_from_ureq(transport: &ureq::Transport) -> TransportError {
    let combined = format!("{:?} {}", transport.kind(), transport);
    TransportError::new(classify_transport_error_kind(&combined))
}

fn classify_transport_error_kind(raw: &str) -> &'static str {
    let lower = raw.to_ascii_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        "timeout"
    } else if lower.contains("tls") || lower.contains("ssl") {
        "tls"
    } else if lower.contains("dns") {
        "dns"
    } else if lower.contains("connection") || lower.contains("connect") {
        "connection"
    } else {
        "transport"
    }
}

/// Single-call client: send, check status, decode, validate. No retries.
#[derive(Debug, Clone)]
pub struct RequestClient<T> {
    transport: T,
}

impl<T: HttpTransport> RequestClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn get<R: DeserializeOwned>(
        &self,
        url: &Url,
        shape: Option<&Shape>,
    ) -> Result<R, UpstreamError> {
        self.request_json(HttpMethod::Get, url, shape)
    }

    pub fn post<R: DeserializeOwned>(
        &self,
        url: &Url,
        shape: Option<&Shape>,
    ) -> Result<R, UpstreamError> {
        self.request_json(HttpMethod::Post, url, shape)
    }

    /// Acknowledgment-only call: success is a 2xx status, the body is never parsed.
    pub fn put(&self, url: &Url) -> Result<(), UpstreamError> {
        self.exchange(HttpMethod::Put, url).map(|_| ())
    }

    fn request_json<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        url: &Url,
        shape: Option<&Shape>,
    ) -> Result<R, UpstreamError> {
        let reply = self.exchange(method, url)?;
        let endpoint = url.path();
        let payload: Value =
            serde_json::from_str(&reply.body).map_err(|_| UpstreamError::Schema {
                endpoint: endpoint.to_string(),
                mismatch: SchemaMismatch {
                    path: "$".to_string(),
                    expected: "json document".to_string(),
                    found: "undecodable body",
                },
            })?;
        if let Some(shape) = shape {
            schema::validate(&payload, shape).map_err(|mismatch| UpstreamError::Schema {
                endpoint: endpoint.to_string(),
                mismatch,
            })?;
        }
        // Decode from the raw body so upstream key order survives.
        serde_json::from_str(&reply.body).map_err(|_| UpstreamError::Schema {
            endpoint: endpoint.to_string(),
            mismatch: SchemaMismatch {
                path: "$".to_string(),
                expected: "document matching the response type".to_string(),
                found: "incompatible structure",
            },
        })
    }

    fn exchange(&self, method: HttpMethod, url: &Url) -> Result<HttpReply, UpstreamError> {
        let endpoint = url.path();
        let reply = self
            .transport
            .send(method, url)
            .map_err(|err| UpstreamError::Network {
                endpoint: endpoint.to_string(),
                kind: err.kind,
            })?;
        debug!(
            method = method.as_str(),
            endpoint,
            status = reply.status,
            "upstream call completed"
        );
        if !reply.is_success() {
            return Err(UpstreamError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: reply.status,
            });
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::required;
    use crate::test_support::MockTransport;
    use std::collections::HashMap;

    #[derive(Debug, serde::Deserialize)]
    struct TokenBody {
        subject: String,
    }

    fn token_shape() -> Shape {
        Shape::object([required("subject", Shape::String), required("token", Shape::String)])
    }

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://api.test{path}?password=hunter2")).unwrap()
    }

    #[test]
    fn at_http_01_decodes_validated_body() {
        let transport =
            MockTransport::new().reply(HttpMethod::Post, "/v1/t", 200, r#"{"subject":"s","token":"t"}"#);
        let client = RequestClient::new(&transport);
        let out: TokenBody = client.post(&url("/v1/t"), Some(&token_shape())).unwrap();
        assert_eq!(out.subject, "s");
    }

    #[test]
    fn at_http_02_non_2xx_fails_with_status_before_parsing() {
        let transport = MockTransport::new().reply(HttpMethod::Get, "/v1/t", 503, "<html>down</html>");
        let client = RequestClient::new(&transport);
        let err = client
            .get::<Value>(&url("/v1/t"), Some(&token_shape()))
            .unwrap_err();
        assert_eq!(
            err,
            UpstreamError::HttpStatus {
                endpoint: "/v1/t".to_string(),
                status: 503
            }
        );
    }

    #[test]
    fn at_http_03_shape_violation_is_schema_error() {
        let transport = MockTransport::new().reply(HttpMethod::Post, "/v1/t", 200, r#"{"subject":"s"}"#);
        let client = RequestClient::new(&transport);
        let err = client
            .post::<Value>(&url("/v1/t"), Some(&token_shape()))
            .unwrap_err();
        match err {
            UpstreamError::Schema { mismatch, .. } => assert_eq!(mismatch.path, "token"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn at_http_04_put_ignores_body_and_checks_status() {
        let transport = MockTransport::new()
            .reply(HttpMethod::Put, "/v1/ok", 204, "not json at all")
            .reply(HttpMethod::Put, "/v1/gone", 404, "");
        let client = RequestClient::new(&transport);
        assert_eq!(client.put(&url("/v1/ok")), Ok(()));
        assert!(matches!(
            client.put(&url("/v1/gone")),
            Err(UpstreamError::HttpStatus { status: 404, .. })
        ));
    }

    #[test]
    fn at_http_05_transport_failure_is_network_error_without_query() {
        let transport = MockTransport::new().fail(HttpMethod::Get, "/v1/t", "timeout");
        let client = RequestClient::new(&transport);
        let err = client.get::<Value>(&url("/v1/t"), None).unwrap_err();
        assert_eq!(err.kind(), "network");
        assert!(!err.to_string().contains("hunter2"));
    }

    #[test]
    fn at_http_06_undecodable_body_is_schema_error_at_root() {
        let transport = MockTransport::new().reply(HttpMethod::Get, "/v1/t", 200, "{not json");
        let client = RequestClient::new(&transport);
        match client.get::<Value>(&url("/v1/t"), None).unwrap_err() {
            UpstreamError::Schema { mismatch, .. } => assert_eq!(mismatch.path, "$"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn at_http_07_settings_from_env_map_apply_bounds_and_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GUESTPARK_API_BASE_URL", " https://staging.example/v1 "),
            ("GUESTPARK_HTTP_TIMEOUT_MS", "5"),
            ("GUESTPARK_PROXY_URL", ""),
        ]);
        let settings = UpstreamSettings::from_env_var_map(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(settings.base_url, "https://staging.example/v1");
        assert_eq!(settings.timeout_ms, DEFAULT_HTTP_TIMEOUT_MS);
        assert_eq!(settings.proxy_url, None);
    }

    #[test]
    fn at_http_08_transport_error_classification() {
        assert_eq!(classify_transport_error_kind("Io connection timed out"), "timeout");
        assert_eq!(classify_transport_error_kind("Dns failed to lookup"), "dns");
        assert_eq!(classify_transport_error_kind("ConnectionFailed refused"), "connection");
        assert_eq!(classify_transport_error_kind("InvalidUrl"), "transport");
    }
}
