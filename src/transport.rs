//! Wire types and the HTTP transport.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;

pub use reqwest::Method;

/// An outgoing call, immutable once constructed except for its header set:
/// the authenticator only ever adds or overwrites the authorization header.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub headers: HeaderMap,
}

impl OutboundRequest {
    fn new(method: Method, path: impl Into<String>, body: Option<serde_json::Value>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            method,
            path: path.into(),
            body,
            headers,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path, None)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::POST, path, Some(body))
    }
}

/// Raw response as received from the wire.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network seam. The gateway only depends on this trait, so tests supply
/// scripted fakes without touching global state.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &OutboundRequest,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, TransportError>;
}

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Transport over HTTP with a bounded per-request wait.
///
/// A timeout resolves to [`TransportError::Timeout`] and is treated by the
/// gateway exactly like a connection failure; cancellation resolves to
/// [`TransportError::Cancelled`].
pub struct HttpTransport {
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn map_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(self.timeout.as_millis() as u64)
        } else {
            TransportError::Connect(error.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &OutboundRequest,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, TransportError> {
        let mut builder = shared_client()
            .request(request.method.clone(), self.url_for(&request.path))
            .headers(request.headers.clone())
            .timeout(self.timeout);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let round_trip = async {
            let response = builder.send().await.map_err(|err| self.map_error(err))?;
            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|err| self.map_error(err))?
                .to_vec();
            Ok(RawResponse { status, body })
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
            result = round_trip => result,
        }
    }
}
