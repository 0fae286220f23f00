//! HTTP transport for IDS7 requests.
//!
//! [`Transport`] is the seam between request shaping and the wire. The default
//! implementation, [`ReqwestTransport`], uses a blocking `reqwest` client;
//! [`RetryingTransport`] wraps any transport and re-sends requests that failed
//! before a response was received.
//!
//! Retries only cover connection-level failures. A response with any status
//! code is returned to the caller as-is, since the server has already made its
//! decision about the request.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Method, StatusCode};

use crate::error::{Ids7Error, Ids7Result, TransportError};

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(6050);

/// Default read/response timeout (60 seconds).
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// A fully shaped request, ready to be sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL, without the query string.
    pub url: String,
    /// API path relative to the base URL, as reported in errors.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    /// JSON body, if any.
    pub body: Option<Bytes>,
}

/// A received response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends requests and returns whatever response the server produced.
///
/// Implementations must not interpret the status code.
pub trait Transport: Send + Sync + std::fmt::Debug {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// [`Transport`] backed by `reqwest::blocking::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Build a transport with the given timeouts.
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Ids7Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()
            .map_err(|e| Ids7Error::Transport(e.into()))?;
        Ok(Self { http })
    }

    /// Use a preconfigured client (proxies, custom TLS roots, ...).
    pub fn with_client(http: reqwest::blocking::Client) -> Self {
        Self { http }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .http
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        let response = builder.send()?;
        let status = response.status();
        let body = response.bytes()?;
        Ok(HttpResponse { status, body })
    }
}

/// Configuration for automatic retry of transient connection failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (not counting the initial request).
    pub max_retries: u32,
    /// Backoff before the first retry; doubles on each subsequent one.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// A policy that sends each request exactly once.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt + 1`, with ±25% jitter.
    ///
    /// Saturates at [`Duration::MAX`].
    pub fn backoff(&self, attempt: u32) -> Duration {
        let base = self
            .initial_backoff
            .saturating_mul(2_u32.saturating_pow(attempt));
        let jitter = 0.75 + fastrand::f64() * 0.5;
        Duration::try_from_secs_f64(base.as_secs_f64() * jitter).unwrap_or(Duration::MAX)
    }
}

/// Wraps a [`Transport`] and re-sends requests on transient failures.
#[derive(Debug, Clone)]
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<T: Transport> Transport for RetryingTransport<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut attempt = 0;
        loop {
            match self.inner.send(request) {
                Ok(response) => return Ok(response),
                Err(err) if err.is_transient() && attempt < self.policy.max_retries => {
                    let backoff = self.policy.backoff(attempt);
                    tracing::warn!(
                        method = %request.method,
                        path = %request.path,
                        attempt = attempt + 1,
                        max_retries = self.policy.max_retries,
                        backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "connection failed, retrying"
                    );
                    std::thread::sleep(backoff);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
