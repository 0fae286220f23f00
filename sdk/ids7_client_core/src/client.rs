//! Base HTTP client for IDS7 APIs.
//!
//! [`Ids7Client`] holds the base URL, the default header set (bearer token plus
//! anything merged in later), and a retrying [`Transport`]. It issues GET, POST
//! and PUT requests, checks the response against the exact status each verb
//! expects, and parses the JSON object body into the requested [`Schema`]
//! record. Use [`JsonPayload`] to get the object untyped.
//!
//! ```rust,no_run
//! use ids7_client_core::client::Ids7Client;
//! use ids7_client_core::auth::BearerToken;
//! use ids7_client_core::schema::JsonPayload;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Ids7Client::builder()
//!     .url("https://ids7.example.org/SectraPathologyServer/api/ai/v1")
//!     .token(BearerToken::new("callback-token"))
//!     .build()?;
//!
//! let info: JsonPayload = client.get("/info", &[])?;
//! println!("API version: {}", info["apiVersion"]);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::Serialize;

use crate::auth::BearerToken;
use crate::error::{Ids7Error, Ids7Result};
use crate::schema::{self, Schema};
use crate::transport::{
    HttpRequest, ReqwestTransport, RetryPolicy, RetryingTransport, Transport,
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT,
};

/// Environment variable consulted when no URL is given to the builder.
pub const URL_ENV_VAR: &str = "IDS7_URL";

/// Base client shared by the IDS7 API surfaces.
///
/// The client is cheaply cloneable and can be shared across threads. Its
/// configuration never changes once built; [`Ids7Client::with_headers`]
/// consumes the client and returns a new one.
#[derive(Debug, Clone)]
pub struct Ids7Client {
    base_url: Arc<str>,
    headers: HeaderMap,
    transport: Arc<RetryingTransport<Box<dyn Transport>>>,
}

/// Builder for constructing an [`Ids7Client`].
#[derive(Debug, Default)]
pub struct Ids7ClientBuilder {
    url: Option<String>,
    token: Option<BearerToken>,
    http_client: Option<reqwest::blocking::Client>,
    transport: Option<Box<dyn Transport>>,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    retry_policy: Option<RetryPolicy>,
}

impl Ids7Client {
    /// Create a new builder for configuring an `Ids7Client`.
    pub fn builder() -> Ids7ClientBuilder {
        Ids7ClientBuilder::default()
    }

    /// The base URL every path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers attached to every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        self.transport.policy()
    }

    /// Return a client whose default headers also include `headers`.
    ///
    /// Existing entries with the same name are replaced.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        for (name, value) in headers {
            if let Some(name) = name {
                self.headers.insert(name, value);
            }
        }
        self
    }

    /// Build a header value from a string, reporting `name` on failure.
    pub fn header_value(name: &'static str, value: &str) -> Ids7Result<HeaderValue> {
        HeaderValue::from_str(value).map_err(|source| Ids7Error::InvalidHeader { name, source })
    }

    /// Send a GET request; `query` pairs are appended to the URL.
    ///
    /// Expects `200 OK`.
    pub fn get<R: Schema>(&self, path: &str, query: &[(&str, &str)]) -> Ids7Result<R> {
        let query = query
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.execute(Method::GET, path, query, None, StatusCode::OK)
    }

    /// Send a POST request with a JSON object body.
    ///
    /// Expects `201 Created`.
    pub fn post<R: Schema, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Ids7Result<R> {
        let body = Self::encode(body)?;
        self.execute(Method::POST, path, Vec::new(), Some(body), StatusCode::CREATED)
    }

    /// Send a PUT request with a JSON object body.
    ///
    /// Expects `200 OK`.
    pub fn put<R: Schema, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Ids7Result<R> {
        let body = Self::encode(body)?;
        self.execute(Method::PUT, path, Vec::new(), Some(body), StatusCode::OK)
    }

    fn encode<T: Serialize + ?Sized>(body: &T) -> Ids7Result<Bytes> {
        let payload = schema::to_payload(body)?;
        serde_json::to_vec(&payload)
            .map(Bytes::from)
            .map_err(Ids7Error::Serialization)
    }

    fn execute<R: Schema>(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<Bytes>,
        expected: StatusCode,
    ) -> Ids7Result<R> {
        let request = HttpRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            path: path.to_string(),
            query,
            headers: self.headers.clone(),
            body,
        };

        tracing::trace!(method = %request.method, path = %request.path, "sending request");
        let response = self.transport.send(&request)?;

        if response.status != expected {
            tracing::debug!(
                method = %request.method,
                path = %request.path,
                status = response.status.as_u16(),
                expected = expected.as_u16(),
                "unexpected response status"
            );
            return Err(Ids7Error::request(
                response.status.as_u16(),
                response.text(),
                path,
            ));
        }

        R::parse(&response.body)
    }
}

impl Ids7ClientBuilder {
    /// Set the server base URL, e.g.
    /// `https://host/SectraPathologyServer/api/ai/v1`.
    ///
    /// Paths are appended verbatim, so the URL should not end with `/`.
    /// If not set or empty, the builder reads the `IDS7_URL` environment
    /// variable.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the bearer token.
    ///
    /// If not set, the builder uses [`BearerToken::from_env()`].
    pub fn token(mut self, token: BearerToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Set a custom blocking HTTP client.
    ///
    /// **Note:** timeouts configured on this builder are ignored when a custom
    /// client is provided.
    pub fn http_client(mut self, client: reqwest::blocking::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Replace the HTTP transport entirely. Takes precedence over
    /// [`http_client`](Self::http_client).
    ///
    /// The retry policy still applies on top of the given transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the read timeout, covering the whole request/response cycle.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Set the retry policy for transient connection failures.
    ///
    /// Defaults to 3 retries with 500ms initial backoff.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Build the `Ids7Client`.
    ///
    /// No request is sent. The URL is not validated; a malformed URL is
    /// reported as a transport error on the first request.
    pub fn build(self) -> Ids7Result<Ids7Client> {
        let base_url = self
            .url
            .filter(|v| !v.is_empty())
            .or_else(|| std::env::var(URL_ENV_VAR).ok().filter(|v| !v.is_empty()))
            .ok_or_else(|| {
                Ids7Error::MissingConfig(format!(
                    "url is required. Set it via builder or {URL_ENV_VAR} env var."
                ))
            })?;

        let token = match self.token {
            Some(token) => token,
            None => BearerToken::from_env()?,
        };

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, token.header_value()?);

        let transport: Box<dyn Transport> = match (self.transport, self.http_client) {
            (Some(transport), _) => transport,
            (None, Some(http)) => Box::new(ReqwestTransport::with_client(http)),
            (None, None) => Box::new(ReqwestTransport::new(
                self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
                self.read_timeout.unwrap_or(DEFAULT_READ_TIMEOUT),
            )?),
        };

        Ok(Ids7Client {
            base_url: base_url.into(),
            headers,
            transport: Arc::new(RetryingTransport::new(
                transport,
                self.retry_policy.unwrap_or_default(),
            )),
        })
    }
}
