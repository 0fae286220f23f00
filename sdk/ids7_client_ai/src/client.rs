//! Client for the IDS7 AI results API.
//!
//! [`Ids7AIClient`] negotiates server versions once, when it is built, and then
//! exposes the image info and results operations for one registered
//! application.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ids7_client_ai::client::Ids7AIClient;
//! use ids7_client_ai::models::{AnalysisResult, ImageInfoOptions};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Ids7AIClient::connect(
//!     "https://ids7.example.org/SectraPathologyServer/api/ai/v1",
//!     "callback-token",
//!     "my-app",
//! )?;
//! println!("IDS7 {}", client.software_version());
//!
//! let info = client.get_image_info("slide-42", &ImageInfoOptions::new().extended(true))?;
//! println!("Slide {} blocks: {}", info.id, info.blocks().len());
//!
//! let created = client.create_results(&AnalysisResult::new().with_field("score", 0.9))?;
//! let updated = client.update_results(
//!     &created.id,
//!     &created.clone().into_result().with_field("score", 0.95),
//! )?;
//! println!("Result {} updated", updated.id);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use ids7_client_core::auth::BearerToken;
use ids7_client_core::client::{Ids7Client, Ids7ClientBuilder};
use ids7_client_core::error::{Ids7Error, Ids7Result};
use ids7_client_core::transport::{RetryPolicy, Transport};
use reqwest::header::HeaderMap;

use crate::models::{AnalysisResult, ApplicationInfo, ImageInfo, ImageInfoOptions, ResultResponse};

/// Environment variable consulted when no application id is given to the builder.
pub const APP_ID_ENV_VAR: &str = "IDS7_APP_ID";

/// Header carrying the negotiated API version.
pub const API_VERSION_HEADER: &str = "x-sectra-apiversion";

/// Header carrying the negotiated software version.
pub const SOFTWARE_VERSION_HEADER: &str = "x-sectra-softwareversion";

const INFO_PATH: &str = "/info";

/// Client for the AI results API of an IDS7 server.
///
/// Built once per server and application. The negotiated version headers are
/// fixed at construction and sent with every request. The client is cheaply
/// cloneable and can be shared across threads.
#[derive(Debug, Clone)]
pub struct Ids7AIClient {
    client: Ids7Client,
    app_id: Arc<str>,
    ids7_version: ApplicationInfo,
}

/// Builder for constructing an [`Ids7AIClient`].
#[derive(Debug, Default)]
pub struct Ids7AIClientBuilder {
    core: Ids7ClientBuilder,
    app_id: Option<String>,
}

impl Ids7AIClient {
    /// Create a new builder for configuring an `Ids7AIClient`.
    pub fn builder() -> Ids7AIClientBuilder {
        Ids7AIClientBuilder::default()
    }

    /// Connect with default transport settings.
    ///
    /// Sends one `GET /info` request before returning.
    pub fn connect(
        url: impl Into<String>,
        token: impl Into<String>,
        app_id: impl Into<String>,
    ) -> Ids7Result<Self> {
        Self::builder()
            .url(url)
            .token(BearerToken::new(token))
            .app_id(app_id)
            .build()
    }

    /// Versions reported by the server at construction.
    pub fn ids7_version(&self) -> &ApplicationInfo {
        &self.ids7_version
    }

    pub fn api_version(&self) -> &str {
        &self.ids7_version.api_version
    }

    pub fn software_version(&self) -> &str {
        &self.ids7_version.software_version
    }

    /// The registered application id results are scoped to.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Headers sent with every request, including the negotiated versions.
    pub fn default_headers(&self) -> &HeaderMap {
        self.client.headers()
    }

    #[tracing::instrument(name = "ids7::info", skip(client))]
    fn negotiate(client: &Ids7Client) -> Ids7Result<(ApplicationInfo, HeaderMap)> {
        let versions: ApplicationInfo = client.get(INFO_PATH, &[])?;

        let mut headers = HeaderMap::new();
        headers.insert(
            API_VERSION_HEADER,
            Ids7Client::header_value("X-Sectra-ApiVersion", &versions.api_version)?,
        );
        headers.insert(
            SOFTWARE_VERSION_HEADER,
            Ids7Client::header_value("X-Sectra-SoftwareVersion", &versions.software_version)?,
        );

        tracing::debug!(
            api_version = %versions.api_version,
            software_version = %versions.software_version,
            "negotiated server versions"
        );
        Ok((versions, headers))
    }

    /// Fetch metadata for a slide.
    ///
    /// # Tracing
    ///
    /// Emits a span named `ids7::slides::info` with field `slide_id`.
    #[tracing::instrument(
        name = "ids7::slides::info",
        skip(self, options),
        fields(slide_id = %slide_id, extended = options.extended, phi = options.phi)
    )]
    pub fn get_image_info(&self, slide_id: &str, options: &ImageInfoOptions) -> Ids7Result<ImageInfo> {
        require_id("slide_id", slide_id)?;
        tracing::debug!("getting image info");

        let path = format!("/slides/{slide_id}/info");
        let info: ImageInfo = self.client.get(&path, &options.query_pairs())?;

        tracing::debug!(fields = info.additional.len(), "image info received");
        Ok(info)
    }

    /// Submit a new result for this application.
    ///
    /// # Tracing
    ///
    /// Emits a span named `ids7::results::create` with field `app_id`.
    #[tracing::instrument(
        name = "ids7::results::create",
        skip(self, result),
        fields(app_id = %self.app_id)
    )]
    pub fn create_results(&self, result: &AnalysisResult) -> Ids7Result<ResultResponse> {
        tracing::debug!("creating results");

        let path = format!("/applications/{}/results", self.app_id);
        let response: ResultResponse = self.client.post(&path, result)?;

        tracing::debug!(result_id = %response.id, "results created");
        Ok(response)
    }

    /// Fetch a stored result.
    ///
    /// The path uses the singular `/application/` segment, unlike
    /// [`create_results`](Self::create_results). That is how the server routes it.
    ///
    /// # Tracing
    ///
    /// Emits a span named `ids7::results::get` with fields `app_id` and `result_id`.
    #[tracing::instrument(
        name = "ids7::results::get",
        skip(self, id),
        fields(app_id = %self.app_id, result_id = %id)
    )]
    pub fn get_results(&self, id: &str) -> Ids7Result<ResultResponse> {
        require_id("id", id)?;
        tracing::debug!("getting results");

        let path = format!("/application/{}/results/{id}", self.app_id);
        self.client.get(&path, &[])
    }

    /// Replace a stored result.
    ///
    /// # Tracing
    ///
    /// Emits a span named `ids7::results::update` with fields `app_id` and `result_id`.
    #[tracing::instrument(
        name = "ids7::results::update",
        skip(self, id, result),
        fields(app_id = %self.app_id, result_id = %id)
    )]
    pub fn update_results(&self, id: &str, result: &AnalysisResult) -> Ids7Result<ResultResponse> {
        require_id("id", id)?;
        tracing::debug!("updating results");

        let path = format!("/application/{}/results/{id}", self.app_id);
        let response: ResultResponse = self.client.put(&path, result)?;

        tracing::debug!("results updated");
        Ok(response)
    }
}

fn require_id(name: &str, value: &str) -> Ids7Result<()> {
    if value.is_empty() {
        return Err(Ids7Error::InvalidArgument(format!("{name} must not be empty")));
    }
    Ok(())
}

impl Ids7AIClientBuilder {
    /// Set the server base URL.
    ///
    /// If not set or empty, the builder reads the `IDS7_URL` environment
    /// variable.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.core = self.core.url(url);
        self
    }

    /// Set the callback token.
    ///
    /// If not set, the builder reads the `IDS7_TOKEN` environment variable.
    pub fn token(mut self, token: BearerToken) -> Self {
        self.core = self.core.token(token);
        self
    }

    /// Set the registered application id.
    ///
    /// If not set or empty, the builder reads the `IDS7_APP_ID` environment
    /// variable.
    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Set the retry policy for transient connection failures.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.core = self.core.retry_policy(policy);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.core = self.core.connect_timeout(timeout);
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.core = self.core.read_timeout(timeout);
        self
    }

    /// Set a custom blocking HTTP client. Builder timeouts are then ignored.
    pub fn http_client(mut self, client: reqwest::blocking::Client) -> Self {
        self.core = self.core.http_client(client);
        self
    }

    /// Replace the HTTP transport. The retry policy still applies.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.core = self.core.transport(transport);
        self
    }

    /// Build the client and negotiate versions with the server.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing, or if the `/info`
    /// request fails or returns an unexpected payload.
    pub fn build(self) -> Ids7Result<Ids7AIClient> {
        let app_id = self
            .app_id
            .filter(|v| !v.is_empty())
            .or_else(|| std::env::var(APP_ID_ENV_VAR).ok().filter(|v| !v.is_empty()))
            .ok_or_else(|| {
                Ids7Error::MissingConfig(format!(
                    "app_id is required. Set it via builder or {APP_ID_ENV_VAR} env var."
                ))
            })?;

        let client = self.core.build()?;
        let (ids7_version, headers) = Ids7AIClient::negotiate(&client)?;

        Ok(Ids7AIClient {
            client: client.with_headers(headers),
            app_id: app_id.into(),
            ids7_version,
        })
    }
}
