//! reqwest-backed [`ApiTransport`].

use async_trait::async_trait;
use ctxsync_core::{ApiRequest, ApiResponse, ApiTransport, Credentials, Method, SyncError};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Default API version appended to `/services/data/v`.
pub const DEFAULT_API_VERSION: &str = "62.0";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client bound to one org's versioned REST root.
///
/// Every request carries `Authorization: Bearer {token}` and
/// `Content-Type: application/json`.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    pub fn new(
        credentials: &Credentials,
        api_version: &str,
        request_timeout: Duration,
    ) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| SyncError::Configuration(format!("cannot build HTTP client: {e}")))?;
        Self::with_http_client(client, credentials, api_version)
    }

    /// Uses a preconfigured reqwest client, e.g. one with custom proxy or TLS
    /// settings. The client's own timeout applies.
    pub fn with_http_client(
        client: Client,
        credentials: &Credentials,
        api_version: &str,
    ) -> Result<Self, SyncError> {
        let api_version = api_version.trim().trim_start_matches('v');
        if api_version.is_empty() {
            return Err(SyncError::Configuration(
                "API version is missing".to_string(),
            ));
        }

        Ok(Self {
            client,
            base_url: format!(
                "{}/services/data/v{}/",
                credentials.instance_url(),
                api_version
            ),
            access_token: credentials.access_token().to_string(),
        })
    }

    /// Versioned REST root, ending in `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path relative to the REST root.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ApiTransport for RestClient {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, SyncError> {
        let url = self.url_for(&request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
        };
        debug!("{} {}", request.method, url);

        let mut builder = self
            .client
            .request(method, &url)
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let transport_error = |e: reqwest::Error| SyncError::Transport {
            endpoint: request.path.clone(),
            details: e.to_string(),
        };

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        Ok(ApiResponse::new(status, body))
    }
}
