//! Transport seam between steps and the REST API.
//!
//! Steps build an [`ApiRequest`] with a path relative to the versioned API
//! root (`{instance_url}/services/data/v{api_version}/`) and hand it to an
//! [`ApiTransport`]. The transport owns the base URL and the bearer token.

use crate::error::SyncError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt::{self, Debug};

/// Endpoint paths relative to the versioned API root.
pub mod paths {
    /// Collection endpoint for context definitions.
    pub const CONTEXT_DEFINITIONS: &str = "connect/context-definitions";

    /// Pricing data sync trigger.
    pub const PRICING_SYNC: &str = "connect/core-pricing/sync/syncData";

    /// A single context definition.
    pub fn context_definition(id: &str) -> String {
        format!("{CONTEXT_DEFINITIONS}/{id}")
    }

    /// The mapping list of a context definition.
    pub fn context_mappings(id: &str) -> String {
        format!("{CONTEXT_DEFINITIONS}/{id}/context-mappings")
    }
}

/// HTTP methods used against the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Patch => write!(f, "PATCH"),
        }
    }
}

/// A request against the versioned API root.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the versioned API root.
    pub path: String,
    /// JSON body, if the method carries one.
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// A bodiless `GET`.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    /// A `POST` with a JSON body.
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    /// A `PATCH` with a JSON body.
    pub fn patch(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Patch,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Status and raw body of an API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl ApiResponse {
    /// Creates a response from its parts.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns a non-2xx response into a [`SyncError::Request`].
    pub fn error_for_status(self, method: Method, endpoint: &str) -> Result<Self, SyncError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SyncError::Request {
                method,
                endpoint: endpoint.to_string(),
                status: self.status,
                body: self.body,
            })
        }
    }

    /// Parses the body as JSON. A malformed body is a data shape error.
    pub fn json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, SyncError> {
        serde_json::from_str(&self.body)
            .map_err(|e| SyncError::data_shape(endpoint, format!("malformed JSON body: {e}"), self))
    }
}

/// Sends requests to the API on behalf of the steps.
///
/// Implementations return `Ok` for every response that arrived, whatever its
/// status; only failures to obtain a response are errors.
#[async_trait]
pub trait ApiTransport: Send + Sync + Debug {
    /// Sends one request and returns whatever response came back.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, SyncError>;
}
