//! Error types for credential resolution, remote calls and workflow execution.

use crate::api::{ApiResponse, Method};
use crate::step::StepName;
use thiserror::Error;

/// Errors that can occur while syncing context definitions.
///
/// The first four variants map onto the failure kinds a run can report:
/// missing configuration, a non-2xx response, a 2xx response without the
/// expected shape, and a request that never produced a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SyncError {
    /// Credentials or settings are missing or invalid. Raised before any
    /// request is sent.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The API answered with a non-2xx status.
    #[error("{method} {endpoint} failed with status {status}: {body}")]
    Request {
        /// HTTP method of the failed request.
        method: Method,
        /// Endpoint path relative to the versioned API root.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A 2xx response was missing an expected field or entry.
    #[error("Unexpected response from {endpoint} (status {status}): {reason}: {body}")]
    DataShape {
        /// Endpoint path relative to the versioned API root.
        endpoint: String,
        /// What was missing.
        reason: String,
        /// HTTP status code of the response.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The request could not be sent or its response could not be read.
    #[error("Request to {endpoint} could not be completed: {details}")]
    Transport {
        /// Endpoint path relative to the versioned API root.
        endpoint: String,
        /// Underlying client error.
        details: String,
    },

    /// A step exceeded its timeout duration.
    #[error("Timeout occurred in step: {step_name}")]
    Timeout {
        /// The name of the step that timed out.
        step_name: StepName,
    },

    /// A referenced step was not found in the workflow.
    #[error("Step not found: {0}")]
    StepNotFound(StepName),

    /// A step could not run because an earlier step left no usable state.
    #[error("Step failed: {step_name}, details: {details}")]
    StepError {
        /// The name of the step that failed.
        step_name: StepName,
        /// Details about the failure.
        details: String,
    },
}

impl SyncError {
    /// A [`SyncError::DataShape`] error carrying the offending response.
    pub fn data_shape(
        endpoint: impl Into<String>,
        reason: impl Into<String>,
        response: &ApiResponse,
    ) -> Self {
        SyncError::DataShape {
            endpoint: endpoint.into(),
            reason: reason.into(),
            status: response.status,
            body: response.body.clone(),
        }
    }

    /// HTTP status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Request { status, .. } | SyncError::DataShape { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Returns `true` for errors raised before any request was sent.
    pub fn is_configuration(&self) -> bool {
        matches!(self, SyncError::Configuration(_))
    }
}
