//! Core traits and types for the ctxsync workflow.
//!
//! This crate has no runtime dependencies. It defines what a step is, the
//! state a run threads between steps, the API bodies, and the transport seam
//! the runtime crate plugs an HTTP client into.
//!
//! # Core Types
//!
//! - [`Step`] - One remote call in a workflow
//! - [`RunContext`] - Ids and warnings threaded between steps
//! - [`WorkflowResult`] - What a finished run reports
//! - [`ApiTransport`] - Sends [`ApiRequest`]s to the versioned REST root
//! - [`Credentials`] - Resolved bearer token and instance URL
//! - [`SyncError`] - Error types for every failure a run can see

pub mod api;
mod context;
mod credentials;
mod error;
pub mod model;
mod result;
mod step;

pub use api::{paths, ApiRequest, ApiResponse, ApiTransport, Method};
pub use context::{RunContext, WorkflowState};
pub use credentials::{CredentialOverrides, Credentials, SessionSource};
pub use error::SyncError;
pub use model::ContextDescriptor;
pub use result::{Outcome, WorkflowResult};
pub use step::{OnError, Step, StepConfig, StepName, StepOutput};
