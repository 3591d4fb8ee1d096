//! Create and activate context definitions and trigger pricing data sync
//! against a CRM REST API.
//!
//! # Example
//!
//! ```rust,no_run
//! use ctxsync::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), SyncError> {
//! let credentials = Credentials::new("00D...", "https://acme.my.salesforce.com")?;
//! let client = RestClient::new(&credentials, "62.0", std::time::Duration::from_secs(30))?;
//!
//! let workflow = ContextSyncWorkflow::new(
//!     Arc::new(client),
//!     ContextSyncSpec::sales_transaction(),
//!     SyncOptions::default(),
//! )?;
//!
//! let result = workflow.run().await;
//! match result.outcome() {
//!     Outcome::Complete => println!("active: {:?}", result.context_id),
//!     Outcome::CompletedWithWarnings => eprintln!("partial: {:?}", result.warnings),
//!     Outcome::Failed => eprintln!("failed: {:?}", result.error),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context_sync;
pub mod http;
pub mod logging;
pub mod pricing;
pub mod testing;
mod workflow;

// Re-export core types
pub use ctxsync_core::*;

pub use config::{Config, OrgConfig};
pub use context_sync::{ContextSyncSpec, ContextSyncWorkflow, SyncOptions};
pub use http::RestClient;
pub use pricing::{PricingSyncOutcome, PricingSyncTrigger};
pub use workflow::{Workflow, WorkflowBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        ApiTransport, Config, ContextSyncSpec, ContextSyncWorkflow, CredentialOverrides,
        Credentials, Outcome, PricingSyncTrigger, RestClient, SyncError, SyncOptions,
        WorkflowResult, WorkflowState,
    };
}
