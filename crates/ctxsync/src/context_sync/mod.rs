//! Create, locate, bind and activate a context definition.
//!
//! A run issues up to four dependent calls, each consuming an id produced by
//! the one before it:
//!
//! 1. `POST connect/context-definitions` returns `contextDefinitionId`
//! 2. `GET connect/context-definitions/{id}` yields the target mapping's id
//! 3. `PATCH connect/context-definitions/{id}/context-mappings` makes it the default
//! 4. `PATCH connect/context-definitions/{id}` activates the definition
//!
//! Failures of steps 1 and 2 stop the run. Failures of steps 3 and 4 are
//! logged and recorded as warnings, and the run still reaches `Done`, unless
//! [`SyncOptions::halt_on_bind_failure`] is set.

mod steps;

pub use steps::{
    ActivateContextStep, BindMappingStep, CreateContextStep, LocateMappingStep, ACTIVATE, BIND,
    CREATE, LOCATE,
};

use crate::workflow::Workflow;
use ctxsync_core::{
    ApiTransport, ContextDescriptor, OnError, RunContext, StepConfig, StepOutput, SyncError,
    WorkflowResult,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const STANDARD_START_DATE: &str = "2024-01-01T00:00:00.000Z";

/// Which context to create and which of its mappings to make the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSyncSpec {
    pub descriptor: ContextDescriptor,
    pub mapping_name: String,
}

impl ContextSyncSpec {
    pub fn new(descriptor: ContextDescriptor, mapping_name: impl Into<String>) -> Self {
        Self {
            descriptor,
            mapping_name: mapping_name.into(),
        }
    }

    /// Extension of the standard sales transaction context.
    pub fn sales_transaction() -> Self {
        Self::extension_of("SalesTransaction", "Sales Transaction", "SalesTransaction")
    }

    /// Extension of the standard product discovery context.
    pub fn product_discovery() -> Self {
        Self::extension_of(
            "ProductDiscovery",
            "Product Discovery",
            "ProductDiscoveryMapping",
        )
    }

    /// Looks up a built-in spec by its task name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "sales-transaction" => Some(Self::sales_transaction()),
            "product-discovery" => Some(Self::product_discovery()),
            _ => None,
        }
    }

    fn extension_of(base: &str, label: &str, mapping_name: &str) -> Self {
        let name = format!("RLM_{base}Context");
        Self::new(
            ContextDescriptor {
                name: name.clone(),
                description: format!("Extension of Standard {label} Context"),
                developer_name: name,
                base_reference: format!("{base}Context__stdctx"),
                start_date: STANDARD_START_DATE.to_string(),
            },
            mapping_name,
        )
    }
}

/// Run-time knobs for a context sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Stop instead of activating when the bind call fails.
    pub halt_on_bind_failure: bool,
    /// Upper bound for each step, on top of the HTTP client's own timeout.
    pub step_timeout: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            halt_on_bind_failure: false,
            step_timeout: Duration::from_secs(30),
        }
    }
}

/// One context sync run over a given transport.
#[derive(Debug)]
pub struct ContextSyncWorkflow {
    workflow: Workflow,
    spec: Arc<ContextSyncSpec>,
}

impl ContextSyncWorkflow {
    pub fn new(
        transport: Arc<dyn ApiTransport>,
        spec: ContextSyncSpec,
        options: SyncOptions,
    ) -> Result<Self, SyncError> {
        if spec.mapping_name.trim().is_empty() {
            return Err(SyncError::Configuration(
                "target mapping name is empty".to_string(),
            ));
        }

        let spec = Arc::new(spec);
        let config = |on_error: OnError| StepConfig {
            timeout: Some(options.step_timeout),
            on_error,
        };
        let bind_on_error = if options.halt_on_bind_failure {
            OnError::Halt
        } else {
            OnError::Continue(StepOutput::next(ACTIVATE))
        };

        let workflow = Workflow::builder()
            .add_configured(
                CreateContextStep {
                    transport: transport.clone(),
                    spec: spec.clone(),
                },
                config(OnError::Halt),
            )
            .add_configured(
                LocateMappingStep {
                    transport: transport.clone(),
                    spec: spec.clone(),
                },
                config(OnError::Halt),
            )
            .add_configured(
                BindMappingStep {
                    transport: transport.clone(),
                    spec: spec.clone(),
                },
                config(bind_on_error),
            )
            .add_configured(
                ActivateContextStep { transport },
                config(OnError::Continue(StepOutput::done())),
            )
            .start_with(CREATE)
            .build()?;

        Ok(Self { workflow, spec })
    }

    /// Runs all steps and reports how far the run got.
    pub async fn run(&self) -> WorkflowResult {
        let mut ctx = RunContext::new();
        info!(
            "Syncing context definition {} (mapping {})",
            self.spec.descriptor.developer_name, self.spec.mapping_name
        );

        let error = self.workflow.execute(&mut ctx).await.err();
        let result = ctx.into_result(error);

        if !result.warnings.is_empty() {
            warn!(
                "Context sync finished with {} warning(s) in {:?}",
                result.warnings.len(),
                result.elapsed
            );
        } else if result.is_done() {
            info!("Context sync finished in {:?}", result.elapsed);
        }
        result
    }
}
