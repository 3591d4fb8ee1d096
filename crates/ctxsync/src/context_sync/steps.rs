//! The four steps of a context sync run.

use super::ContextSyncSpec;
use async_trait::async_trait;
use ctxsync_core::model::{Activation, ContextDefinition, CreatedContext, MappingUpdate};
use ctxsync_core::{
    paths, ApiRequest, ApiTransport, Method, RunContext, Step, StepName, StepOutput, SyncError,
    WorkflowState,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

pub const CREATE: &str = "create";
pub const LOCATE: &str = "locate";
pub const BIND: &str = "bind";
pub const ACTIVATE: &str = "activate";

fn to_body<T: Serialize>(value: &T, step: &str) -> Result<serde_json::Value, SyncError> {
    serde_json::to_value(value).map_err(|e| SyncError::StepError {
        step_name: StepName::new(step),
        details: format!("cannot encode request body: {e}"),
    })
}

fn require_context_id<'a>(ctx: &'a RunContext, step: &str) -> Result<&'a str, SyncError> {
    ctx.context_id().ok_or_else(|| SyncError::StepError {
        step_name: StepName::new(step),
        details: "no context definition id in run".to_string(),
    })
}

/// POST the descriptor and remember the returned id.
#[derive(Debug)]
pub struct CreateContextStep {
    pub(super) transport: Arc<dyn ApiTransport>,
    pub(super) spec: Arc<ContextSyncSpec>,
}

#[async_trait]
impl Step for CreateContextStep {
    async fn execute(&self, ctx: &mut RunContext) -> Result<StepOutput, SyncError> {
        let endpoint = paths::CONTEXT_DEFINITIONS;
        let body = to_body(&self.spec.descriptor, CREATE)?;

        let response = self
            .transport
            .send(ApiRequest::post(endpoint, body))
            .await?
            .error_for_status(Method::Post, endpoint)?;

        let created: CreatedContext = response.json(endpoint)?;
        let id = created
            .context_definition_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                SyncError::data_shape(endpoint, "no contextDefinitionId in response", &response)
            })?;

        info!(endpoint, context_id = %id, "created context definition {}", self.spec.descriptor.name);
        ctx.set_context_id(id);
        Ok(StepOutput::next(LOCATE))
    }

    fn name(&self) -> StepName {
        StepName::new(CREATE)
    }

    fn target_state(&self) -> WorkflowState {
        WorkflowState::Created
    }
}

/// GET the new definition and pick the target mapping out of its first version.
#[derive(Debug)]
pub struct LocateMappingStep {
    pub(super) transport: Arc<dyn ApiTransport>,
    pub(super) spec: Arc<ContextSyncSpec>,
}

#[async_trait]
impl Step for LocateMappingStep {
    async fn execute(&self, ctx: &mut RunContext) -> Result<StepOutput, SyncError> {
        let endpoint = paths::context_definition(require_context_id(ctx, LOCATE)?);

        let response = self
            .transport
            .send(ApiRequest::get(&endpoint))
            .await?
            .error_for_status(Method::Get, &endpoint)?;

        let definition: ContextDefinition = response.json(&endpoint)?;
        if definition.context_definition_version_list.is_empty() {
            return Err(SyncError::data_shape(&endpoint, "no version list", &response));
        }

        let target = &self.spec.mapping_name;
        let mapping = definition
            .find_mapping(target)
            .ok_or_else(|| {
                SyncError::data_shape(&endpoint, format!("mapping '{target}' not found"), &response)
            })?;
        let mapping_id = mapping
            .context_mapping_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                SyncError::data_shape(
                    &endpoint,
                    format!("mapping '{target}' has no contextMappingId"),
                    &response,
                )
            })?;

        info!(endpoint = %endpoint, mapping_id = %mapping_id, "located {} mapping", target);
        ctx.set_mapping_id(mapping_id);
        Ok(StepOutput::next(BIND))
    }

    fn name(&self) -> StepName {
        StepName::new(LOCATE)
    }

    fn target_state(&self) -> WorkflowState {
        WorkflowState::Located
    }
}

/// PATCH the mapping list so the located mapping becomes the default.
#[derive(Debug)]
pub struct BindMappingStep {
    pub(super) transport: Arc<dyn ApiTransport>,
    pub(super) spec: Arc<ContextSyncSpec>,
}

#[async_trait]
impl Step for BindMappingStep {
    async fn execute(&self, ctx: &mut RunContext) -> Result<StepOutput, SyncError> {
        let endpoint = paths::context_mappings(require_context_id(ctx, BIND)?);
        let mapping_id = ctx.mapping_id().ok_or_else(|| SyncError::StepError {
            step_name: self.name(),
            details: "no context mapping id in run".to_string(),
        })?;

        let update = MappingUpdate::default_mapping(mapping_id, self.spec.mapping_name.clone());
        self.transport
            .send(ApiRequest::patch(&endpoint, to_body(&update, BIND)?))
            .await?
            .error_for_status(Method::Patch, &endpoint)?;

        info!(endpoint = %endpoint, "bound {} as default mapping", self.spec.mapping_name);
        Ok(StepOutput::next(ACTIVATE))
    }

    fn name(&self) -> StepName {
        StepName::new(BIND)
    }

    fn target_state(&self) -> WorkflowState {
        WorkflowState::Bound
    }
}

/// PATCH the definition active.
#[derive(Debug)]
pub struct ActivateContextStep {
    pub(super) transport: Arc<dyn ApiTransport>,
}

#[async_trait]
impl Step for ActivateContextStep {
    async fn execute(&self, ctx: &mut RunContext) -> Result<StepOutput, SyncError> {
        let endpoint = paths::context_definition(require_context_id(ctx, ACTIVATE)?);
        let body = to_body(&Activation { is_active: true }, ACTIVATE)?;

        self.transport
            .send(ApiRequest::patch(&endpoint, body))
            .await?
            .error_for_status(Method::Patch, &endpoint)?;

        info!(endpoint = %endpoint, "activated context definition");
        Ok(StepOutput::done())
    }

    fn name(&self) -> StepName {
        StepName::new(ACTIVATE)
    }

    fn target_state(&self) -> WorkflowState {
        WorkflowState::Activated
    }
}
