//! Workflow engine for executing steps.

use ctxsync_core::{OnError, RunContext, Step, StepConfig, StepName, StepOutput, SyncError};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info};

const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(30);

/// A workflow engine that executes a chain of steps, one at a time.
pub struct Workflow {
    steps: HashMap<StepName, StepEntry>,
    start_step: StepName,
}

struct StepEntry {
    step: Box<dyn Step>,
    timeout: Duration,
    on_error: OnError,
}

impl fmt::Debug for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workflow")
            .field("steps", &self.steps.keys().collect::<Vec<_>>())
            .field("start_step", &self.start_step)
            .finish()
    }
}

impl Workflow {
    /// Creates a new workflow builder.
    pub fn builder() -> WorkflowBuilder {
        WorkflowBuilder::new()
    }

    /// Executes the workflow starting from the configured start step.
    ///
    /// Returns the error that halted the run, if any. Errors from steps
    /// configured with [`OnError::Continue`] are recorded on the context
    /// instead. On return the context is either `Done` or `Failed`.
    pub async fn execute(&self, ctx: &mut RunContext) -> Result<(), SyncError> {
        let mut current_step = Some(self.start_step.clone());

        while let Some(step_name) = current_step {
            let Some(entry) = self.steps.get(&step_name) else {
                error!("Step '{}' is not registered", step_name);
                ctx.fail();
                return Err(SyncError::StepNotFound(step_name));
            };

            current_step = match self.execute_step(entry, ctx).await {
                Ok(output) => {
                    info!(
                        "Step '{}' completed, run is {}",
                        step_name,
                        entry.step.target_state()
                    );
                    ctx.advance(entry.step.target_state());
                    output.into_next()
                }
                Err(e) => match &entry.on_error {
                    OnError::Halt => {
                        error!("Step '{}' failed, halting: {}", step_name, e);
                        ctx.fail();
                        return Err(e);
                    }
                    OnError::Continue(output) => {
                        error!("Step '{}' failed, continuing: {}", step_name, e);
                        ctx.record_warning(e);
                        ctx.advance(entry.step.target_state());
                        output.clone().into_next()
                    }
                },
            };
        }

        ctx.finish();
        Ok(())
    }

    async fn execute_step(
        &self,
        entry: &StepEntry,
        ctx: &mut RunContext,
    ) -> Result<StepOutput, SyncError> {
        match timeout(entry.timeout, entry.step.execute(ctx)).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout {
                step_name: entry.step.name(),
            }),
        }
    }
}

/// Builder for constructing [`Workflow`] instances.
#[derive(Default)]
pub struct WorkflowBuilder {
    steps: HashMap<StepName, StepEntry>,
    start_step: Option<StepName>,
}

impl WorkflowBuilder {
    /// Creates a new empty workflow builder.
    pub fn new() -> Self {
        Self {
            steps: HashMap::new(),
            start_step: None,
        }
    }

    /// Adds a step under its own name, using the step's own configuration.
    pub fn add_step<S: Step + 'static>(self, step: S) -> Self {
        let config = step.config();
        self.add_configured(step, config)
    }

    /// Adds a step with an explicit configuration.
    pub fn add_configured<S: Step + 'static>(mut self, step: S, config: StepConfig) -> Self {
        let step_name = step.name();
        self.steps.insert(
            step_name,
            StepEntry {
                step: Box::new(step),
                timeout: config.timeout.unwrap_or(DEFAULT_STEP_TIMEOUT),
                on_error: config.on_error,
            },
        );
        self
    }

    /// Sets the start step by name.
    pub fn start_with(mut self, step_name: impl Into<StepName>) -> Self {
        self.start_step = Some(step_name.into());
        self
    }

    /// Builds the workflow.
    pub fn build(self) -> Result<Workflow, SyncError> {
        let start_step = self.start_step.ok_or_else(|| {
            SyncError::Configuration("Start step must be specified".to_string())
        })?;

        if !self.steps.contains_key(&start_step) {
            return Err(SyncError::StepNotFound(start_step));
        }

        Ok(Workflow {
            steps: self.steps,
            start_step,
        })
    }
}
