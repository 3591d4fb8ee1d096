//! Step trait and related types.

use crate::context::{RunContext, WorkflowState};
use crate::error::SyncError;
use async_trait::async_trait;
use std::fmt::{self, Debug};
use std::time::Duration;

/// Type-safe step name wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepName(String);

impl StepName {
    /// Creates a new StepName.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the step name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StepName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StepName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for StepName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for StepName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for StepName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Output from a step execution.
///
/// Represents what should happen after a step completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutput {
    /// Continue to the specified step.
    Continue(StepName),
    /// Workflow completed successfully.
    Complete,
}

impl StepOutput {
    /// Creates a Continue output to the next step.
    pub fn next(name: impl Into<StepName>) -> Self {
        Self::Continue(name.into())
    }

    /// Creates a Complete output.
    pub fn done() -> Self {
        Self::Complete
    }

    /// Returns the step to run next, if any.
    pub fn into_next(self) -> Option<StepName> {
        match self {
            StepOutput::Continue(name) => Some(name),
            StepOutput::Complete => None,
        }
    }
}

/// What the engine does when a step returns an error or times out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OnError {
    /// Stop the run and mark it failed.
    #[default]
    Halt,
    /// Record the error as a warning, advance to the step's target state and
    /// carry on with the given output.
    Continue(StepOutput),
}

/// Configuration for a workflow step.
#[derive(Debug, Clone)]
pub struct StepConfig {
    /// Maximum time allowed for step execution. `None` falls back to 30s.
    pub timeout: Option<Duration>,
    /// Failure handling for the step. Default: halt.
    pub on_error: OnError,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            on_error: OnError::Halt,
        }
    }
}

/// A workflow step that can be executed asynchronously.
///
/// Each step issues at most one remote call, threads what it learned into the
/// [`RunContext`] and names the step to run next.
///
/// # Examples
///
/// ```
/// use ctxsync_core::{RunContext, Step, StepName, StepOutput, SyncError, WorkflowState};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct RememberIdStep;
///
/// #[async_trait]
/// impl Step for RememberIdStep {
///     async fn execute(&self, ctx: &mut RunContext) -> Result<StepOutput, SyncError> {
///         ctx.set_context_id("CTX1");
///         Ok(StepOutput::done())
///     }
///
///     fn name(&self) -> StepName {
///         StepName::new("remember")
///     }
///
///     fn target_state(&self) -> WorkflowState {
///         WorkflowState::Created
///     }
/// }
/// ```
#[async_trait]
pub trait Step: Send + Sync + Debug {
    /// Executes the step logic.
    ///
    /// # Returns
    ///
    /// - `Ok(StepOutput::Continue(name))` - Continue to the specified step
    /// - `Ok(StepOutput::Complete)` - End the workflow successfully
    /// - `Err(error)` - Step failed, handled according to [`StepConfig::on_error`]
    async fn execute(&self, ctx: &mut RunContext) -> Result<StepOutput, SyncError>;

    /// Returns the step name.
    fn name(&self) -> StepName;

    /// The state the run is in once this step has finished.
    fn target_state(&self) -> WorkflowState;

    /// Returns the step configuration.
    fn config(&self) -> StepConfig {
        StepConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct LocateStep;

    #[async_trait]
    impl Step for LocateStep {
        async fn execute(&self, ctx: &mut RunContext) -> Result<StepOutput, SyncError> {
            ctx.set_mapping_id("MAP1");
            Ok(StepOutput::next("bind"))
        }

        fn name(&self) -> StepName {
            StepName::new("locate")
        }

        fn target_state(&self) -> WorkflowState {
            WorkflowState::Located
        }
    }

    #[test]
    fn test_step_name() {
        let name = StepName::new("create");
        assert_eq!(name.as_str(), "create");

        let name: StepName = "create".into();
        assert_eq!(name, "create");
    }

    #[test]
    fn test_step_output() {
        let output = StepOutput::next("bind");
        assert_eq!(output, StepOutput::Continue(StepName::new("bind")));
        assert_eq!(output.into_next(), Some(StepName::new("bind")));

        assert_eq!(StepOutput::done().into_next(), None);
    }

    #[test]
    fn test_step_config_default() {
        let config = LocateStep.config();
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.on_error, OnError::Halt);
    }

    #[test]
    fn test_step_execution() {
        let mut ctx = RunContext::new();
        let output = tokio_test::block_on(LocateStep.execute(&mut ctx));

        assert!(matches!(output, Ok(StepOutput::Continue(ref name)) if name == &"bind"));
        assert_eq!(ctx.mapping_id(), Some("MAP1"));
    }
}
