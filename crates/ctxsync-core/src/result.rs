//! Final result of a context sync run.

use crate::context::WorkflowState;
use crate::error::SyncError;
use std::time::Duration;

/// Coarse classification of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every step succeeded.
    Complete,
    /// The run reached `Done` but continued past at least one failed step.
    CompletedWithWarnings,
    /// The run stopped before reaching `Done`.
    Failed,
}

/// What a run produced. Lives only in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    /// Final state, `Done` or `Failed`.
    pub state: WorkflowState,
    /// Id returned by the create call.
    pub context_id: Option<String>,
    /// Id of the first mapping whose name matched the target.
    pub mapping_id: Option<String>,
    /// The error that halted the run.
    pub error: Option<SyncError>,
    /// Errors the run continued past.
    pub warnings: Vec<SyncError>,
    /// Wall time of the run.
    pub elapsed: Duration,
}

impl WorkflowResult {
    /// Returns `true` if the run reached `Done`.
    pub fn is_done(&self) -> bool {
        self.state == WorkflowState::Done
    }

    /// Classifies the run by final state and warnings.
    pub fn outcome(&self) -> Outcome {
        match (self.state, self.warnings.is_empty()) {
            (WorkflowState::Done, true) => Outcome::Complete,
            (WorkflowState::Done, false) => Outcome::CompletedWithWarnings,
            _ => Outcome::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiResponse;
    use pretty_assertions::assert_eq;

    fn result(state: WorkflowState, warnings: Vec<SyncError>) -> WorkflowResult {
        WorkflowResult {
            state,
            context_id: None,
            mapping_id: None,
            error: None,
            warnings,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_outcome() {
        assert_eq!(
            result(WorkflowState::Done, vec![]).outcome(),
            Outcome::Complete
        );
        assert_eq!(
            result(
                WorkflowState::Done,
                vec![SyncError::data_shape(
                    "connect/context-definitions/X",
                    "x",
                    &ApiResponse::new(200, "{}")
                )]
            )
            .outcome(),
            Outcome::CompletedWithWarnings
        );
        assert_eq!(
            result(WorkflowState::Failed, vec![]).outcome(),
            Outcome::Failed
        );
        assert_eq!(
            result(WorkflowState::Located, vec![]).outcome(),
            Outcome::Failed
        );
    }
}
