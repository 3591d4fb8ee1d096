//! Run state threaded explicitly between steps.

use crate::error::SyncError;
use crate::result::WorkflowResult;
use std::fmt;
use std::time::{Duration, Instant};

/// Position of a context sync run in its state machine.
///
/// `Init → Created → Located → Bound → Activated → Done`, with `Failed`
/// reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkflowState {
    /// No call issued yet.
    #[default]
    Init,
    /// The definition exists and its id is known.
    Created,
    /// The target mapping id is known.
    Located,
    /// The bind step ran.
    Bound,
    /// The activate step ran.
    Activated,
    /// The run finished.
    Done,
    /// The run halted.
    Failed,
}

impl WorkflowState {
    /// `Done` and `Failed` are terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowState::Done | WorkflowState::Failed)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowState::Init => "init",
            WorkflowState::Created => "created",
            WorkflowState::Located => "located",
            WorkflowState::Bound => "bound",
            WorkflowState::Activated => "activated",
            WorkflowState::Done => "done",
            WorkflowState::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Mutable state of a single run.
///
/// Holds the ids learned from earlier responses and every non-fatal error
/// the run chose to continue past. A context is owned by exactly one run and
/// is consumed by [`RunContext::into_result`].
#[derive(Debug)]
pub struct RunContext {
    state: WorkflowState,
    context_id: Option<String>,
    mapping_id: Option<String>,
    warnings: Vec<SyncError>,
    started_at: Instant,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    /// Creates a context in the `Init` state.
    pub fn new() -> Self {
        Self {
            state: WorkflowState::Init,
            context_id: None,
            mapping_id: None,
            warnings: Vec::new(),
            started_at: Instant::now(),
        }
    }

    /// Current state of the run.
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Moves the run to `state`. Terminal states are sticky.
    pub fn advance(&mut self, state: WorkflowState) {
        if !self.state.is_terminal() {
            self.state = state;
        }
    }

    /// Marks the run as failed.
    pub fn fail(&mut self) {
        self.advance(WorkflowState::Failed);
    }

    /// Marks the run as done unless it already failed.
    pub fn finish(&mut self) {
        self.advance(WorkflowState::Done);
    }

    /// Id returned by the create call, once known.
    pub fn context_id(&self) -> Option<&str> {
        self.context_id.as_deref()
    }

    /// Stores the created context definition id.
    pub fn set_context_id(&mut self, id: impl Into<String>) {
        self.context_id = Some(id.into());
    }

    /// Id of the located mapping, once known.
    pub fn mapping_id(&self) -> Option<&str> {
        self.mapping_id.as_deref()
    }

    /// Stores the located mapping id.
    pub fn set_mapping_id(&mut self, id: impl Into<String>) {
        self.mapping_id = Some(id.into());
    }

    /// Records an error the run continued past.
    pub fn record_warning(&mut self, error: SyncError) {
        self.warnings.push(error);
    }

    /// Errors the run continued past, in order.
    pub fn warnings(&self) -> &[SyncError] {
        &self.warnings
    }

    /// Returns the time elapsed since the context was created.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Consumes the context into the run's final result.
    pub fn into_result(self, error: Option<SyncError>) -> WorkflowResult {
        let elapsed = self.elapsed();
        WorkflowResult {
            state: self.state,
            context_id: self.context_id,
            mapping_id: self.mapping_id,
            error,
            warnings: self.warnings,
            elapsed,
        }
    }
}
