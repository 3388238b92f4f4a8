//! Workflow states and terminal outcomes.

use std::fmt;

use serde::Serialize;

use crate::error::FailureCause;

/// Where a workflow run currently stands. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowState {
    NoChanges,
    NotOnBranch,
    AwaitingMessageConfirmation,
    AwaitingStagingConfirmation,
    Staged,
    Committed,
    Pushed,
    PushFailed,
    PRExists,
    PRCreated,
    PRUpdateNeeded,
    Aborted,
    Failed,
}

impl WorkflowState {
    /// States from which the run does not continue on its own.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowState::NoChanges
                | WorkflowState::NotOnBranch
                | WorkflowState::PRExists
                | WorkflowState::PRCreated
                | WorkflowState::Aborted
                | WorkflowState::Failed
        )
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowState::NoChanges => "no changes",
            WorkflowState::NotOnBranch => "not on a branch",
            WorkflowState::AwaitingMessageConfirmation => "awaiting message confirmation",
            WorkflowState::AwaitingStagingConfirmation => "awaiting staging confirmation",
            WorkflowState::Staged => "staged",
            WorkflowState::Committed => "committed",
            WorkflowState::Pushed => "pushed",
            WorkflowState::PushFailed => "push failed",
            WorkflowState::PRExists => "pull request exists",
            WorkflowState::PRCreated => "pull request created",
            WorkflowState::PRUpdateNeeded => "pull request update needed",
            WorkflowState::Aborted => "aborted",
            WorkflowState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// How a run ended. Every terminal state carries exactly one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub state: WorkflowState,
    pub message: String,
    /// Pull request URL for `PRExists` and `PRCreated`.
    pub url: Option<String>,
    /// Commit created during the run, if it got that far.
    pub commit: Option<String>,
    /// Underlying cause for collaborator failures.
    pub cause: Option<FailureCause>,
    /// Collaborator output, verbatim.
    pub error: Option<String>,
}

impl Outcome {
    pub fn new(state: WorkflowState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
            url: None,
            commit: None,
            cause: None,
            error: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_error(mut self, cause: Option<FailureCause>, error: impl Into<String>) -> Self {
        self.cause = cause;
        self.error = Some(error.into());
        self
    }

    /// Process exit code: non-zero only for failures and branch problems.
    pub fn exit_code(&self) -> i32 {
        match self.state {
            WorkflowState::Failed | WorkflowState::NotOnBranch => 1,
            _ => 0,
        }
    }
}
