//! Error types for courier modules using thiserror.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::sensitive::SensitiveFinding;

/// Errors from reading repository state.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to read repository status: {0}")]
    StatusFailed(#[source] git2::Error),

    #[error("Failed to collect diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to read git config: {0}")]
    ConfigFailed(#[source] git2::Error),

    #[error("Bare repositories are not supported")]
    BareRepository,
}

/// The branch is in a state the workflow cannot commit and push from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BranchStateError {
    #[error("HEAD is detached. Check out a branch before committing.")]
    Detached,

    #[error("The current branch has no commits yet and cannot be resolved")]
    Unborn,

    #[error("Could not determine the current branch: {0}")]
    Unresolved(String),
}

/// External operations requested from a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Stage,
    Commit,
    Push,
    FindPullRequest,
    CreatePullRequest,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Stage => "staging",
            Operation::Commit => "commit",
            Operation::Push => "push",
            Operation::FindPullRequest => "pull request lookup",
            Operation::CreatePullRequest => "pull request creation",
        };
        f.write_str(name)
    }
}

/// Why a collaborator-level operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    HookRejected,
    Network,
    Auth,
    NotFound,
    ToolMissing,
    AlreadyExists,
    Rejected,
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureCause::HookRejected => "hook rejected",
            FailureCause::Network => "network",
            FailureCause::Auth => "not authenticated",
            FailureCause::NotFound => "not found",
            FailureCause::ToolMissing => "tool not installed",
            FailureCause::AlreadyExists => "already exists",
            FailureCause::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// A stage/commit/push/PR operation failed at the collaborator level.
///
/// `detail` is the collaborator's own output, surfaced verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("{operation} was rejected by a git hook:\n{detail}")]
    HookRejected { operation: Operation, detail: String },

    #[error("{operation} failed due to a network error:\n{detail}")]
    Network { operation: Operation, detail: String },

    #[error("{operation} failed: not authenticated.\n{detail}")]
    Auth { operation: Operation, detail: String },

    #[error("{operation} failed: not found.\n{detail}")]
    NotFound { operation: Operation, detail: String },

    #[error("{operation} failed: `{tool}` is not installed")]
    ToolMissing { operation: Operation, tool: String },

    #[error("{operation} failed: already exists.\n{detail}")]
    AlreadyExists { operation: Operation, detail: String },

    #[error("{operation} was rejected:\n{detail}")]
    Rejected { operation: Operation, detail: String },
}

impl OperationError {
    /// Build an error of the given cause. `ToolMissing` takes `detail` as the tool name.
    pub fn new(operation: Operation, cause: FailureCause, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match cause {
            FailureCause::HookRejected => Self::HookRejected { operation, detail },
            FailureCause::Network => Self::Network { operation, detail },
            FailureCause::Auth => Self::Auth { operation, detail },
            FailureCause::NotFound => Self::NotFound { operation, detail },
            FailureCause::ToolMissing => Self::ToolMissing {
                operation,
                tool: detail,
            },
            FailureCause::AlreadyExists => Self::AlreadyExists { operation, detail },
            FailureCause::Rejected => Self::Rejected { operation, detail },
        }
    }

    pub fn cause(&self) -> FailureCause {
        match self {
            Self::HookRejected { .. } => FailureCause::HookRejected,
            Self::Network { .. } => FailureCause::Network,
            Self::Auth { .. } => FailureCause::Auth,
            Self::NotFound { .. } => FailureCause::NotFound,
            Self::ToolMissing { .. } => FailureCause::ToolMissing,
            Self::AlreadyExists { .. } => FailureCause::AlreadyExists,
            Self::Rejected { .. } => FailureCause::Rejected,
        }
    }

    /// The collaborator output carried by this error (the tool name for `ToolMissing`).
    pub fn detail(&self) -> &str {
        match self {
            Self::ToolMissing { tool, .. } => tool,
            Self::HookRejected { detail, .. }
            | Self::Network { detail, .. }
            | Self::Auth { detail, .. }
            | Self::NotFound { detail, .. }
            | Self::AlreadyExists { detail, .. }
            | Self::Rejected { detail, .. } => detail,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::HookRejected { operation, .. }
            | Self::Network { operation, .. }
            | Self::Auth { operation, .. }
            | Self::NotFound { operation, .. }
            | Self::ToolMissing { operation, .. }
            | Self::AlreadyExists { operation, .. }
            | Self::Rejected { operation, .. } => *operation,
        }
    }
}

/// A user-supplied commit message does not follow Conventional Commits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Commit message is empty")]
    Empty,

    #[error("Commit header must look like `type(scope): description`, got '{0}'")]
    MalformedHeader(String),

    #[error(
        "Unknown commit type '{0}'. Use one of: feat, fix, docs, style, refactor, test, chore"
    )]
    UnknownType(String),

    #[error("Commit description is empty")]
    EmptyDescription,

    #[error("Commit description must start with a lowercase letter: '{0}'")]
    UppercaseDescription(String),

    #[error("Commit description must not end with a period: '{0}'")]
    TrailingPeriod(String),
}

/// Sensitive paths were found in the change set; staging waits for an override.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} file(s) look sensitive and will not be staged without confirmation", findings.len())]
pub struct SensitiveContentWarning {
    pub findings: Vec<SensitiveFinding>,
}

/// Errors from GitHub credential and repository discovery.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error(
        "GitHub authentication failed: no valid auth found. Run 'gh auth login' or set GITHUB_TOKEN environment variable"
    )]
    AuthenticationFailed,

    #[error("Failed to build GitHub client: {0}")]
    ClientBuild(#[source] Box<octocrab::Error>),

    #[error("Failed to parse repository URL '{0}'")]
    InvalidRepositoryUrl(String),
}

/// Errors from the user-interaction collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InteractionError {
    #[error("Prompt cancelled by user")]
    Cancelled,

    #[error("Terminal interaction failed: {0}")]
    Terminal(String),
}
