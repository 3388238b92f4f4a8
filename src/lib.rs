//! courier - turn working-tree changes into a conventional commit, push it,
//! and open or reuse the pull request.
//!
//! # Overview
//!
//! courier classifies the current diff into a Conventional Commits message,
//! gates staging on a sensitive-file scan, then commits, pushes and reconciles
//! the branch's pull request on GitHub. Each step that mutates the repository
//! or the remote waits for confirmation first.

pub mod changeset;
pub mod classify;
pub mod commit;
pub mod error;
pub mod git;
pub mod github;
pub mod interaction;
pub mod pr;
pub mod sensitive;
pub mod workflow;

// Re-export commonly used types
pub use changeset::{ChangeSet, FileChange, FileStatus};
pub use classify::{ChangeSummary, classify};
pub use commit::CommitType;
pub use error::{
    BranchStateError, FailureCause, GitError, GitHubError, InteractionError, OperationError,
    SensitiveContentWarning, ValidationError,
};
pub use sensitive::{SensitiveFinding, SensitiveReason};
pub use workflow::{Outcome, Workflow, WorkflowConfig, WorkflowState};
