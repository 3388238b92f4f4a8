//! VCS collaborator: repository reads via git2, mutations via the `git` binary.

pub mod cli;
pub mod commits;

use std::fmt;

use crate::changeset::StatusEntry;
use crate::error::{BranchStateError, GitError, OperationError};

pub use cli::{GitCli, classify_git_failure};
pub use commits::UnpushedCommit;

/// Which side of the index a diff is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTarget {
    /// HEAD tree to index.
    Staged,
    /// Index to working tree, including untracked files.
    Unstaged,
}

impl fmt::Display for DiffTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffTarget::Staged => write!(f, "staged"),
            DiffTarget::Unstaged => write!(f, "unstaged"),
        }
    }
}

/// Version-control operations the workflow depends on.
///
/// Mutating methods return [`OperationError`] so their cause can be reported;
/// reads return [`GitError`].
#[cfg_attr(test, mockall::automock)]
pub trait Vcs {
    /// Paths with staged or unstaged changes, untracked files included.
    fn status(&self) -> Result<Vec<StatusEntry>, GitError>;

    fn current_branch(&self) -> Result<String, BranchStateError>;

    /// Unified-diff text for one side of the index.
    fn diff(&self, target: DiffTarget) -> Result<String, GitError>;

    /// Stage every path, or nothing.
    fn stage(&self, paths: &[String]) -> Result<(), OperationError>;

    /// Commit the index; returns the new commit id.
    fn commit(&self, message: &str) -> Result<String, OperationError>;

    /// Push `branch` to the configured remote. `attempt` starts at 1.
    fn push(&self, branch: &str, attempt: u32) -> Result<(), OperationError>;

    /// Commits on `branch` the remote does not have yet, newest first.
    fn unpushed_commits(&self, branch: &str) -> Result<Vec<UnpushedCommit>, GitError>;
}
