//! Host collaborator: pull-request lookup and creation on GitHub.

pub mod auth;
pub mod prs;

use async_trait::async_trait;

use crate::error::OperationError;

pub use auth::{get_github_token, gh_installed};
pub use prs::{GitHubHost, classify_api_failure, parse_github_remote};

/// An open pull request bound to a branch, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrRecord {
    pub url: String,
    pub branch: String,
    pub exists: bool,
}

/// Code-hosting operations the workflow depends on.
///
/// Nothing is cached: every call reflects the host's current state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Host: Send + Sync {
    /// Whether some way of talking to the host is installed or configured.
    fn tool_available(&self) -> bool;

    /// Whether the configured credentials are accepted by the host.
    async fn authenticated(&self) -> bool;

    /// The open pull request whose head is `branch`, if any.
    async fn find_pr(&self, branch: &str) -> Result<Option<PrRecord>, OperationError>;

    /// Open a pull request from `head` into `base`; returns its URL.
    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<String, OperationError>;
}
