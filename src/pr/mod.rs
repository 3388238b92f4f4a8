//! Decide between reusing an open pull request and opening a new one.

pub mod body;

use tracing::debug;

use crate::error::OperationError;
use crate::github::Host;

pub use body::PullRequestDraft;

/// Pull requests are always opened against this branch.
pub const BASE_BRANCH: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// An open PR already tracks the branch; pushing was all that was needed.
    PrExists(String),
    NeedsCreate,
}

/// Ask the host, fresh, whether `branch` already has an open PR.
pub async fn reconcile<H: Host + ?Sized>(
    host: &H,
    branch: &str,
) -> Result<Reconciliation, OperationError> {
    let outcome = match host.find_pr(branch).await? {
        Some(record) if record.exists => Reconciliation::PrExists(record.url),
        _ => Reconciliation::NeedsCreate,
    };
    debug!(branch, ?outcome, "Reconciled pull request");
    Ok(outcome)
}
