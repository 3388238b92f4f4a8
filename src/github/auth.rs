//! GitHub credential discovery.
//!
//! Order:
//! 1. `gh auth token` when `gh auth status` succeeds
//! 2. GITHUB_TOKEN env var
//! 3. GH_TOKEN env var

use std::env;
use std::process::Command;

use tracing::debug;

use crate::error::GitHubError;

/// Get a GitHub token from the gh CLI or the environment.
pub fn get_github_token() -> Result<String, GitHubError> {
    if let Some(token) = get_token_from_gh_cli() {
        debug!("Using GitHub token from gh CLI");
        return Ok(token);
    }

    for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Ok(token) = env::var(var)
            && !token.trim().is_empty()
        {
            debug!(var, "Using GitHub token from environment");
            return Ok(token.trim().to_string());
        }
    }

    Err(GitHubError::AuthenticationFailed)
}

/// Whether the `gh` CLI is on PATH.
pub fn gh_installed() -> bool {
    which::which("gh").is_ok()
}

fn get_token_from_gh_cli() -> Option<String> {
    let status = Command::new("gh").args(["auth", "status"]).output().ok()?;
    if !status.status.success() {
        return None;
    }

    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    if !output.status.success() {
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}
