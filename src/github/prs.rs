//! Pull-request lookup and creation via octocrab.

use async_trait::async_trait;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{Host, PrRecord, auth};
use crate::error::{FailureCause, GitHubError, Operation, OperationError};

/// Subset of the pulls API response we read.
#[derive(Debug, Deserialize)]
struct PullSummary {
    html_url: String,
    head: PullHead,
}

#[derive(Debug, Deserialize)]
struct PullHead {
    #[serde(rename = "ref")]
    ref_name: String,
}

#[derive(Debug, Serialize)]
struct ListParams<'a> {
    head: &'a str,
    state: &'a str,
}

#[derive(Debug, Serialize)]
struct CreatePull<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedPull {
    html_url: String,
}

/// [`Host`] backed by the GitHub REST API.
pub struct GitHubHost {
    client: Option<Octocrab>,
    repository: Option<(String, String)>,
    gh_installed: bool,
}

impl GitHubHost {
    /// Build a host for the repository behind `remote_url`.
    ///
    /// Missing credentials or a non-GitHub remote are not errors here; they
    /// surface from [`Host::authenticated`] and [`Host::find_pr`].
    pub fn new(remote_url: Option<&str>, api_base: Option<&str>) -> Result<Self, GitHubError> {
        let repository = match remote_url.map(parse_github_remote) {
            Some(Ok(pair)) => Some(pair),
            Some(Err(e)) => {
                warn!("{}", e);
                None
            }
            None => None,
        };

        let client = match auth::get_github_token() {
            Ok(token) => {
                let mut builder = Octocrab::builder().personal_token(token);
                if let Some(base) = api_base {
                    builder = builder
                        .base_uri(base)
                        .map_err(|e| GitHubError::ClientBuild(Box::new(e)))?;
                }
                Some(
                    builder
                        .build()
                        .map_err(|e| GitHubError::ClientBuild(Box::new(e)))?,
                )
            }
            Err(e) => {
                debug!("{}", e);
                None
            }
        };

        Ok(Self {
            client,
            repository,
            gh_installed: auth::gh_installed(),
        })
    }

    /// Use a pre-configured client (tests point it at a mock server).
    pub fn with_client(client: Octocrab, owner: &str, repo: &str) -> Self {
        Self {
            client: Some(client),
            repository: Some((owner.to_string(), repo.to_string())),
            gh_installed: false,
        }
    }

    fn client(&self, operation: Operation) -> Result<&Octocrab, OperationError> {
        self.client.as_ref().ok_or_else(|| {
            OperationError::new(
                operation,
                FailureCause::Auth,
                GitHubError::AuthenticationFailed.to_string(),
            )
        })
    }

    fn repository(&self, operation: Operation) -> Result<(&str, &str), OperationError> {
        self.repository
            .as_ref()
            .map(|(owner, repo)| (owner.as_str(), repo.as_str()))
            .ok_or_else(|| {
                OperationError::new(
                    operation,
                    FailureCause::NotFound,
                    "the push remote is not a GitHub repository",
                )
            })
    }
}

#[async_trait]
impl Host for GitHubHost {
    fn tool_available(&self) -> bool {
        self.gh_installed || self.client.is_some()
    }

    async fn authenticated(&self) -> bool {
        let Some(client) = self.client.as_ref() else {
            return false;
        };
        match client
            .get::<serde_json::Value, _, ()>("/user", None::<&()>)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!("GitHub credential check failed: {}", e);
                false
            }
        }
    }

    async fn find_pr(&self, branch: &str) -> Result<Option<PrRecord>, OperationError> {
        let operation = Operation::FindPullRequest;
        let client = self.client(operation)?;
        let (owner, repo) = self.repository(operation)?;

        let head = format!("{}:{}", owner, branch);
        let params = ListParams {
            head: &head,
            state: "open",
        };
        let pulls: Vec<PullSummary> = client
            .get(format!("/repos/{}/{}/pulls", owner, repo), Some(&params))
            .await
            .map_err(|e| api_error(operation, &e))?;

        let record = pulls
            .into_iter()
            .find(|p| p.head.ref_name == branch)
            .map(|p| PrRecord {
                url: p.html_url,
                branch: branch.to_string(),
                exists: true,
            });
        debug!(branch, found = record.is_some(), "Pull request lookup");
        Ok(record)
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<String, OperationError> {
        let operation = Operation::CreatePullRequest;
        let client = self.client(operation)?;
        let (owner, repo) = self.repository(operation)?;

        let request = CreatePull {
            title,
            head,
            base,
            body,
        };
        let created: CreatedPull = client
            .post(format!("/repos/{}/{}/pulls", owner, repo), Some(&request))
            .await
            .map_err(|e| api_error(operation, &e))?;

        info!(url = %created.html_url, "Pull request created");
        Ok(created.html_url)
    }
}

fn api_error(operation: Operation, err: &octocrab::Error) -> OperationError {
    let display = err.to_string();
    let debug = format!("{:?}", err);
    let cause = classify_api_failure(&display, &debug);
    OperationError::new(operation, cause, display)
}

/// Map an octocrab error to a failure cause.
///
/// Checks both Display and Debug output, since octocrab nests the GitHub
/// message and validation errors at different levels.
pub fn classify_api_failure(display: &str, debug: &str) -> FailureCause {
    let text = format!("{}\n{}", display, debug).to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| text.contains(n));

    if has(&["already exists"]) {
        FailureCause::AlreadyExists
    } else if has(&[
        "bad credentials",
        "requires authentication",
        "resource not accessible",
        "status_code: 401",
    ]) {
        FailureCause::Auth
    } else if has(&["not found", "status_code: 404"]) {
        FailureCause::NotFound
    } else if has(&[
        "error trying to connect",
        "connection refused",
        "dns error",
        "timed out",
        "hyper",
    ]) {
        FailureCause::Network
    } else {
        FailureCause::Rejected
    }
}

/// Extract owner and repo from a git remote URL.
pub fn parse_github_remote(url: &str) -> Result<(String, String), GitHubError> {
    let invalid = || GitHubError::InvalidRepositoryUrl(url.to_string());

    // git@github.com:owner/repo.git
    if let Some(path) = url.strip_prefix("git@github.com:") {
        return parse_owner_repo_path(path).ok_or_else(invalid);
    }

    // https://github.com/owner/repo.git, ssh://git@github.com/owner/repo
    if let Some(path) = url.split("github.com/").nth(1) {
        return parse_owner_repo_path(path).ok_or_else(invalid);
    }

    Err(invalid())
}

fn parse_owner_repo_path(path: &str) -> Option<(String, String)> {
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut parts = path.split('/');
    match (parts.next(), parts.next()) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
            Some((owner.to_string(), repo.to_string()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ssh_url() {
        let (owner, repo) = parse_github_remote("git@github.com:owner/repo.git").unwrap();
        assert_eq!(owner, "owner");
        assert_eq!(repo, "repo");
    }

    #[test]
    fn test_parse_https_url() {
        let (owner, repo) = parse_github_remote("https://github.com/owner/repo.git").unwrap();
        assert_eq!((owner.as_str(), repo.as_str()), ("owner", "repo"));
    }

    #[test]
    fn test_parse_https_url_no_git_suffix() {
        let (owner, repo) = parse_github_remote("https://github.com/owner/repo/").unwrap();
        assert_eq!((owner.as_str(), repo.as_str()), ("owner", "repo"));
    }

    #[test]
    fn test_parse_invalid_url() {
        assert!(matches!(
            parse_github_remote("https://gitlab.com/owner/repo"),
            Err(GitHubError::InvalidRepositoryUrl(_))
        ));
        assert!(parse_github_remote("https://github.com/owner").is_err());
    }

    #[test]
    fn test_classify_already_exists() {
        let debug = r#"GitHub { source: GitHubError { status_code: 422, message: "Validation Failed", errors: Some([Object {"message": String("A pull request already exists for owner:feature.")}]) } }"#;
        assert_eq!(
            classify_api_failure("GitHub: Validation Failed", debug),
            FailureCause::AlreadyExists
        );
    }

    #[test]
    fn test_classify_bad_credentials() {
        assert_eq!(
            classify_api_failure("GitHub: Bad credentials", "status_code: 401"),
            FailureCause::Auth
        );
    }

    #[test]
    fn test_classify_not_found() {
        assert_eq!(
            classify_api_failure("GitHub: Not Found", "status_code: 404"),
            FailureCause::NotFound
        );
    }

    #[test]
    fn test_classify_connection_error() {
        assert_eq!(
            classify_api_failure(
                "Error in the HTTP client",
                "Hyper { source: hyper_util::client::legacy::Error(Connect, ConnectError(\"tcp connect error\", Os { code: 111, kind: ConnectionRefused, message: \"Connection refused\" })) }"
            ),
            FailureCause::Network
        );
    }

    #[test]
    fn test_classify_other_rejection() {
        assert_eq!(
            classify_api_failure(
                "GitHub: Validation Failed",
                "status_code: 422, message: \"No commits between main and feature\""
            ),
            FailureCause::Rejected
        );
    }

    #[test]
    fn test_host_without_repository_reports_not_found() {
        let host = GitHubHost {
            client: None,
            repository: None,
            gh_installed: false,
        };
        assert!(!host.tool_available());
        assert!(matches!(
            host.repository(Operation::FindPullRequest),
            Err(OperationError::NotFound { .. })
        ));
    }
}
