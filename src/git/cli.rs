//! [`Vcs`] backed by a real repository.
//!
//! Reads (status, diff, branch, history) go through git2. Mutations shell out
//! to the system `git` binary so the user's hooks, credential helpers and SSH
//! agent apply exactly as they would on the command line.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{Delta, Diff, DiffFormat, DiffOptions, ErrorCode, Repository, Tree};
use tracing::{debug, info, warn};

use super::commits::{UnpushedCommit, fetch_unpushed};
use super::{DiffTarget, Vcs};
use crate::changeset::{FileStatus, StatusEntry};
use crate::error::{BranchStateError, FailureCause, GitError, Operation, OperationError};

/// Client-side hooks that can reject each operation.
const COMMIT_HOOKS: &[&str] = &["pre-commit", "prepare-commit-msg", "commit-msg"];
const PUSH_HOOKS: &[&str] = &["pre-push"];

pub struct GitCli {
    workdir: PathBuf,
    remote: String,
}

impl GitCli {
    /// Open the repository containing `path`.
    pub fn open(path: impl AsRef<Path>, remote: impl Into<String>) -> Result<Self, GitError> {
        let repo = Repository::discover(path.as_ref()).map_err(GitError::OpenRepository)?;
        let workdir = repo
            .workdir()
            .ok_or(GitError::BareRepository)?
            .to_path_buf();
        Ok(Self {
            workdir,
            remote: remote.into(),
        })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// URL of the configured remote, if the remote exists.
    pub fn remote_url(&self) -> Result<Option<String>, GitError> {
        let repo = self.repo()?;
        let url = match repo.find_remote(&self.remote) {
            Ok(remote) => remote.url().map(String::from),
            Err(e) if e.code() == ErrorCode::NotFound => None,
            Err(e) => return Err(GitError::ConfigFailed(e)),
        };
        Ok(url)
    }

    /// Paths `git add` can still match: present in the index or the working tree.
    /// Staged deletions and the old side of staged renames are already recorded.
    fn addable<'a>(&self, paths: &'a [String]) -> Result<Vec<&'a str>, OperationError> {
        let index = self
            .repo()
            .and_then(|repo| repo.index().map_err(GitError::StatusFailed))
            .map_err(|e| OperationError::new(Operation::Stage, FailureCause::Rejected, e.to_string()))?;

        Ok(paths
            .iter()
            .filter(|path| {
                index.get_path(Path::new(path.as_str()), 0).is_some()
                    || self.workdir.join(path.as_str()).symlink_metadata().is_ok()
            })
            .map(String::as_str)
            .collect())
    }

    // Reopened per call so the index reflects mutations made by `git`.
    fn repo(&self) -> Result<Repository, GitError> {
        Repository::open(&self.workdir).map_err(GitError::OpenRepository)
    }

    fn has_upstream(&self, branch: &str) -> bool {
        let Ok(repo) = self.repo() else {
            return false;
        };
        let Ok(config) = repo.config() else {
            return false;
        };
        config
            .get_string(&format!("branch.{}.remote", branch))
            .is_ok_and(|remote| !remote.trim().is_empty())
    }

    fn has_hook(&self, names: &[&str]) -> bool {
        let Ok(repo) = self.repo() else {
            return false;
        };
        let hooks_dir = repo
            .config()
            .ok()
            .and_then(|c| c.get_path("core.hooksPath").ok())
            .map(|p| if p.is_relative() { self.workdir.join(p) } else { p })
            .unwrap_or_else(|| repo.path().join("hooks"));
        names.iter().any(|name| hooks_dir.join(name).is_file())
    }

    /// Run `git` in the working directory, returning stdout.
    fn run_git(&self, args: &[&str], operation: Operation) -> Result<String, OperationError> {
        debug!(?args, %operation, "Running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    OperationError::new(operation, FailureCause::ToolMissing, "git")
                } else {
                    OperationError::new(
                        operation,
                        FailureCause::Rejected,
                        format!("Failed to run git: {}", e),
                    )
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let detail = if stderr.is_empty() { stdout } else { stderr };
            return Err(OperationError::new(
                operation,
                classify_git_failure(&detail),
                detail,
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Attribute an unexplained failure to a local hook when one is installed.
    fn blame_hook(&self, err: OperationError, hooks: &[&str]) -> OperationError {
        if err.cause() == FailureCause::Rejected && self.has_hook(hooks) {
            OperationError::new(err.operation(), FailureCause::HookRejected, err.detail())
        } else {
            err
        }
    }
}

impl Vcs for GitCli {
    fn status(&self) -> Result<Vec<StatusEntry>, GitError> {
        let repo = self.repo()?;
        let staged = staged_diff(&repo).map_err(GitError::StatusFailed)?;
        let unstaged = unstaged_diff(&repo, false).map_err(GitError::StatusFailed)?;

        let mut entries = Vec::new();
        collect_entries(&staged, &mut entries);
        collect_entries(&unstaged, &mut entries);

        // Stable sort keeps the staged entry first for paths changed on both sides.
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries.dedup_by(|later, earlier| later.path == earlier.path);
        Ok(entries)
    }

    fn current_branch(&self) -> Result<String, BranchStateError> {
        let repo = self
            .repo()
            .map_err(|e| BranchStateError::Unresolved(e.to_string()))?;
        let head = match repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                return Err(BranchStateError::Unborn);
            }
            Err(e) => return Err(BranchStateError::Unresolved(e.to_string())),
        };

        if !head.is_branch() {
            return Err(BranchStateError::Detached);
        }

        head.shorthand()
            .map(String::from)
            .ok_or_else(|| BranchStateError::Unresolved("branch name is not valid UTF-8".into()))
    }

    fn diff(&self, target: DiffTarget) -> Result<String, GitError> {
        let repo = self.repo()?;
        let diff = match target {
            DiffTarget::Staged => staged_diff(&repo),
            DiffTarget::Unstaged => unstaged_diff(&repo, true),
        }
        .map_err(GitError::DiffFailed)?;
        patch_text(&diff)
    }

    fn stage(&self, paths: &[String]) -> Result<(), OperationError> {
        if paths.is_empty() {
            return Err(OperationError::new(
                Operation::Stage,
                FailureCause::Rejected,
                "No files to stage",
            ));
        }

        let pending = self.addable(paths)?;
        if pending.is_empty() {
            debug!(files = paths.len(), "Changes already staged");
            return Ok(());
        }

        let mut args = vec!["add", "-A", "--"];
        args.extend(pending.iter().copied());
        info!(files = pending.len(), "Staging files");
        self.run_git(&args, Operation::Stage)?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String, OperationError> {
        info!("Creating commit");
        self.run_git(&["commit", "-m", message], Operation::Commit)
            .map_err(|e| self.blame_hook(e, COMMIT_HOOKS))?;

        let id = self.run_git(&["rev-parse", "HEAD"], Operation::Commit)?;
        Ok(id.trim().to_string())
    }

    fn push(&self, branch: &str, attempt: u32) -> Result<(), OperationError> {
        let set_upstream = !self.has_upstream(branch);
        info!(attempt, remote = %self.remote, branch, set_upstream, "Pushing branch");

        let mut args = vec!["push"];
        if set_upstream {
            args.push("-u");
        }
        args.push(self.remote.as_str());
        args.push(branch);

        match self.run_git(&args, Operation::Push) {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(attempt, cause = %e.cause(), "Push failed");
                Err(self.blame_hook(e, PUSH_HOOKS))
            }
        }
    }

    fn unpushed_commits(&self, branch: &str) -> Result<Vec<UnpushedCommit>, GitError> {
        let repo = self.repo()?;
        fetch_unpushed(&repo, &self.remote, branch)
    }
}

/// Map raw `git` error output to a failure cause.
pub fn classify_git_failure(output: &str) -> FailureCause {
    let lower = output.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if has(&["hook declined", "hook failed", "pre-receive hook", "pre-push hook"]) {
        FailureCause::HookRejected
    } else if has(&[
        "authentication failed",
        "permission denied",
        "could not read username",
        "invalid username or password",
        "terminal prompts disabled",
        "403",
    ]) {
        FailureCause::Auth
    } else if has(&[
        "could not resolve host",
        "unable to access",
        "connection refused",
        "connection timed out",
        "operation timed out",
        "network is unreachable",
        "connection reset",
    ]) {
        FailureCause::Network
    } else if has(&[
        "repository not found",
        "does not appear to be a git repository",
        "no such remote",
    ]) {
        FailureCause::NotFound
    } else {
        FailureCause::Rejected
    }
}

/// Resolve the HEAD tree, treating an unborn branch as "no tree".
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, git2::Error> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    Ok(Some(head_ref.peel_to_tree()?))
}

fn staged_diff(repo: &Repository) -> Result<Diff<'_>, git2::Error> {
    let head_tree = resolve_head_tree(repo)?;
    let mut diff = repo.diff_tree_to_index(head_tree.as_ref(), None, None)?;
    diff.find_similar(None)?;
    Ok(diff)
}

fn unstaged_diff(repo: &Repository, with_content: bool) -> Result<Diff<'_>, git2::Error> {
    let mut opts = DiffOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .show_untracked_content(with_content);
    repo.diff_index_to_workdir(None, Some(&mut opts))
}

fn collect_entries(diff: &Diff<'_>, entries: &mut Vec<StatusEntry>) {
    for delta in diff.deltas() {
        let status = match delta.status() {
            Delta::Added | Delta::Untracked | Delta::Copied => FileStatus::Added,
            Delta::Deleted => FileStatus::Deleted,
            Delta::Renamed => FileStatus::Renamed,
            Delta::Unmodified | Delta::Ignored => continue,
            _ => FileStatus::Modified,
        };

        let new_path = delta
            .new_file()
            .path()
            .map(|p| p.to_string_lossy().to_string());
        let old_path = delta
            .old_file()
            .path()
            .map(|p| p.to_string_lossy().to_string());

        let (path, old_path) = match status {
            FileStatus::Renamed => (new_path.clone().or_else(|| old_path.clone()), old_path),
            _ => (new_path.or(old_path), None),
        };

        if let Some(path) = path.filter(|p| !p.is_empty()) {
            entries.push(StatusEntry {
                path,
                status,
                old_path,
            });
        }
    }
}

/// Render a diff as unified patch text.
fn patch_text(diff: &Diff<'_>) -> Result<String, GitError> {
    let mut text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        match origin {
            '+' | '-' | ' ' => text.push(origin),
            'F' | 'H' => {}
            _ => return true,
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })
    .map_err(GitError::DiffFailed)?;
    Ok(text)
}
