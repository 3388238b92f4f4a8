//! Commits on the current branch that have not reached the remote.

use std::fmt;

use git2::{Commit, ErrorCode, Repository};

use crate::error::GitError;

/// Length of the abbreviated commit id shown to users.
const SHORT_ID_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpushedCommit {
    pub id: String,
    pub summary: String,
}

impl UnpushedCommit {
    pub fn from_git2_commit(commit: &Commit) -> Self {
        Self {
            id: commit.id().to_string(),
            summary: commit.summary().unwrap_or("").to_string(),
        }
    }

    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(SHORT_ID_LEN)]
    }
}

impl fmt::Display for UnpushedCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.short_id(), self.summary)
    }
}

/// Walk from the branch tip, hiding everything reachable from the remote.
///
/// When `refs/remotes/<remote>/<branch>` exists only that ref is hidden;
/// otherwise every ref of the remote is, so a new branch lists just the
/// commits it adds on top of what the remote already has.
pub fn fetch_unpushed(
    repo: &Repository,
    remote: &str,
    branch: &str,
) -> Result<Vec<UnpushedCommit>, GitError> {
    let tip = match repo.revparse_single(&format!("refs/heads/{}", branch)) {
        Ok(obj) => obj.id(),
        Err(e) if e.code() == ErrorCode::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(GitError::RevwalkError(e)),
    };

    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk.push(tip).map_err(GitError::RevwalkError)?;

    let upstream = format!("refs/remotes/{}/{}", remote, branch);
    if repo.find_reference(&upstream).is_ok() {
        revwalk.hide_ref(&upstream).map_err(GitError::RevwalkError)?;
    } else {
        revwalk
            .hide_glob(&format!("refs/remotes/{}/*", remote))
            .map_err(GitError::RevwalkError)?;
    }

    let mut commits = Vec::new();
    for oid_result in revwalk {
        let oid = oid_result.map_err(GitError::RevwalkError)?;
        let commit = repo.find_commit(oid).map_err(GitError::RevwalkError)?;
        commits.push(UnpushedCommit::from_git2_commit(&commit));
    }

    Ok(commits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit_file(repo: &Repository, name: &str, message: &str) -> git2::Oid {
        let workdir = repo.workdir().unwrap().to_path_buf();
        std::fs::write(workdir.join(name), message).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(std::path::Path::new(name)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = git2::Signature::now("Test", "test@test.com").unwrap();
        let parents: Vec<Commit> = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parent_refs: Vec<&Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    fn current_branch(repo: &Repository) -> String {
        repo.head().unwrap().shorthand().unwrap().to_string()
    }

    #[test]
    fn test_all_commits_are_unpushed_without_remote_refs() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "a.txt", "first");
        commit_file(&repo, "b.txt", "second");

        let branch = current_branch(&repo);
        let commits = fetch_unpushed(&repo, "origin", &branch).unwrap();
        let summaries: Vec<&str> = commits.iter().map(|c| c.summary.as_str()).collect();
        assert_eq!(summaries, vec!["second", "first"]);
    }

    #[test]
    fn test_remote_tracking_ref_hides_pushed_commits() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let pushed = commit_file(&repo, "a.txt", "pushed");
        let branch = current_branch(&repo);
        repo.reference(
            &format!("refs/remotes/origin/{}", branch),
            pushed,
            true,
            "test",
        )
        .unwrap();
        commit_file(&repo, "b.txt", "local only");

        let commits = fetch_unpushed(&repo, "origin", &branch).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].summary, "local only");
        assert_eq!(commits[0].short_id().len(), 7);
    }

    #[test]
    fn test_missing_branch_has_no_unpushed_commits() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "a.txt", "first");
        assert!(fetch_unpushed(&repo, "origin", "no-such-branch").unwrap().is_empty());
    }
}
