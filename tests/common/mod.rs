//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use git2::{Oid, Repository, RepositoryInitOptions, Signature};

use courier::changeset::{FileStatus, StatusEntry};
use courier::error::{
    BranchStateError, FailureCause, GitError, InteractionError, Operation, OperationError,
};
use courier::git::{DiffTarget, UnpushedCommit, Vcs};
use courier::github::{Host, PrRecord};
use courier::interaction::{Interaction, Reply};

/// Patch adding a new exported React component.
pub const HERO_PATCH: &str = "diff --git a/app/components/Hero.tsx b/app/components/Hero.tsx
new file mode 100644
--- /dev/null
+++ b/app/components/Hero.tsx
@@ -0,0 +1,5 @@
+export function Hero() {
+  return (
+    <section className=\"hero\"><button>Get started</button></section>
+  );
+}
";

/// Patch bumping one dependency in package.json.
pub const PACKAGE_BUMP_PATCH: &str = "diff --git a/package.json b/package.json
--- a/package.json
+++ b/package.json
@@ -5,7 +5,7 @@
   \"dependencies\": {
     \"next\": \"14.1.0\",
-    \"react\": \"18.2.0\",
+    \"react\": \"18.3.1\",
     \"react-dom\": \"18.2.0\"
   }
 }
";

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty repository on `main` with a committer identity configured.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts).expect("Failed to init git repo");

        let mut config = repo.config().expect("Failed to open config");
        config.set_str("user.name", "Test User").expect("Failed to set name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Failed to set email");
        config
            .set_bool("commit.gpgsign", false)
            .expect("Failed to disable signing");

        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write a file relative to the repository root, creating parent directories.
    pub fn write(&self, path: &str, content: &str) {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(full, content).expect("Failed to write file");
    }

    /// Stage everything in the working tree and commit it. Returns the commit OID.
    pub fn commit_all(&self, message: &str) -> Oid {
        let sig = self.signature();

        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .expect("Failed to add files");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a branch at HEAD and check it out.
    pub fn checkout_new_branch(&self, name: &str) {
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Failed to resolve HEAD");
        self.repo.branch(name, &head, false).expect("Failed to create branch");
        self.repo
            .set_head(&format!("refs/heads/{}", name))
            .expect("Failed to switch branch");
    }

    /// Point HEAD directly at a commit.
    pub fn detach(&self, oid: Oid) {
        self.repo.set_head_detached(oid).expect("Failed to detach HEAD");
    }

    /// Create a bare repository and register it as remote `name`.
    ///
    /// The returned directory must outlive the test.
    pub fn add_bare_remote(&self, name: &str) -> tempfile::TempDir {
        let remote_dir = tempfile::tempdir().expect("Failed to create remote directory");
        Repository::init_bare(remote_dir.path()).expect("Failed to init bare repo");
        let url = remote_dir
            .path()
            .to_str()
            .expect("temp path is valid UTF-8")
            .to_string();
        self.repo.remote(name, &url).expect("Failed to add remote");
        remote_dir
    }

    /// Install an executable client-side hook.
    #[cfg(unix)]
    pub fn install_hook(&self, name: &str, script: &str) {
        use std::os::unix::fs::PermissionsExt;

        let path = self.repo.path().join("hooks").join(name);
        std::fs::create_dir_all(path.parent().expect("hook has a parent"))
            .expect("Failed to create hooks dir");
        std::fs::write(&path, script).expect("Failed to write hook");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to mark hook executable");
    }
}

/// Whether the `git` binary is available for tests that shell out.
pub fn git_available() -> bool {
    which::which("git").is_ok()
}

#[derive(Default)]
struct VcsState {
    branch: Option<Result<String, BranchStateError>>,
    dirty: Vec<(StatusEntry, String)>,
    staged: Vec<String>,
    commits: Vec<String>,
    pushed: usize,
    push_failures: u32,
    push_attempts: Vec<u32>,
    commit_error: Option<OperationError>,
}

/// In-memory repository. Committing clears the working tree; pushing
/// publishes every commit.
///
/// Clones share state, so a second workflow run sees the first one's effects.
#[derive(Clone, Default)]
pub struct FakeVcs {
    state: Rc<RefCell<VcsState>>,
}

impl FakeVcs {
    pub fn on_branch(branch: &str) -> Self {
        let vcs = Self::default();
        vcs.state.borrow_mut().branch = Some(Ok(branch.to_string()));
        vcs
    }

    pub fn with_branch_error(error: BranchStateError) -> Self {
        let vcs = Self::default();
        vcs.state.borrow_mut().branch = Some(Err(error));
        vcs
    }

    /// Add a dirty path with its unified-diff text.
    pub fn with_change(self, path: &str, status: FileStatus, patch: &str) -> Self {
        self.state
            .borrow_mut()
            .dirty
            .push((StatusEntry::new(path, status), patch.to_string()));
        self
    }

    /// Fail the next `count` pushes with a network error.
    pub fn failing_pushes(self, count: u32) -> Self {
        self.state.borrow_mut().push_failures = count;
        self
    }

    pub fn failing_commit(self, error: OperationError) -> Self {
        self.state.borrow_mut().commit_error = Some(error);
        self
    }

    pub fn staged(&self) -> Vec<String> {
        self.state.borrow().staged.clone()
    }

    pub fn commits(&self) -> Vec<String> {
        self.state.borrow().commits.clone()
    }

    pub fn push_attempts(&self) -> Vec<u32> {
        self.state.borrow().push_attempts.clone()
    }

    pub fn is_clean(&self) -> bool {
        self.state.borrow().dirty.is_empty()
    }
}

impl Vcs for FakeVcs {
    fn status(&self) -> Result<Vec<StatusEntry>, GitError> {
        Ok(self
            .state
            .borrow()
            .dirty
            .iter()
            .map(|(entry, _)| entry.clone())
            .collect())
    }

    fn current_branch(&self) -> Result<String, BranchStateError> {
        match &self.state.borrow().branch {
            Some(branch) => branch.clone(),
            None => Err(BranchStateError::Unborn),
        }
    }

    fn diff(&self, target: DiffTarget) -> Result<String, GitError> {
        match target {
            DiffTarget::Staged => Ok(String::new()),
            DiffTarget::Unstaged => Ok(self
                .state
                .borrow()
                .dirty
                .iter()
                .map(|(_, patch)| patch.as_str())
                .collect()),
        }
    }

    fn stage(&self, paths: &[String]) -> Result<(), OperationError> {
        self.state.borrow_mut().staged.extend(paths.iter().cloned());
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String, OperationError> {
        let mut state = self.state.borrow_mut();
        if let Some(err) = state.commit_error.take() {
            return Err(err);
        }
        state.commits.push(message.to_string());
        state.dirty.clear();
        Ok(format!("{:040x}", state.commits.len()))
    }

    fn push(&self, _branch: &str, attempt: u32) -> Result<(), OperationError> {
        let mut state = self.state.borrow_mut();
        state.push_attempts.push(attempt);
        if state.push_failures > 0 {
            state.push_failures -= 1;
            return Err(OperationError::new(
                Operation::Push,
                FailureCause::Network,
                "fatal: unable to access 'https://github.com/o/r.git/': Could not resolve host: github.com",
            ));
        }
        state.pushed = state.commits.len();
        Ok(())
    }

    fn unpushed_commits(&self, _branch: &str) -> Result<Vec<UnpushedCommit>, GitError> {
        let state = self.state.borrow();
        Ok(state.commits[state.pushed..]
            .iter()
            .enumerate()
            .rev()
            .map(|(i, summary)| UnpushedCommit {
                id: format!("{:040x}", state.pushed + i + 1),
                summary: summary.clone(),
            })
            .collect())
    }
}

struct HostState {
    tool_available: bool,
    authenticated: bool,
    prs: Vec<PrRecord>,
    created: Vec<(String, String, String, String)>,
    lookups: usize,
    /// Another client opens the PR between our lookup and our create.
    race_on_create: bool,
}

/// In-memory GitHub. Clones share state.
#[derive(Clone)]
pub struct FakeHost {
    state: Arc<Mutex<HostState>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HostState {
                tool_available: true,
                authenticated: true,
                prs: Vec::new(),
                created: Vec::new(),
                lookups: 0,
                race_on_create: false,
            })),
        }
    }

    pub fn with_open_pr(self, branch: &str, url: &str) -> Self {
        self.state.lock().unwrap().prs.push(PrRecord {
            url: url.to_string(),
            branch: branch.to_string(),
            exists: true,
        });
        self
    }

    pub fn without_tool(self) -> Self {
        self.state.lock().unwrap().tool_available = false;
        self
    }

    pub fn unauthenticated(self) -> Self {
        self.state.lock().unwrap().authenticated = false;
        self
    }

    pub fn racing_create(self) -> Self {
        self.state.lock().unwrap().race_on_create = true;
        self
    }

    /// `(head, base, title, body)` for every PR this host opened.
    pub fn created(&self) -> Vec<(String, String, String, String)> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn open_prs(&self) -> Vec<PrRecord> {
        self.state.lock().unwrap().prs.clone()
    }

    pub fn lookups(&self) -> usize {
        self.state.lock().unwrap().lookups
    }
}

#[async_trait]
impl Host for FakeHost {
    fn tool_available(&self) -> bool {
        self.state.lock().unwrap().tool_available
    }

    async fn authenticated(&self) -> bool {
        self.state.lock().unwrap().authenticated
    }

    async fn find_pr(&self, branch: &str) -> Result<Option<PrRecord>, OperationError> {
        let mut state = self.state.lock().unwrap();
        state.lookups += 1;
        Ok(state.prs.iter().find(|pr| pr.branch == branch).cloned())
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<String, OperationError> {
        let mut state = self.state.lock().unwrap();
        if state.race_on_create && !state.prs.iter().any(|pr| pr.branch == head) {
            state.prs.push(PrRecord {
                url: "https://github.com/o/r/pull/99".to_string(),
                branch: head.to_string(),
                exists: true,
            });
        }
        if state.prs.iter().any(|pr| pr.branch == head) {
            return Err(OperationError::new(
                Operation::CreatePullRequest,
                FailureCause::AlreadyExists,
                format!("A pull request already exists for o:{}.", head),
            ));
        }

        let url = format!("https://github.com/o/r/pull/{}", state.prs.len() + 1);
        state.prs.push(PrRecord {
            url: url.clone(),
            branch: head.to_string(),
            exists: true,
        });
        state.created.push((
            head.to_string(),
            base.to_string(),
            title.to_string(),
            body.to_string(),
        ));
        Ok(url)
    }
}

/// Answers prompts from a fixed script; an exhausted script cancels.
#[derive(Default)]
pub struct ScriptedInteraction {
    replies: VecDeque<Reply>,
    pub questions: Vec<String>,
    pub lists: Vec<(String, Vec<String>)>,
    pub errors: Vec<String>,
}

impl ScriptedInteraction {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: replies.into(),
            ..Default::default()
        }
    }

    pub fn yes(count: usize) -> Self {
        Self::new(vec![Reply::Yes; count])
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }

    pub fn listed(&self, title: &str) -> Option<&Vec<String>> {
        self.lists
            .iter()
            .find(|(t, _)| t.starts_with(title))
            .map(|(_, items)| items)
    }
}

impl Interaction for ScriptedInteraction {
    fn confirm(&mut self, prompt: &str, _allow_custom: bool) -> Result<Reply, InteractionError> {
        self.questions.push(prompt.to_string());
        self.replies.pop_front().ok_or(InteractionError::Cancelled)
    }

    fn present_list(&mut self, title: &str, items: &[String]) {
        self.lists.push((title.to_string(), items.to_vec()));
    }

    fn present_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}
