//! The commit → push → pull request state machine.
//!
//! [`Workflow::step`] advances one transition at a time and returns either
//! [`Step::Continue`], a [`Prompt`] it is suspended on, or the terminal
//! [`Outcome`]. [`Workflow::drive`] is the loop that feeds prompts to an
//! [`Interaction`] and answers back into `step`.

pub mod preview;
pub mod prompt;
pub mod state;

use tracing::{debug, info, warn};

use crate::changeset::{ChangeSet, StatusEntry};
use crate::classify::{self, ChangeSummary};
use crate::commit;
use crate::error::{FailureCause, InteractionError, Operation, OperationError};
use crate::git::Vcs;
use crate::github::Host;
use crate::interaction::{Interaction, Reply};
use crate::pr::{self, PullRequestDraft, Reconciliation};
use crate::sensitive;

pub use preview::{Preview, preview};
pub use prompt::{Notice, Prompt};
pub use state::{Outcome, WorkflowState};

/// Settings for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Remote pushed to; only used for messages, the VCS owns the push target.
    pub remote: String,
    pub base_branch: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            base_branch: pr::BASE_BRANCH.to_string(),
        }
    }
}

/// Result of a single transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue,
    Await(Prompt),
    Finished(Outcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    CheckStatus,
    CheckBranch,
    Classify,
    ConfirmMessage,
    AcceptInvalid { message: String, error: String },
    Scan,
    Override,
    ConfirmStaging,
    Stage,
    Commit,
    Push,
    RetryPush { error: String },
    Reconcile,
    Done,
}

pub struct Workflow<V, H> {
    vcs: V,
    host: H,
    config: WorkflowConfig,
    phase: Phase,
    state: Option<WorkflowState>,
    outcome: Option<Outcome>,
    notices: Vec<Notice>,
    branch: String,
    status: Vec<StatusEntry>,
    change_set: ChangeSet,
    summary: Option<ChangeSummary>,
    suggestion: String,
    message: String,
    commit: Option<String>,
    push_attempts: u32,
}

impl<V: Vcs, H: Host> Workflow<V, H> {
    pub fn new(vcs: V, host: H, config: WorkflowConfig) -> Self {
        Self {
            vcs,
            host,
            config,
            phase: Phase::CheckStatus,
            state: None,
            outcome: None,
            notices: Vec::new(),
            branch: String::new(),
            status: Vec::new(),
            change_set: ChangeSet::default(),
            summary: None,
            suggestion: String::new(),
            message: String::new(),
            commit: None,
            push_attempts: 0,
        }
    }

    /// Current state; `None` until the status check has run.
    pub fn state(&self) -> Option<WorkflowState> {
        self.state
    }

    pub fn push_attempts(&self) -> u32 {
        self.push_attempts
    }

    /// Notices produced since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Advance one transition. `reply` answers the prompt returned by the
    /// previous call and is ignored otherwise.
    pub async fn step(&mut self, reply: Option<Reply>) -> Step {
        if let Some(outcome) = &self.outcome {
            return Step::Finished(outcome.clone());
        }

        match self.phase.clone() {
            Phase::CheckStatus => self.check_status(),
            Phase::CheckBranch => self.check_branch(),
            Phase::Classify => self.suggest(),
            Phase::ConfirmMessage => match reply {
                None | Some(Reply::No) => Step::Await(self.message_prompt()),
                Some(Reply::Yes) => {
                    self.message = self.suggestion.clone();
                    self.phase = Phase::Scan;
                    Step::Continue
                }
                Some(Reply::Custom(text)) => self.custom_message(text),
            },
            Phase::AcceptInvalid { message, error } => match reply {
                None => Step::Await(Prompt::AcceptInvalidMessage { message, error }),
                Some(Reply::Yes) => {
                    warn!(%error, "Using commit message that failed validation");
                    self.message = message;
                    self.phase = Phase::Scan;
                    Step::Continue
                }
                Some(Reply::No) => {
                    self.phase = Phase::ConfirmMessage;
                    Step::Await(self.message_prompt())
                }
                Some(Reply::Custom(text)) => self.custom_message(text),
            },
            Phase::Scan => self.scan(),
            Phase::Override => match reply {
                None => Step::Await(self.override_prompt()),
                Some(Reply::Yes) => {
                    warn!(
                        findings = sensitive::scan(&self.change_set).len(),
                        "Sensitive files overridden by user"
                    );
                    self.staging_prompt()
                }
                Some(_) => self.finish(Outcome::new(
                    WorkflowState::Aborted,
                    "Aborted. Sensitive files were not staged.",
                )),
            },
            Phase::ConfirmStaging => match reply {
                None => self.staging_prompt(),
                Some(Reply::Yes) => {
                    self.phase = Phase::Stage;
                    Step::Continue
                }
                Some(_) => self.finish(Outcome::new(
                    WorkflowState::Aborted,
                    "Aborted. Nothing was staged.",
                )),
            },
            Phase::Stage => self.stage(),
            Phase::Commit => self.commit(),
            Phase::Push => self.push(),
            Phase::RetryPush { error } => match reply {
                None => Step::Await(Prompt::RetryPush {
                    attempt: self.push_attempts,
                    error,
                }),
                Some(Reply::Yes) => {
                    self.phase = Phase::Push;
                    Step::Continue
                }
                Some(_) => self.push_abandoned(error),
            },
            Phase::Reconcile => self.reconcile().await,
            Phase::Done => Step::Finished(Outcome::new(
                WorkflowState::Failed,
                "Workflow ended without an outcome",
            )),
        }
    }

    /// Run to a terminal state, asking `ui` whenever the engine suspends.
    pub async fn drive<I: Interaction + ?Sized>(&mut self, ui: &mut I) -> Outcome {
        let mut reply = None;
        loop {
            let step = self.step(reply.take()).await;
            for notice in self.take_notices() {
                match notice {
                    Notice::List { title, items } => ui.present_list(&title, &items),
                    Notice::Error(message) => ui.present_error(&message),
                }
            }

            match step {
                Step::Continue => {}
                Step::Finished(outcome) => return outcome,
                Step::Await(prompt) => {
                    if let Some((title, items)) = prompt.details() {
                        ui.present_list(title, &items);
                    }
                    if let Some(error) = prompt.error() {
                        ui.present_error(error);
                    }
                    match ui.confirm(&prompt.question(), prompt.allows_custom()) {
                        Ok(answer) => reply = Some(answer),
                        Err(e) => return self.cancel(&e),
                    }
                }
            }
        }
    }

    /// End the run because a prompt could not be answered.
    ///
    /// Before any mutation this is an abort. While waiting on a push retry the
    /// commit already exists, so it is reported like a declined retry.
    pub fn cancel(&mut self, reason: &InteractionError) -> Outcome {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        debug!(%reason, phase = ?self.phase, "Prompt cancelled");
        let step = match self.phase.clone() {
            Phase::RetryPush { error } => self.push_abandoned(error),
            _ => self.finish(Outcome::new(
                WorkflowState::Aborted,
                format!("Aborted. {}", reason),
            )),
        };
        match step {
            Step::Finished(outcome) => outcome,
            _ => Outcome::new(WorkflowState::Aborted, reason.to_string()),
        }
    }

    fn enter(&mut self, state: WorkflowState) {
        debug!(%state, "Workflow state");
        self.state = Some(state);
    }

    fn finish(&mut self, mut outcome: Outcome) -> Step {
        self.enter(outcome.state);
        outcome.commit = self.commit.clone();
        self.phase = Phase::Done;
        self.outcome = Some(outcome.clone());
        Step::Finished(outcome)
    }

    fn fail(&mut self, message: &str, err: &OperationError) -> Step {
        let outcome = Outcome::new(WorkflowState::Failed, message)
            .with_error(Some(err.cause()), err.to_string());
        self.finish(outcome)
    }

    fn check_status(&mut self) -> Step {
        match self.vcs.status() {
            Ok(entries) if entries.is_empty() => self.finish(Outcome::new(
                WorkflowState::NoChanges,
                "Nothing to commit. Working tree is clean.",
            )),
            Ok(entries) => {
                self.status = entries;
                self.phase = Phase::CheckBranch;
                Step::Continue
            }
            Err(e) => self.finish(
                Outcome::new(WorkflowState::Failed, "Could not read repository status")
                    .with_error(None, e.to_string()),
            ),
        }
    }

    fn check_branch(&mut self) -> Step {
        match self.vcs.current_branch() {
            Ok(branch) => {
                self.branch = branch;
                self.phase = Phase::Classify;
                Step::Continue
            }
            Err(e) => self.finish(Outcome::new(WorkflowState::NotOnBranch, e.to_string())),
        }
    }

    fn suggest(&mut self) -> Step {
        let change_set = match preview::snapshot(&self.vcs, &self.status) {
            Ok(change_set) => change_set,
            Err(e) => {
                return self.finish(
                    Outcome::new(WorkflowState::Failed, "Could not collect changes")
                        .with_error(None, e.to_string()),
                );
            }
        };
        if change_set.is_empty() {
            return self.finish(Outcome::new(
                WorkflowState::NoChanges,
                "Nothing to commit. Working tree is clean.",
            ));
        }

        let summary = classify::classify(&change_set);
        self.suggestion = commit::build(&summary);
        self.summary = Some(summary);
        self.change_set = change_set;
        self.phase = Phase::ConfirmMessage;
        self.enter(WorkflowState::AwaitingMessageConfirmation);
        Step::Await(self.message_prompt())
    }

    fn message_prompt(&self) -> Prompt {
        Prompt::ConfirmMessage {
            message: self.suggestion.clone(),
            rationale: self
                .summary
                .as_ref()
                .map(|s| s.rationale.clone())
                .unwrap_or_default(),
        }
    }

    fn custom_message(&mut self, text: String) -> Step {
        if text.trim().is_empty() {
            self.notices
                .push(Notice::Error("Commit message is empty".to_string()));
            self.phase = Phase::ConfirmMessage;
            return Step::Await(self.message_prompt());
        }

        match commit::validate(&text) {
            Ok(validated) => {
                if !validated.warnings.is_empty() {
                    self.notices.push(Notice::List {
                        title: "Commit message warnings".to_string(),
                        items: validated.warnings.iter().map(|w| w.to_string()).collect(),
                    });
                }
                self.message = validated.message;
                self.phase = Phase::Scan;
                Step::Continue
            }
            Err(e) => {
                let message = text.trim().to_string();
                let error = e.to_string();
                self.phase = Phase::AcceptInvalid {
                    message: message.clone(),
                    error: error.clone(),
                };
                Step::Await(Prompt::AcceptInvalidMessage { message, error })
            }
        }
    }

    fn scan(&mut self) -> Step {
        match sensitive::check(&self.change_set) {
            Ok(()) => self.staging_prompt(),
            Err(warning) => {
                warn!("{}", warning);
                self.phase = Phase::Override;
                Step::Await(self.override_prompt())
            }
        }
    }

    fn override_prompt(&self) -> Prompt {
        Prompt::SensitiveOverride {
            findings: sensitive::scan(&self.change_set),
        }
    }

    fn staging_prompt(&mut self) -> Step {
        self.phase = Phase::ConfirmStaging;
        self.enter(WorkflowState::AwaitingStagingConfirmation);
        Step::Await(Prompt::ConfirmStaging {
            paths: self.change_set.paths(),
        })
    }

    fn stage(&mut self) -> Step {
        let paths = self.change_set.staging_paths();
        match self.vcs.stage(&paths) {
            Ok(()) => {
                info!(files = paths.len(), "Staged changes");
                self.enter(WorkflowState::Staged);
                self.phase = Phase::Commit;
                Step::Continue
            }
            Err(e) => self.fail("Staging failed", &e),
        }
    }

    fn commit(&mut self) -> Step {
        match self.vcs.commit(&self.message) {
            Ok(id) => {
                info!(commit = %id, message = %self.message, "Created commit");
                self.commit = Some(id);
                self.enter(WorkflowState::Committed);
                self.phase = Phase::Push;
                Step::Continue
            }
            Err(e) => self.fail("Commit failed", &e),
        }
    }

    fn push(&mut self) -> Step {
        if self.push_attempts == 0 {
            match self.vcs.unpushed_commits(&self.branch) {
                Ok(commits) if !commits.is_empty() => self.notices.push(Notice::List {
                    title: format!("Commits to push to {}", self.config.remote),
                    items: commits.iter().map(|c| c.to_string()).collect(),
                }),
                Ok(_) => {}
                Err(e) => warn!("Could not list unpushed commits: {}", e),
            }
        }

        self.push_attempts += 1;
        let attempt = self.push_attempts;
        info!(attempt, branch = %self.branch, "Pushing");
        match self.vcs.push(&self.branch, attempt) {
            Ok(()) => {
                self.enter(WorkflowState::Pushed);
                self.phase = Phase::Reconcile;
                Step::Continue
            }
            Err(e) => {
                warn!(attempt, cause = %e.cause(), "Push failed");
                self.enter(WorkflowState::PushFailed);
                let error = e.to_string();
                self.phase = Phase::RetryPush {
                    error: error.clone(),
                };
                Step::Await(Prompt::RetryPush { attempt, error })
            }
        }
    }

    fn push_abandoned(&mut self, error: String) -> Step {
        let message = format!(
            "Push failed, so no pull request was created. Push manually with: git push -u {} {}",
            self.config.remote, self.branch
        );
        self.finish(Outcome::new(WorkflowState::Failed, message).with_error(None, error))
    }

    async fn reconcile(&mut self) -> Step {
        if !self.host.tool_available() {
            let err =
                OperationError::new(Operation::FindPullRequest, FailureCause::ToolMissing, "gh");
            return self.fail(
                "GitHub tooling is not installed. Install gh or set GITHUB_TOKEN.",
                &err,
            );
        }
        if !self.host.authenticated().await {
            let err = OperationError::new(
                Operation::FindPullRequest,
                FailureCause::Auth,
                "GitHub rejected the configured credentials",
            );
            return self.fail(
                "Not authenticated with GitHub. Run 'gh auth login' or set GITHUB_TOKEN.",
                &err,
            );
        }

        match pr::reconcile(&self.host, &self.branch).await {
            Ok(Reconciliation::PrExists(url)) => {
                self.enter(WorkflowState::PRUpdateNeeded);
                self.finish(
                    Outcome::new(
                        WorkflowState::PRExists,
                        format!("Pushed to existing pull request: {}", url),
                    )
                    .with_url(url),
                )
            }
            Ok(Reconciliation::NeedsCreate) => self.create_pr().await,
            Err(e) => self.fail("Pull request lookup failed", &e),
        }
    }

    async fn create_pr(&mut self) -> Step {
        let Some(summary) = self.summary.as_ref() else {
            return self.finish(Outcome::new(
                WorkflowState::Failed,
                "No change summary to describe the pull request",
            ));
        };
        let draft = PullRequestDraft::new(&self.message, summary, self.change_set.len());

        match self
            .host
            .create_pr(
                &self.branch,
                &self.config.base_branch,
                &draft.title,
                &draft.body,
            )
            .await
        {
            Ok(url) => self.finish(
                Outcome::new(
                    WorkflowState::PRCreated,
                    format!("Created pull request: {}", url),
                )
                .with_url(url),
            ),
            Err(e) if e.cause() == FailureCause::AlreadyExists => {
                debug!("Pull request appeared concurrently; looking it up");
                match pr::reconcile(&self.host, &self.branch).await {
                    Ok(Reconciliation::PrExists(url)) => self.finish(
                        Outcome::new(
                            WorkflowState::PRExists,
                            format!("Pushed to existing pull request: {}", url),
                        )
                        .with_url(url),
                    ),
                    Ok(Reconciliation::NeedsCreate) => {
                        self.fail("Pull request creation failed", &e)
                    }
                    Err(lookup) => self.fail("Pull request lookup failed", &lookup),
                }
            }
            Err(e) => {
                let message = match e.cause() {
                    FailureCause::ToolMissing => {
                        "Pull request creation failed: GitHub tooling is not installed"
                    }
                    FailureCause::Auth => {
                        "Pull request creation failed: not authenticated with GitHub"
                    }
                    FailureCause::Network => "Pull request creation failed: network error",
                    _ => "Pull request creation was rejected by GitHub",
                };
                self.fail(message, &e)
            }
        }
    }
}
