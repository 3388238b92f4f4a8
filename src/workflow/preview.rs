//! Read-only dry run: everything up to the sensitive-file gate.

use serde::Serialize;

use crate::changeset::{self, ChangeSet, FileStatus, StatusEntry};
use crate::classify::{self, ChangeSummary};
use crate::commit;
use crate::error::GitError;
use crate::git::{DiffTarget, Vcs};
use crate::sensitive::{self, SensitiveFinding};

/// What a run would propose, computed without prompting or mutating.
#[derive(Debug, Clone)]
pub struct Preview {
    /// Branch name, or why it cannot be resolved.
    pub branch: Result<String, String>,
    pub change_set: ChangeSet,
    pub summary: Option<ChangeSummary>,
    pub message: Option<String>,
    pub findings: Vec<SensitiveFinding>,
}

impl Preview {
    pub fn has_changes(&self) -> bool {
        !self.change_set.is_empty()
    }

    /// Machine-readable view for `--json`.
    pub fn report(&self) -> PreviewReport<'_> {
        let (branch, branch_error) = match &self.branch {
            Ok(name) => (Some(name.as_str()), None),
            Err(reason) => (None, Some(reason.as_str())),
        };
        PreviewReport {
            branch,
            branch_error,
            files: self
                .change_set
                .files()
                .iter()
                .map(|f| ReportedFile {
                    path: &f.path,
                    old_path: f.old_path.as_deref(),
                    status: f.status,
                })
                .collect(),
            summary: self.summary.as_ref(),
            message: self.message.as_deref(),
            findings: &self.findings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PreviewReport<'a> {
    pub branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_error: Option<&'a str>,
    pub files: Vec<ReportedFile<'a>>,
    pub summary: Option<&'a ChangeSummary>,
    pub message: Option<&'a str>,
    pub findings: &'a [SensitiveFinding],
}

#[derive(Debug, Serialize)]
pub struct ReportedFile<'a> {
    pub path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_path: Option<&'a str>,
    pub status: FileStatus,
}

/// Snapshot the working tree into a [`ChangeSet`].
pub(crate) fn snapshot<V: Vcs + ?Sized>(
    vcs: &V,
    status: &[StatusEntry],
) -> Result<ChangeSet, GitError> {
    let staged = vcs.diff(DiffTarget::Staged)?;
    let unstaged = vcs.diff(DiffTarget::Unstaged)?;
    Ok(changeset::from_parts(status, &staged, &unstaged))
}

pub fn preview<V: Vcs + ?Sized>(vcs: &V) -> Result<Preview, GitError> {
    let status = vcs.status()?;
    let branch = vcs.current_branch().map_err(|e| e.to_string());

    if status.is_empty() {
        return Ok(Preview {
            branch,
            change_set: ChangeSet::default(),
            summary: None,
            message: None,
            findings: Vec::new(),
        });
    }

    let change_set = snapshot(vcs, &status)?;
    let summary = classify::classify(&change_set);
    let message = commit::build(&summary);
    let findings = sensitive::scan(&change_set);

    Ok(Preview {
        branch,
        change_set,
        summary: Some(summary),
        message: Some(message),
        findings,
    })
}
