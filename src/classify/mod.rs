//! Heuristic classification of a change set into a conventional commit type,
//! optional scope and short description.
//!
//! Classification is a pure function of the change set: the same input always
//! yields the same summary.

pub mod describe;
pub mod rules;
pub mod scope;
pub mod signals;

use serde::Serialize;
use tracing::debug;

use crate::changeset::ChangeSet;
use crate::commit::CommitType;

pub use rules::{Subject, Verdict};
pub use signals::{FileKind, Signals, Unit, UnitKind};

/// Result of classifying a change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub commit_type: CommitType,
    /// Lowercase `[a-z0-9-]+`, or None when no module dominates.
    pub scope: Option<String>,
    /// Imperative, lowercase-first, no periods, at most 72 characters.
    pub description: String,
    /// Evidence behind the chosen type.
    pub rationale: Vec<String>,
}

/// Classify a change set.
pub fn classify(change_set: &ChangeSet) -> ChangeSummary {
    if change_set.is_empty() {
        return ChangeSummary {
            commit_type: CommitType::Chore,
            scope: None,
            description: describe::finalize(""),
            rationale: vec!["no changed files".to_string()],
        };
    }

    let signals = Signals::collect(change_set.files());
    let verdict = rules::evaluate(&signals);
    let scope = scope::derive_scope(change_set.files());
    let description = describe::describe(&verdict.subject);

    debug!(
        commit_type = %verdict.commit_type,
        rule = verdict.rule,
        scope = ?scope,
        files = change_set.len(),
        "Classified change set"
    );

    ChangeSummary {
        commit_type: verdict.commit_type,
        scope,
        description,
        rationale: verdict.evidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeset::{FileChange, FileStatus};

    #[test]
    fn test_classify_is_deterministic() {
        let set = ChangeSet::new(vec![
            FileChange::new("src/api/users.ts", FileStatus::Modified)
                .with_hunk(&["-  if (id) {", "+  if (id !== undefined) {"]),
            FileChange::new("src/api/teams.ts", FileStatus::Modified)
                .with_hunk(&["-  return null;", "+  return undefined;"]),
        ]);
        assert_eq!(classify(&set), classify(&set));
    }

    #[test]
    fn test_classify_empty_set_is_chore() {
        let summary = classify(&ChangeSet::default());
        assert_eq!(summary.commit_type, CommitType::Chore);
        assert_eq!(summary.description, "update project files");
    }

    #[test]
    fn test_classify_fix_with_scope() {
        let set = ChangeSet::new(vec![FileChange::new("src/auth/session.rs", FileStatus::Modified)
            .with_hunk(&[
                "-        return Err(Error::Expired);",
                "+        if token.is_refreshable() {",
                "+            return self.refresh(token);",
                "+        }",
                "+        return Err(Error::Expired);",
            ])]);
        let summary = classify(&set);
        assert_eq!(summary.commit_type, CommitType::Fix);
        assert_eq!(summary.scope.as_deref(), Some("auth"));
        assert!(!summary.rationale.is_empty());
    }
}
