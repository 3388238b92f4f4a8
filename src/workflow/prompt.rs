//! Questions the engine suspends on, and side output for the driver.

use std::collections::BTreeSet;

use crate::sensitive::SensitiveFinding;

/// A pending question. The engine does not move until it gets a [`Reply`](crate::interaction::Reply).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    ConfirmMessage {
        message: String,
        rationale: Vec<String>,
    },
    /// A custom message failed validation; using it anyway needs a second yes.
    AcceptInvalidMessage { message: String, error: String },
    SensitiveOverride { findings: Vec<SensitiveFinding> },
    ConfirmStaging { paths: Vec<String> },
    RetryPush { attempt: u32, error: String },
}

impl Prompt {
    pub fn question(&self) -> String {
        match self {
            Prompt::ConfirmMessage { message, .. } => format!("Commit with \"{}\"?", message),
            Prompt::AcceptInvalidMessage { message, .. } => {
                format!("Use \"{}\" anyway?", message)
            }
            Prompt::SensitiveOverride { findings } => {
                // A file can carry several reasons.
                let files = findings
                    .iter()
                    .map(|f| f.path.as_str())
                    .collect::<BTreeSet<_>>()
                    .len();
                format!(
                    "Stage {} sensitive file{} anyway?",
                    files,
                    if files == 1 { "" } else { "s" }
                )
            }
            Prompt::ConfirmStaging { paths } => format!(
                "Stage {} file{}?",
                paths.len(),
                if paths.len() == 1 { "" } else { "s" }
            ),
            Prompt::RetryPush { attempt, .. } => {
                format!("Push attempt {} failed. Retry?", attempt)
            }
        }
    }

    /// Whether free text is an acceptable answer.
    pub fn allows_custom(&self) -> bool {
        matches!(
            self,
            Prompt::ConfirmMessage { .. } | Prompt::AcceptInvalidMessage { .. }
        )
    }

    /// Context listed before the question is asked.
    pub fn details(&self) -> Option<(&'static str, Vec<String>)> {
        match self {
            Prompt::ConfirmMessage { rationale, .. } if !rationale.is_empty() => {
                Some(("Why", rationale.clone()))
            }
            Prompt::SensitiveOverride { findings } => Some((
                "Sensitive files",
                findings.iter().map(|f| f.to_string()).collect(),
            )),
            Prompt::ConfirmStaging { paths } => Some(("Files to stage", paths.clone())),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Prompt::AcceptInvalidMessage { error, .. } | Prompt::RetryPush { error, .. } => {
                Some(error)
            }
            _ => None,
        }
    }
}

/// Output the engine produces between prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    List { title: String, items: Vec<String> },
    Error(String),
}
