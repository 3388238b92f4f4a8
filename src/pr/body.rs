//! Pull-request title and body derived from the confirmed commit.

use crate::classify::ChangeSummary;
use crate::commit::{self, CommitType};

/// Longest feature-area line in the body.
pub const MAX_AREA_LINE: usize = 80;

/// At most this many rationale bullets are listed.
pub const MAX_BULLETS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDraft {
    pub title: String,
    pub body: String,
}

impl PullRequestDraft {
    /// Build a draft from the confirmed commit message and the summary it was
    /// suggested from.
    ///
    /// The title is the message header verbatim. The body holds a
    /// feature-area line, a short summary and one to three bullets.
    pub fn new(message: &str, summary: &ChangeSummary, files_changed: usize) -> Self {
        let title = message.lines().next().unwrap_or("").trim().to_string();

        let (area, description) = match commit::parse(&title) {
            Ok(header) => (
                header
                    .scope
                    .as_deref()
                    .map(title_case)
                    .unwrap_or_else(|| area_for(header.commit_type).to_string()),
                header.description,
            ),
            Err(_) => ("Changes".to_string(), title.clone()),
        };

        let area_line = truncate(&format!("{}: {}", area, description), MAX_AREA_LINE);
        let summary_text = format!(
            "{}. This touches {} file{}.",
            capitalize(&description),
            files_changed,
            if files_changed == 1 { "" } else { "s" }
        );

        let mut bullets: Vec<String> = summary
            .rationale
            .iter()
            .take(MAX_BULLETS)
            .map(|r| format!("- {}", r))
            .collect();
        if bullets.is_empty() {
            bullets.push(format!("- {} change", summary.commit_type));
        }

        let body = format!(
            "## {}\n\n{}\n\n{}\n",
            area_line,
            summary_text,
            bullets.join("\n")
        );

        Self { title, body }
    }
}

fn area_for(commit_type: CommitType) -> &'static str {
    match commit_type {
        CommitType::Feat => "Feature",
        CommitType::Fix => "Fix",
        CommitType::Docs => "Documentation",
        CommitType::Style => "Style",
        CommitType::Refactor => "Refactor",
        CommitType::Test => "Tests",
        CommitType::Chore => "Maintenance",
    }
}

fn title_case(scope: &str) -> String {
    scope
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max - 3).collect();
    format!("{}...", cut.trim_end())
}
