//! Render a [`ChangeSummary`] as a Conventional-Commits header and validate
//! user-supplied replacements.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::warn;

use crate::classify::ChangeSummary;
use crate::commit::types::CommitType;
use crate::error::ValidationError;

/// Recommended maximum header length; longer headers only produce a warning.
pub const MAX_HEADER_LENGTH: usize = 72;

/// Pattern: type(scope)!: description, type!: description, type(scope): description, type: description
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+)(?:\(([^)]+)\))?(!)?:[ \t]*(.*)$").expect("header pattern is valid")
});

/// Words whose -s/-ed/-ing ending is part of the base form.
const IMPERATIVE_EXCEPTIONS: &[&str] = &[
    "address", "bring", "embed", "feed", "focus", "need", "process", "seed", "shed", "speed",
    "string", "bless", "pass", "access", "bias",
];

/// The fields of a parsed conventional-commit header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHeader {
    pub commit_type: CommitType,
    pub scope: Option<String>,
    pub breaking: bool,
    pub description: String,
}

/// Advisory problems that never block a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageWarning {
    NonImperative { word: String },
    HeaderTooLong { length: usize },
}

impl fmt::Display for MessageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageWarning::NonImperative { word } => write!(
                f,
                "'{}' does not read as imperative mood (prefer e.g. 'add', 'fix', 'update')",
                word
            ),
            MessageWarning::HeaderTooLong { length } => write!(
                f,
                "header is {} characters; keep it under {}",
                length, MAX_HEADER_LENGTH
            ),
        }
    }
}

/// A message accepted by [`validate`], kept verbatim, with any advisory warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMessage {
    pub message: String,
    pub header: ParsedHeader,
    pub warnings: Vec<MessageWarning>,
}

/// Render a summary as `type(scope): description` or `type: description`.
pub fn build(summary: &ChangeSummary) -> String {
    match &summary.scope {
        Some(scope) => format!("{}({}): {}", summary.commit_type, scope, summary.description),
        None => format!("{}: {}", summary.commit_type, summary.description),
    }
}

/// Parse the first line of a commit message into its conventional fields.
pub fn parse(message: &str) -> Result<ParsedHeader, ValidationError> {
    let header = message.lines().next().unwrap_or("").trim_end();
    if header.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    let caps = HEADER_RE
        .captures(header)
        .ok_or_else(|| ValidationError::MalformedHeader(header.to_string()))?;

    let type_str = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let commit_type = type_str
        .parse::<CommitType>()
        .map_err(|_| ValidationError::UnknownType(type_str.to_string()))?;

    let description = caps.get(4).map(|m| m.as_str().trim()).unwrap_or("");
    if description.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }

    Ok(ParsedHeader {
        commit_type,
        scope: caps.get(2).map(|m| m.as_str().to_string()),
        breaking: caps.get(3).is_some(),
        description: description.to_string(),
    })
}

/// Validate a candidate commit message.
///
/// Structural problems are errors; tense and length heuristics are
/// returned as warnings on an accepted message.
pub fn validate(candidate: &str) -> Result<ValidatedMessage, ValidationError> {
    let message = candidate.trim();
    let header = parse(message)?;

    if header
        .description
        .chars()
        .next()
        .is_some_and(|c| c.is_uppercase())
    {
        return Err(ValidationError::UppercaseDescription(header.description));
    }
    if header.description.ends_with('.') {
        return Err(ValidationError::TrailingPeriod(header.description));
    }

    let mut warnings = Vec::new();
    let header_len = message.lines().next().unwrap_or("").chars().count();
    if header_len > MAX_HEADER_LENGTH {
        warnings.push(MessageWarning::HeaderTooLong { length: header_len });
    }
    if let Some(word) = header.description.split_whitespace().next() {
        if !looks_imperative(word) {
            warnings.push(MessageWarning::NonImperative {
                word: word.to_string(),
            });
        }
    }

    for warning in &warnings {
        warn!("commit message warning: {}", warning);
    }

    Ok(ValidatedMessage {
        message: message.to_string(),
        header,
        warnings,
    })
}

/// Best-effort imperative-mood check on the first word of a description.
fn looks_imperative(word: &str) -> bool {
    let word = word.to_lowercase();
    if word.len() < 4 || IMPERATIVE_EXCEPTIONS.contains(&word.as_str()) {
        return true;
    }
    if word.ends_with("ed") || word.ends_with("ing") {
        return false;
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return true;
    }
    !word.ends_with('s')
}
