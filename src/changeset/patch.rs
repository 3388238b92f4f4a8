//! Assemble a [`ChangeSet`] from raw status entries and unified-diff text.

use std::collections::HashMap;

use super::{ChangeSet, FileChange, FileStatus, Hunk};

/// One path reported by the repository status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub path: String,
    pub status: FileStatus,
    pub old_path: Option<String>,
}

impl StatusEntry {
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
            old_path: None,
        }
    }
}

/// Parse unified-diff text into hunks keyed by the new-side path.
///
/// Deleted files are keyed by their old path. Header lines between
/// `diff --git` and the first `@@` are skipped.
pub fn parse_patch(text: &str) -> HashMap<String, Vec<Hunk>> {
    let mut sections: HashMap<String, Vec<Hunk>> = HashMap::new();
    let mut path: Option<String> = None;
    let mut hunks: Vec<Hunk> = Vec::new();
    let mut current: Option<Hunk> = None;

    let mut flush = |path: &mut Option<String>, hunks: &mut Vec<Hunk>, current: &mut Option<Hunk>| {
        if let Some(h) = current.take() {
            hunks.push(h);
        }
        if let Some(p) = path.take() {
            sections.entry(p).or_default().append(hunks);
        }
        hunks.clear();
    };

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            flush(&mut path, &mut hunks, &mut current);
            path = parse_git_header(rest);
            continue;
        }

        if path.is_none() {
            continue;
        }

        if current.is_none() {
            if let Some(target) = line.strip_prefix("+++ ") {
                if let Some(p) = target.trim().strip_prefix("b/") {
                    path = Some(p.to_string());
                }
                continue;
            }
            if line.starts_with("--- ") {
                continue;
            }
        }

        if line.starts_with("@@") {
            if let Some(h) = current.take() {
                hunks.push(h);
            }
            current = Some(Hunk::new(line));
            continue;
        }

        if let Some(hunk) = current.as_mut() {
            if line.starts_with('+') || line.starts_with('-') || line.starts_with(' ') {
                hunk.lines.push(line.to_string());
            }
        }
    }
    flush(&mut path, &mut hunks, &mut current);

    sections
}

/// Extract the new-side path from the remainder of a `diff --git` line.
fn parse_git_header(rest: &str) -> Option<String> {
    let rest = rest.trim();
    if let Some(idx) = rest.rfind(" b/") {
        let path = &rest[idx + 3..];
        if !path.is_empty() {
            return Some(path.to_string());
        }
    }
    rest.strip_prefix("a/").map(String::from)
}

/// Combine status entries with staged and unstaged patches into a [`ChangeSet`].
///
/// Status order is preserved; staged hunks precede unstaged hunks for the same
/// path. Entries with empty paths are dropped.
pub fn from_parts(status: &[StatusEntry], staged: &str, unstaged: &str) -> ChangeSet {
    let mut staged_hunks = parse_patch(staged);
    let mut unstaged_hunks = parse_patch(unstaged);

    let files = status
        .iter()
        .filter(|entry| !entry.path.trim().is_empty())
        .map(|entry| {
            let mut file = FileChange::new(entry.path.clone(), entry.status);
            if let Some(old) = &entry.old_path {
                file = file.renamed_from(old.clone());
            }
            if let Some(h) = staged_hunks.remove(&file.path) {
                file.hunks.extend(h);
            }
            if let Some(h) = unstaged_hunks.remove(&file.path) {
                file.hunks.extend(h);
            }
            file
        })
        .collect();

    ChangeSet::new(files)
}
