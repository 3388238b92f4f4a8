//! Scope inference from the directories a change touches.

use std::collections::BTreeMap;

use crate::changeset::FileChange;

/// Directories that name a layout convention rather than a feature area.
const GENERIC_DIRS: &[&str] = &[
    "src", "app", "apps", "lib", "pkg", "packages", "crates", "internal", "source", "modules",
    "test", "tests", "__tests__", "doc", "docs",
];

/// The module a path belongs to: its first non-generic directory.
fn module_of(file: &FileChange) -> Option<String> {
    file.directories()
        .into_iter()
        .find(|dir| !GENERIC_DIRS.contains(&dir.to_ascii_lowercase().as_str()))
        .and_then(sanitize)
}

/// Lowercase and reduce to `[a-z0-9-]`, or None if nothing is left.
pub fn sanitize(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Scope shared by more than half of the changed files, if any.
///
/// Ties go to the alphabetically first module.
pub fn derive_scope(files: &[FileChange]) -> Option<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for module in files.iter().filter_map(module_of) {
        *counts.entry(module).or_insert(0) += 1;
    }

    let mut best: Option<(String, usize)> = None;
    for (module, count) in counts {
        if best.as_ref().is_none_or(|(_, n)| count > *n) {
            best = Some((module, count));
        }
    }

    best.filter(|(_, count)| count * 2 > files.len())
        .map(|(module, _)| module)
}
