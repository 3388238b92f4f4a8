//! Change-set snapshot: the file-level modifications considered by one run.

pub mod patch;

use std::fmt;

use serde::Serialize;

pub use patch::{StatusEntry, from_parts, parse_patch};

/// Status of a changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Added => write!(f, "Added"),
            FileStatus::Modified => write!(f, "Modified"),
            FileStatus::Deleted => write!(f, "Deleted"),
            FileStatus::Renamed => write!(f, "Renamed"),
        }
    }
}

/// One `@@` hunk of a unified diff.
///
/// `lines` keep their origin prefix (`+`, `-` or ` `).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hunk {
    pub header: String,
    pub lines: Vec<String>,
}

impl Hunk {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            lines: Vec::new(),
        }
    }

    /// Content of the added lines, without the `+` prefix.
    pub fn added(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|l| l.strip_prefix('+'))
    }

    /// Content of the removed lines, without the `-` prefix.
    pub fn removed(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|l| l.strip_prefix('-'))
    }
}

/// A file that differs from the branch tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Repository-relative path, never empty.
    pub path: String,
    pub status: FileStatus,
    /// Old path for renamed files (None for non-rename changes).
    pub old_path: Option<String>,
    pub hunks: Vec<Hunk>,
}

impl FileChange {
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: normalize_path(&path.into()),
            status,
            old_path: None,
            hunks: Vec::new(),
        }
    }

    pub fn renamed_from(mut self, old_path: impl Into<String>) -> Self {
        self.old_path = Some(normalize_path(&old_path.into()));
        self
    }

    /// Add a hunk built from raw diff lines (each keeping its origin prefix).
    pub fn with_hunk(mut self, lines: &[&str]) -> Self {
        let mut hunk = Hunk::new("@@");
        hunk.lines = lines.iter().map(|l| (*l).to_string()).collect();
        self.hunks.push(hunk);
        self
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Lowercased extension of the file name, if any.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// File name up to the first dot (`Hero.test.tsx` -> `Hero`).
    pub fn stem(&self) -> &str {
        stem_of(self.file_name())
    }

    /// Directory components, excluding the file name.
    pub fn directories(&self) -> Vec<&str> {
        let mut parts: Vec<&str> = self.path.split('/').collect();
        parts.pop();
        parts
    }

    pub fn added_lines(&self) -> impl Iterator<Item = &str> {
        self.hunks.iter().flat_map(Hunk::added)
    }

    pub fn removed_lines(&self) -> impl Iterator<Item = &str> {
        self.hunks.iter().flat_map(Hunk::removed)
    }
}

/// Ordered, immutable snapshot of the changes a workflow run operates on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    files: Vec<FileChange>,
}

impl ChangeSet {
    /// Build a change set, dropping entries with empty paths and duplicate paths.
    pub fn new(files: Vec<FileChange>) -> Self {
        let mut kept: Vec<FileChange> = Vec::with_capacity(files.len());
        for file in files {
            if file.path.is_empty() || kept.iter().any(|k| k.path == file.path) {
                continue;
            }
            kept.push(file);
        }
        Self { files: kept }
    }

    pub fn files(&self) -> &[FileChange] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Paths to hand to the VCS when staging, including both sides of renames.
    pub fn staging_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for file in &self.files {
            if let Some(old) = &file.old_path {
                if !paths.contains(old) {
                    paths.push(old.clone());
                }
            }
            if !paths.contains(&file.path) {
                paths.push(file.path.clone());
            }
        }
        paths
    }
}

pub(crate) fn stem_of(file_name: &str) -> &str {
    let trimmed = file_name.trim_start_matches('.');
    match trimmed.find('.') {
        Some(idx) if idx > 0 => &trimmed[..idx],
        _ => trimmed,
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.trim();
    let path = path.strip_prefix("./").unwrap_or(path);
    path.trim_start_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_status_display() {
        assert_eq!(FileStatus::Added.to_string(), "Added");
        assert_eq!(FileStatus::Modified.to_string(), "Modified");
        assert_eq!(FileStatus::Deleted.to_string(), "Deleted");
        assert_eq!(FileStatus::Renamed.to_string(), "Renamed");
    }

    #[test]
    fn test_file_change_path_helpers() {
        let file = FileChange::new("./app/components/Hero.test.tsx", FileStatus::Added);
        assert_eq!(file.path, "app/components/Hero.test.tsx");
        assert_eq!(file.file_name(), "Hero.test.tsx");
        assert_eq!(file.extension().as_deref(), Some("tsx"));
        assert_eq!(file.stem(), "Hero");
        assert_eq!(file.directories(), vec!["app", "components"]);
    }

    #[test]
    fn test_dotfile_has_no_extension() {
        let file = FileChange::new(".env", FileStatus::Added);
        assert_eq!(file.extension(), None);
        assert_eq!(file.stem(), "env");

        let local = FileChange::new(".env.local", FileStatus::Added);
        assert_eq!(local.extension().as_deref(), Some("local"));
    }

    #[test]
    fn test_hunk_line_accessors() {
        let file = FileChange::new("src/lib.rs", FileStatus::Modified)
            .with_hunk(&[" fn a() {}", "-let x = 1;", "+let x = 2;"]);
        assert_eq!(file.added_lines().collect::<Vec<_>>(), vec!["let x = 2;"]);
        assert_eq!(file.removed_lines().collect::<Vec<_>>(), vec!["let x = 1;"]);
    }

    #[test]
    fn test_change_set_drops_empty_and_duplicate_paths() {
        let set = ChangeSet::new(vec![
            FileChange::new("a.txt", FileStatus::Added),
            FileChange::new("", FileStatus::Added),
            FileChange::new("a.txt", FileStatus::Modified),
            FileChange::new("b.txt", FileStatus::Deleted),
        ]);
        assert_eq!(set.paths(), vec!["a.txt", "b.txt"]);
        assert_eq!(set.files()[0].status, FileStatus::Added);
    }

    #[test]
    fn test_staging_paths_include_rename_source() {
        let set = ChangeSet::new(vec![
            FileChange::new("src/new_name.rs", FileStatus::Renamed).renamed_from("src/old_name.rs"),
        ]);
        assert_eq!(set.staging_paths(), vec!["src/old_name.rs", "src/new_name.rs"]);
    }
}
