//! Ordered classification rules. The first rule whose predicate holds wins.

use std::collections::HashSet;

use super::signals::{
    FileKind, Signals, Unit, bumped_dependencies, is_class_only, is_code, is_comment_only,
    is_formatting_only, is_lockfile, normalize_formatting, touches_control_flow,
    touches_error_handling,
};
use crate::changeset::{FileChange, FileStatus};
use crate::commit::CommitType;

/// Minimum share of changed code lines that must touch control flow for a fix.
const FIX_CONTROL_RATIO: f64 = 0.5;

/// Minimum share of added code lines that must reappear from other files for a move.
const MOVED_LINE_RATIO: f64 = 0.6;

const MAX_EVIDENCE: usize = 5;

/// What a matched rule learned about the change, used to word the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Units(Vec<Unit>),
    Fix {
        file: String,
        error_handling: bool,
        files: usize,
    },
    Readme,
    Comments {
        file: Option<String>,
    },
    Doc {
        file: String,
        added: bool,
    },
    Documentation,
    Stylesheets {
        file: Option<String>,
    },
    Formatting {
        file: Option<String>,
    },
    Classes {
        file: Option<String>,
    },
    Rename {
        from: String,
        to: String,
    },
    Renames(usize),
    Removal {
        file: Option<String>,
        deleted: bool,
    },
    Moved {
        from: String,
        to: String,
    },
    Tests {
        file: Option<String>,
        added: bool,
    },
    Dependencies(Vec<String>),
    Lockfile,
    Ci,
    Config {
        file: Option<String>,
    },
    Maintenance {
        file: Option<String>,
    },
}

/// The winning rule's type, subject and evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub commit_type: CommitType,
    pub rule: &'static str,
    pub subject: Subject,
    pub evidence: Vec<String>,
}

type Check = fn(&Signals) -> Option<(Subject, Vec<String>)>;

struct Rule {
    name: &'static str,
    commit_type: CommitType,
    check: Check,
}

const RULES: &[Rule] = &[
    Rule {
        name: "new-unit",
        commit_type: CommitType::Feat,
        check: new_unit,
    },
    Rule {
        name: "control-flow",
        commit_type: CommitType::Fix,
        check: control_flow,
    },
    Rule {
        name: "documentation",
        commit_type: CommitType::Docs,
        check: documentation,
    },
    Rule {
        name: "presentation",
        commit_type: CommitType::Style,
        check: presentation,
    },
    Rule {
        name: "restructure",
        commit_type: CommitType::Refactor,
        check: restructure,
    },
    Rule {
        name: "tests-only",
        commit_type: CommitType::Test,
        check: tests_only,
    },
    Rule {
        name: "maintenance",
        commit_type: CommitType::Chore,
        check: maintenance,
    },
];

/// Run the rule table against collected signals.
pub fn evaluate(signals: &Signals) -> Verdict {
    let mut verdict = RULES
        .iter()
        .find_map(|rule| {
            (rule.check)(signals).map(|(subject, evidence)| Verdict {
                commit_type: rule.commit_type,
                rule: rule.name,
                subject,
                evidence,
            })
        })
        .unwrap_or_else(|| Verdict {
            commit_type: CommitType::Chore,
            rule: "maintenance",
            subject: Subject::Maintenance { file: None },
            evidence: Vec::new(),
        });

    // A change that would be a chore but adds a capability is a feature.
    if verdict.commit_type == CommitType::Chore && !signals.new_capabilities.is_empty() {
        let mut evidence: Vec<String> = signals
            .new_capabilities
            .iter()
            .map(Unit::evidence)
            .collect();
        evidence.push("promoted from chore: new capability in an existing file".to_string());
        verdict = Verdict {
            commit_type: CommitType::Feat,
            rule: "new-capability",
            subject: Subject::Units(signals.new_capabilities.clone()),
            evidence,
        };
    }

    verdict.evidence.truncate(MAX_EVIDENCE);
    verdict
}

fn single_stem<'a>(files: impl IntoIterator<Item = &'a FileChange>) -> Option<String> {
    let mut iter = files.into_iter();
    match (iter.next(), iter.next()) {
        (Some(file), None) => Some(file.stem().to_string()),
        _ => None,
    }
}

fn new_unit(s: &Signals) -> Option<(Subject, Vec<String>)> {
    if s.new_units.is_empty() {
        return None;
    }
    let evidence = s.new_units.iter().map(Unit::evidence).collect();
    Some((Subject::Units(s.new_units.clone()), evidence))
}

fn control_flow(s: &Signals) -> Option<(Subject, Vec<String>)> {
    let mut code = 0usize;
    let mut control = 0usize;
    let mut errors = 0usize;
    let mut any_added = false;
    let mut any_removed = false;
    let mut files = 0usize;
    let mut busiest: Option<(&FileChange, usize)> = None;

    for (file, kind) in s.with_kinds() {
        if kind != FileKind::Source || file.status != FileStatus::Modified {
            continue;
        }
        files += 1;
        let mut file_control = 0;
        for line in file.added_lines().filter(|l| is_code(l)) {
            any_added = true;
            code += 1;
            if touches_control_flow(line) {
                file_control += 1;
            }
            if touches_error_handling(line) {
                errors += 1;
            }
        }
        for line in file.removed_lines().filter(|l| is_code(l)) {
            any_removed = true;
            code += 1;
            if touches_control_flow(line) {
                file_control += 1;
            }
            if touches_error_handling(line) {
                errors += 1;
            }
        }
        control += file_control;
        if busiest.is_none_or(|(_, n)| file_control > n) {
            busiest = Some((file, file_control));
        }
    }

    if code == 0 || !any_added || !any_removed {
        return None;
    }
    if (control as f64) < (code as f64) * FIX_CONTROL_RATIO {
        return None;
    }
    let (file, _) = busiest?;

    let evidence = vec![
        format!(
            "{} of {} changed code lines touch conditionals or error handling",
            control, code
        ),
        format!("existing logic modified in {}", file.path),
    ];
    Some((
        Subject::Fix {
            file: file.stem().to_string(),
            error_handling: errors * 2 >= control,
            files,
        },
        evidence,
    ))
}

fn documentation(s: &Signals) -> Option<(Subject, Vec<String>)> {
    let mut docs = Vec::new();
    let mut comments = Vec::new();
    for (file, kind) in s.with_kinds() {
        if kind == FileKind::Docs {
            docs.push(file);
        } else if is_comment_only(file) {
            comments.push(file);
        } else {
            return None;
        }
    }
    if docs.is_empty() && comments.is_empty() {
        return None;
    }

    let mut evidence: Vec<String> = docs
        .iter()
        .map(|f| format!("documentation file {}", f.path))
        .collect();
    evidence.extend(
        comments
            .iter()
            .map(|f| format!("comment-only changes in {}", f.path)),
    );

    let subject = match (docs.as_slice(), comments.is_empty()) {
        ([], false) => Subject::Comments {
            file: single_stem(comments.iter().copied()),
        },
        ([only], true) if only.stem().eq_ignore_ascii_case("readme") => Subject::Readme,
        ([only], true) => Subject::Doc {
            file: only.stem().to_string(),
            added: only.status == FileStatus::Added,
        },
        _ => Subject::Documentation,
    };
    Some((subject, evidence))
}

fn presentation(s: &Signals) -> Option<(Subject, Vec<String>)> {
    let mut stylesheets = 0;
    let mut classes = 0;
    let mut evidence = Vec::new();

    for (file, kind) in s.with_kinds() {
        if kind == FileKind::Style {
            stylesheets += 1;
            evidence.push(format!("stylesheet {}", file.path));
        } else if file.status != FileStatus::Modified {
            return None;
        } else if is_formatting_only(file) {
            evidence.push(format!("formatting-only changes in {}", file.path));
        } else if is_class_only(file) {
            classes += 1;
            evidence.push(format!("class attribute changes in {}", file.path));
        } else {
            return None;
        }
    }
    if evidence.is_empty() {
        return None;
    }

    let file = single_stem(s.files);
    let subject = if stylesheets == s.files.len() {
        Subject::Stylesheets { file }
    } else if classes > 0 {
        Subject::Classes { file }
    } else {
        Subject::Formatting { file }
    };
    Some((subject, evidence))
}

fn restructure(s: &Signals) -> Option<(Subject, Vec<String>)> {
    let all_code = s
        .with_kinds()
        .all(|(_, kind)| matches!(kind, FileKind::Source | FileKind::Test));
    if s.files.is_empty() || !all_code {
        return None;
    }

    renames(s)
        .or_else(|| removals(s))
        .or_else(|| moved_code(s))
}

fn renames(s: &Signals) -> Option<(Subject, Vec<String>)> {
    let only_renames_and_edits = s
        .files
        .iter()
        .all(|f| matches!(f.status, FileStatus::Renamed | FileStatus::Modified));
    if s.status_counts.renamed == 0 || !only_renames_and_edits {
        return None;
    }

    let renamed: Vec<&FileChange> = s
        .files
        .iter()
        .filter(|f| f.status == FileStatus::Renamed)
        .collect();
    let evidence = renamed
        .iter()
        .map(|f| {
            format!(
                "renamed {} to {}",
                f.old_path.as_deref().unwrap_or("?"),
                f.path
            )
        })
        .collect();

    let subject = match renamed.as_slice() {
        [only] => Subject::Rename {
            from: only
                .old_path
                .as_deref()
                .map(|p| crate::changeset::stem_of(p.rsplit('/').next().unwrap_or(p)))
                .unwrap_or("module")
                .to_string(),
            to: only.stem().to_string(),
        },
        _ => Subject::Renames(renamed.len()),
    };
    Some((subject, evidence))
}

fn removals(s: &Signals) -> Option<(Subject, Vec<String>)> {
    let adds_code = s.files.iter().any(|f| f.added_lines().any(is_code));
    let removes_code = s
        .files
        .iter()
        .any(|f| f.status == FileStatus::Deleted || f.removed_lines().any(is_code));
    if adds_code || !removes_code {
        return None;
    }

    let removed: usize = s
        .files
        .iter()
        .map(|f| f.removed_lines().filter(|l| is_code(l)).count())
        .sum();
    let evidence = vec![format!(
        "{} code lines removed with no additions across {} file(s)",
        removed,
        s.files.len()
    )];
    Some((
        Subject::Removal {
            file: single_stem(s.files),
            deleted: s.files.iter().all(|f| f.status == FileStatus::Deleted),
        },
        evidence,
    ))
}

fn moved_code(s: &Signals) -> Option<(Subject, Vec<String>)> {
    if s.files.len() < 2 {
        return None;
    }

    let removed_by_file: Vec<HashSet<String>> = s
        .files
        .iter()
        .map(|f| {
            f.removed_lines()
                .filter(|l| is_code(l))
                .map(normalize_formatting)
                .collect()
        })
        .collect();

    let mut added_code = 0usize;
    let mut moved = 0usize;
    let mut moved_into: Option<(usize, usize)> = None;
    for (idx, file) in s.files.iter().enumerate() {
        let mut file_moved = 0;
        for line in file.added_lines().filter(|l| is_code(l)) {
            added_code += 1;
            let normalized = normalize_formatting(line);
            let from_elsewhere = removed_by_file
                .iter()
                .enumerate()
                .any(|(other, set)| other != idx && set.contains(&normalized));
            if from_elsewhere {
                file_moved += 1;
            }
        }
        moved += file_moved;
        if file_moved > 0 && moved_into.is_none_or(|(_, n)| file_moved > n) {
            moved_into = Some((idx, file_moved));
        }
    }

    if added_code == 0 || (moved as f64) < (added_code as f64) * MOVED_LINE_RATIO {
        return None;
    }
    let (to_idx, _) = moved_into?;
    let from_idx = removed_by_file
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != to_idx)
        .max_by_key(|(idx, set)| (set.len(), std::cmp::Reverse(*idx)))
        .map(|(idx, _)| idx)?;

    let evidence = vec![
        format!(
            "{} of {} added code lines moved from other files",
            moved, added_code
        ),
        format!(
            "code moved from {} into {}",
            s.files[from_idx].path, s.files[to_idx].path
        ),
    ];
    Some((
        Subject::Moved {
            from: s.files[from_idx].stem().to_string(),
            to: s.files[to_idx].stem().to_string(),
        },
        evidence,
    ))
}

fn tests_only(s: &Signals) -> Option<(Subject, Vec<String>)> {
    if !s.all(FileKind::Test) {
        return None;
    }
    let evidence = s.files.iter().map(|f| format!("test file {}", f.path)).collect();
    let file = single_stem(s.files).map(|stem| {
        stem.trim_start_matches("test_")
            .trim_end_matches("_test")
            .trim_end_matches("_spec")
            .to_string()
    });
    Some((
        Subject::Tests {
            file,
            added: s.files.iter().all(|f| f.status == FileStatus::Added),
        },
        evidence,
    ))
}

fn maintenance(s: &Signals) -> Option<(Subject, Vec<String>)> {
    let mut bumped = Vec::new();
    for (file, kind) in s.with_kinds() {
        if kind == FileKind::Manifest {
            for dep in bumped_dependencies(file) {
                if !bumped.contains(&dep) {
                    bumped.push(dep);
                }
            }
        }
    }

    if !bumped.is_empty() {
        let evidence = vec![format!("dependency versions changed: {}", bumped.join(", "))];
        return Some((Subject::Dependencies(bumped), evidence));
    }

    if s.files.iter().all(is_lockfile) {
        return Some((Subject::Lockfile, vec!["lockfile-only change".to_string()]));
    }

    if s.all(FileKind::Ci) {
        let evidence = s.files.iter().map(|f| format!("ci file {}", f.path)).collect();
        return Some((Subject::Ci, evidence));
    }

    let file = single_stem(s.files);
    let kinds: Vec<String> = s
        .kind_histogram
        .iter()
        .map(|(kind, n)| format!("{:?}={}", kind, n).to_lowercase())
        .collect();
    let evidence = vec![format!(
        "no specific rule matched; file kinds: {}",
        kinds.join(", ")
    )];

    let config_only = s
        .with_kinds()
        .all(|(_, kind)| matches!(kind, FileKind::Manifest | FileKind::Ci));
    if config_only {
        Some((Subject::Config { file }, evidence))
    } else {
        Some((Subject::Maintenance { file }, evidence))
    }
}
