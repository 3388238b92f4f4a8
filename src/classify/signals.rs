//! Evidence extracted from a change set before rules are applied.
//!
//! Everything here is path and line heuristics: no file is read from disk and
//! nothing is parsed beyond single diff lines.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::changeset::{FileChange, FileStatus};

/// Coarse category of a path, used for the file-type histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileKind {
    Ci,
    Manifest,
    Test,
    Docs,
    Style,
    Source,
    Other,
}

/// What kind of externally-invocable unit a change introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Component,
    Route,
    Command,
    Function,
    Type,
    Module,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitKind::Component => "component",
            UnitKind::Route => "route",
            UnitKind::Command => "command",
            UnitKind::Function => "function",
            UnitKind::Type => "type",
            UnitKind::Module => "module",
        };
        f.write_str(name)
    }
}

/// A new externally-invocable unit found in added lines or paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub kind: UnitKind,
    pub name: String,
    pub path: String,
}

impl Unit {
    pub fn evidence(&self) -> String {
        format!("new {} `{}` in {}", self.kind, self.name, self.path)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
    pub renamed: usize,
}

/// Per-run evidence shared by every rule.
pub struct Signals<'a> {
    pub files: &'a [FileChange],
    /// Parallel to `files`.
    pub kinds: Vec<FileKind>,
    pub kind_histogram: BTreeMap<FileKind, usize>,
    pub status_counts: StatusCounts,
    /// Exported units, routes and commands introduced by added source files.
    pub new_units: Vec<Unit>,
    /// Capabilities introduced inside modified files or manifests.
    pub new_capabilities: Vec<Unit>,
}

impl<'a> Signals<'a> {
    pub fn collect(files: &'a [FileChange]) -> Self {
        let kinds: Vec<FileKind> = files.iter().map(kind_of).collect();

        let mut kind_histogram = BTreeMap::new();
        for kind in &kinds {
            *kind_histogram.entry(*kind).or_insert(0) += 1;
        }

        let mut status_counts = StatusCounts::default();
        for file in files {
            match file.status {
                FileStatus::Added => status_counts.added += 1,
                FileStatus::Modified => status_counts.modified += 1,
                FileStatus::Deleted => status_counts.deleted += 1,
                FileStatus::Renamed => status_counts.renamed += 1,
            }
        }

        let mut new_units = Vec::new();
        let mut new_capabilities = Vec::new();
        for (file, kind) in files.iter().zip(&kinds) {
            match (file.status, kind) {
                (FileStatus::Added, FileKind::Source) => {
                    push_unique(&mut new_units, units_in_added_file(file));
                }
                (FileStatus::Modified | FileStatus::Renamed, FileKind::Source) => {
                    push_unique(&mut new_capabilities, units_in_modified_file(file));
                }
                (FileStatus::Added | FileStatus::Modified, FileKind::Manifest) => {
                    push_unique(&mut new_capabilities, manifest_binaries(file));
                }
                _ => {}
            }
        }

        // Units that moved between files are not new.
        let moved: HashSet<String> = files
            .iter()
            .zip(&kinds)
            .filter(|(_, kind)| **kind == FileKind::Source)
            .flat_map(|(file, _)| removed_unit_names(file))
            .collect();
        new_units.retain(|u| !moved.contains(&u.name));
        new_capabilities.retain(|u| !moved.contains(&u.name));

        Self {
            files,
            kinds,
            kind_histogram,
            status_counts,
            new_units,
            new_capabilities,
        }
    }

    pub fn count(&self, kind: FileKind) -> usize {
        self.kind_histogram.get(&kind).copied().unwrap_or(0)
    }

    pub fn all(&self, kind: FileKind) -> bool {
        !self.files.is_empty() && self.count(kind) == self.files.len()
    }

    /// Files paired with their kinds.
    pub fn with_kinds(&self) -> impl Iterator<Item = (&'a FileChange, FileKind)> + '_ {
        self.files.iter().zip(self.kinds.iter().copied())
    }
}

fn push_unique(into: &mut Vec<Unit>, found: Vec<Unit>) {
    for unit in found {
        if !into.iter().any(|u| u.name == unit.name && u.kind == unit.kind) {
            into.push(unit);
        }
    }
}

// ── Path classification ─────────────────────────────────────────────────────

const MANIFEST_NAMES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
    "cargo.toml",
    "cargo.lock",
    "go.mod",
    "go.sum",
    "requirements.txt",
    "requirements-dev.txt",
    "pyproject.toml",
    "poetry.lock",
    "pipfile",
    "pipfile.lock",
    "setup.py",
    "setup.cfg",
    "gemfile",
    "gemfile.lock",
    "composer.json",
    "composer.lock",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "settings.gradle",
    "makefile",
    "dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "tsconfig.json",
    "rust-toolchain.toml",
    ".gitignore",
    ".gitattributes",
    ".editorconfig",
    ".npmrc",
    ".nvmrc",
    ".prettierrc",
    ".prettierignore",
    ".eslintignore",
];

const LOCKFILE_NAMES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
    "cargo.lock",
    "go.sum",
    "poetry.lock",
    "pipfile.lock",
    "gemfile.lock",
    "composer.lock",
];

const MARKUP_EXTENSIONS: &[&str] = &["md", "mdx", "rst", "adoc"];

const DOC_EXTENSIONS: &[&str] = &["md", "mdx", "rst", "adoc", "txt"];

const DOC_PREFIXES: &[&str] = &["readme", "changelog", "license", "contributing", "authors"];

const STYLE_EXTENSIONS: &[&str] = &["css", "scss", "sass", "less", "styl", "pcss"];

const SOURCE_EXTENSIONS: &[&str] = &[
    "rs", "ts", "tsx", "js", "jsx", "mjs", "cjs", "py", "go", "java", "kt", "kts", "rb", "swift",
    "c", "h", "cc", "cpp", "hpp", "cs", "php", "vue", "svelte", "scala", "ex", "exs", "sh", "lua",
    "dart", "html",
];

const TEST_DIRS: &[&str] = &["test", "tests", "__tests__", "spec", "specs", "e2e"];

/// Classify a path into a [`FileKind`].
pub fn kind_of(file: &FileChange) -> FileKind {
    let name = file.file_name().to_ascii_lowercase();
    let path = file.path.to_ascii_lowercase();
    let ext = file.extension();
    let dirs: Vec<String> = file
        .directories()
        .iter()
        .map(|d| d.to_ascii_lowercase())
        .collect();

    if path.starts_with(".github/workflows/")
        || path.starts_with(".circleci/")
        || name == ".gitlab-ci.yml"
        || name == "azure-pipelines.yml"
        || name == "jenkinsfile"
    {
        return FileKind::Ci;
    }

    if MANIFEST_NAMES.contains(&name.as_str())
        || name.starts_with(".eslintrc")
        || is_tool_config(&name)
    {
        return FileKind::Manifest;
    }

    // Markup stays docs even inside test directories.
    if ext.as_deref().is_some_and(|e| MARKUP_EXTENSIONS.contains(&e)) {
        return FileKind::Docs;
    }

    if dirs.iter().any(|d| TEST_DIRS.contains(&d.as_str())) || is_test_file_name(&name) {
        return FileKind::Test;
    }

    let is_doc_ext = ext.as_deref().is_some_and(|e| DOC_EXTENSIONS.contains(&e));
    let is_doc_name =
        (ext.is_none() || is_doc_ext) && DOC_PREFIXES.iter().any(|p| name.starts_with(p));
    if is_doc_ext || is_doc_name || dirs.first().is_some_and(|d| d == "docs" || d == "doc") {
        return FileKind::Docs;
    }

    match ext.as_deref() {
        Some(e) if STYLE_EXTENSIONS.contains(&e) => FileKind::Style,
        Some(e) if SOURCE_EXTENSIONS.contains(&e) => FileKind::Source,
        _ => FileKind::Other,
    }
}

pub fn is_lockfile(file: &FileChange) -> bool {
    LOCKFILE_NAMES.contains(&file.file_name().to_ascii_lowercase().as_str())
}

/// `vite.config.ts`, `jest.config.js`, `tailwind.config.cjs`, ...
fn is_tool_config(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() >= 3 && parts[parts.len() - 2] == "config"
}

fn is_test_file_name(name: &str) -> bool {
    let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);
    stem.ends_with("_test")
        || stem.ends_with(".test")
        || stem.ends_with(".spec")
        || stem.ends_with("_spec")
        || (name.starts_with("test_") && name.ends_with(".py"))
}

// ── Line heuristics ─────────────────────────────────────────────────────────

static CONTROL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(if|else|elif|match|switch|case|catch|try|except|finally|throw|raise|guard|unless|when|Err|Ok|None|null|undefined|nil)\b|\?\s*;|\.unwrap_or|\.ok_or|===|!==|==|!=|<=|>=|&&|\|\|",
    )
    .expect("control pattern is valid")
});

static ERROR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(catch|try|except|finally|throw|raise|Err|panic|error|Error|reject)\b|\?\s*;|\.unwrap_or|\.ok_or|\.expect\(",
    )
    .expect("error pattern is valid")
});

static CLASS_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(className|class|style)\s*=\s*("[^"]*"|'[^']*'|\{[^}]*\})"#)
        .expect("class attribute pattern is valid")
});

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Whether a diff line is only a comment in a common language.
pub fn is_comment(line: &str) -> bool {
    let t = line.trim_start();
    if t.starts_with("#[") || t.starts_with("#!") || t.starts_with("#include") {
        return false;
    }
    t.starts_with("//")
        || t.starts_with('#')
        || t.starts_with("/*")
        || t.starts_with('*')
        || t.starts_with("<!--")
        || t.starts_with("-->")
        || t.starts_with("\"\"\"")
        || t.starts_with("'''")
}

/// A changed line that carries code (not blank, not a comment).
pub fn is_code(line: &str) -> bool {
    !is_blank(line) && !is_comment(line)
}

pub fn touches_control_flow(line: &str) -> bool {
    CONTROL_RE.is_match(line)
}

pub fn touches_error_handling(line: &str) -> bool {
    ERROR_RE.is_match(line)
}

/// Strip whitespace, quote style and trailing separators so formatter-only
/// edits compare equal.
pub fn normalize_formatting(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != ';')
        .map(|c| if c == '\'' { '"' } else { c })
        .collect()
}

/// Like [`normalize_formatting`], with class/style attribute values removed.
pub fn normalize_without_classes(text: &str) -> String {
    normalize_formatting(&CLASS_ATTR_RE.replace_all(text, "$1"))
}

/// Whether the only difference between removed and added lines is formatting.
pub fn is_formatting_only(file: &FileChange) -> bool {
    let removed: String = file.removed_lines().collect::<Vec<_>>().join("\n");
    let added: String = file.added_lines().collect::<Vec<_>>().join("\n");
    removed != added && normalize_formatting(&removed) == normalize_formatting(&added)
}

/// Whether the only difference is inside class/style attribute values.
pub fn is_class_only(file: &FileChange) -> bool {
    let removed: String = file.removed_lines().collect::<Vec<_>>().join("\n");
    let added: String = file.added_lines().collect::<Vec<_>>().join("\n");
    normalize_formatting(&removed) != normalize_formatting(&added)
        && normalize_without_classes(&removed) == normalize_without_classes(&added)
}

/// Whether every changed line is a comment or blank, with at least one comment.
pub fn is_comment_only(file: &FileChange) -> bool {
    let mut any_comment = false;
    for line in file.added_lines().chain(file.removed_lines()) {
        if is_blank(line) {
            continue;
        }
        if !is_comment(line) {
            return false;
        }
        any_comment = true;
    }
    any_comment
}

// ── Capability detection ────────────────────────────────────────────────────

struct UnitPattern {
    re: Regex,
    kind: UnitKind,
}

static EXPORT_PATTERNS: LazyLock<Vec<UnitPattern>> = LazyLock::new(|| {
    let table: &[(&str, UnitKind)] = &[
        // JS/TS
        (
            r"^\s*export\s+(?:default\s+)?(?:async\s+)?function\*?\s+([A-Za-z_$][\w$]*)",
            UnitKind::Function,
        ),
        (
            r"^\s*export\s+(?:default\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)",
            UnitKind::Function,
        ),
        (
            r"^\s*export\s+(?:default\s+)?(?:abstract\s+)?(?:class|interface|type|enum)\s+([A-Za-z_$][\w$]*)",
            UnitKind::Type,
        ),
        (r"^\s*export\s+default\s+([A-Z][\w$]*)\s*;?\s*$", UnitKind::Component),
        // Rust
        (
            r"^\s*pub\s+(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?fn\s+([A-Za-z_]\w*)",
            UnitKind::Function,
        ),
        (r"^\s*pub\s+(?:struct|enum|trait|type)\s+([A-Za-z_]\w*)", UnitKind::Type),
        (r"^\s*pub\s+mod\s+([A-Za-z_]\w*)", UnitKind::Module),
        // Python (top level only)
        (r"^(?:async\s+)?def\s+([a-zA-Z]\w*)\s*\(", UnitKind::Function),
        (r"^class\s+([A-Za-z]\w*)", UnitKind::Type),
        // Go
        (r"^func\s+(?:\([^)]*\)\s*)?([A-Z]\w*)\s*\(", UnitKind::Function),
        (r"^type\s+([A-Z]\w*)\s", UnitKind::Type),
        // Java / Kotlin / C#
        (
            r"^\s*public\s+(?:static\s+)?(?:final\s+)?(?:abstract\s+)?(?:class|interface|enum|record)\s+([A-Z]\w*)",
            UnitKind::Type,
        ),
    ];
    compile(table)
});

static REGISTRATION_PATTERNS: LazyLock<Vec<UnitPattern>> = LazyLock::new(|| {
    let table: &[(&str, UnitKind)] = &[
        // Express / Fastify / Hono style
        (
            r#"\b(?:app|router|server|api|routes)\.(?:get|post|put|patch|delete)\(\s*['"`]([^'"`]+)"#,
            UnitKind::Route,
        ),
        // Flask / FastAPI decorators
        (
            r#"@\w+\.(?:route|get|post|put|patch|delete)\(\s*['"]([^'"]+)"#,
            UnitKind::Route,
        ),
        // actix / rocket attributes
        (r#"#\[(?:get|post|put|patch|delete)\(\s*"([^"]+)""#, UnitKind::Route),
        // axum
        (r#"\.route\(\s*"([^"]+)""#, UnitKind::Route),
        // commander / yargs / cac
        (r#"\.command\(\s*['"]([\w:-]+)"#, UnitKind::Command),
        // VS Code extensions
        (r#"registerCommand\(\s*['"]([\w.:-]+)"#, UnitKind::Command),
    ];
    compile(table)
});

static EXPORTED_COMPONENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*export\s+(?:default\s+)?(?:function|const)\s+([A-Z][\w$]*)")
        .expect("component pattern is valid")
});

fn compile(table: &[(&str, UnitKind)]) -> Vec<UnitPattern> {
    table
        .iter()
        .filter_map(|(pattern, kind)| {
            Regex::new(pattern).ok().map(|re| UnitPattern { re, kind: *kind })
        })
        .collect()
}

fn match_units(file: &FileChange, line: &str, patterns: &[UnitPattern], out: &mut Vec<Unit>) {
    for pattern in patterns {
        if let Some(name) = pattern.re.captures(line).and_then(|c| c.get(1)) {
            let mut kind = pattern.kind;
            if is_component_file(file) && EXPORTED_COMPONENT_RE.is_match(line) {
                kind = UnitKind::Component;
            }
            out.push(Unit {
                kind,
                name: name.as_str().to_string(),
                path: file.path.clone(),
            });
            return;
        }
    }
}

fn is_component_file(file: &FileChange) -> bool {
    matches!(
        file.extension().as_deref(),
        Some("tsx" | "jsx" | "vue" | "svelte")
    )
}

/// Units introduced by a newly added source file.
fn units_in_added_file(file: &FileChange) -> Vec<Unit> {
    let mut units = units_in_lines(file, file.added_lines());

    if let Some(unit) = unit_from_path(file)
        && !units.iter().any(|u| u.kind == unit.kind)
    {
        units.retain(|u| u.name != unit.name);
        units.insert(0, unit);
    }

    // Single-file components often export an anonymous default.
    if units.is_empty() && is_component_file(file) {
        let stem = file.stem();
        let exports_default = file
            .added_lines()
            .any(|l| l.trim_start().starts_with("export default"));
        if exports_default && stem.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
            units.push(Unit {
                kind: UnitKind::Component,
                name: stem.to_string(),
                path: file.path.clone(),
            });
        }
    }

    units
}

/// Framework conventions where the path alone declares an invocable unit.
fn unit_from_path(file: &FileChange) -> Option<Unit> {
    let dirs: Vec<String> = file
        .directories()
        .iter()
        .map(|d| d.to_ascii_lowercase())
        .collect();
    let name = file.file_name().to_ascii_lowercase();
    let stem = file.stem().to_string();

    let kind = if dirs.iter().any(|d| d == "commands" || d == "cmd" || d == "bin") {
        UnitKind::Command
    } else if dirs
        .iter()
        .any(|d| d == "routes" || d == "handlers" || d == "controllers")
        || (dirs.iter().any(|d| d == "api") && dirs.iter().any(|d| d == "pages"))
        || name.starts_with("route.")
    {
        UnitKind::Route
    } else if name.starts_with("page.") {
        UnitKind::Component
    } else {
        return None;
    };

    // `app/dashboard/page.tsx` is named by its directory.
    let unit_name = if matches!(stem.as_str(), "page" | "route" | "index" | "mod" | "main") {
        file.directories()
            .last()
            .map(|d| d.to_string())
            .unwrap_or(stem)
    } else {
        stem
    };

    Some(Unit {
        kind,
        name: unit_name,
        path: file.path.clone(),
    })
}

fn units_in_lines<'l>(file: &FileChange, lines: impl Iterator<Item = &'l str>) -> Vec<Unit> {
    let mut units = Vec::new();
    for line in lines {
        match_units(file, line, &EXPORT_PATTERNS, &mut units);
        match_units(file, line, &REGISTRATION_PATTERNS, &mut units);
    }
    units
}

/// Names of units that existed before the change (found in removed lines).
fn removed_unit_names(file: &FileChange) -> Vec<String> {
    units_in_lines(file, file.removed_lines())
        .into_iter()
        .map(|u| u.name)
        .collect()
}

/// Routes, commands and exported symbols that did not exist before the change.
fn units_in_modified_file(file: &FileChange) -> Vec<Unit> {
    let existing: HashSet<String> = removed_unit_names(file).into_iter().collect();
    let mut after = units_in_lines(file, file.added_lines());
    after.retain(|u| !existing.contains(&u.name));
    after
}

static CARGO_BIN_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*name\s*=\s*"([\w-]+)""#).expect("bin name pattern is valid")
});

static PACKAGE_BIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*"bin"\s*:\s*(?:"[^"]*"|\{)"#).expect("bin key pattern is valid")
});

/// New executables declared in Cargo.toml (`[[bin]]`) or package.json (`"bin"`).
fn manifest_binaries(file: &FileChange) -> Vec<Unit> {
    let name = file.file_name().to_ascii_lowercase();
    let added: Vec<&str> = file.added_lines().collect();
    let mut units = Vec::new();

    if name == "cargo.toml" {
        if let Some(idx) = added.iter().position(|l| l.trim() == "[[bin]]") {
            let bin_name = added[idx + 1..]
                .iter()
                .find_map(|l| CARGO_BIN_NAME_RE.captures(l))
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "binary".to_string());
            units.push(Unit {
                kind: UnitKind::Command,
                name: bin_name,
                path: file.path.clone(),
            });
        }
    } else if name == "package.json" && added.iter().any(|l| PACKAGE_BIN_RE.is_match(l)) {
        units.push(Unit {
            kind: UnitKind::Command,
            name: "cli".to_string(),
            path: file.path.clone(),
        });
    }

    units
}

// ── Dependency bumps ────────────────────────────────────────────────────────

static DEPENDENCY_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*"?([@A-Za-z][\w@/.\-]*)"?\s*(?::|=|==|>=|~=)\s*(?:\{\s*version\s*=\s*)?"?[~^>=<\s]*v?\d"#)
        .expect("dependency pattern is valid")
});

const NON_DEPENDENCY_KEYS: &[&str] = &["version", "name", "edition", "rust-version", "go"];

/// Names of dependencies whose version line changed in a manifest.
pub fn bumped_dependencies(file: &FileChange) -> Vec<String> {
    let names_in = |lines: Vec<&str>| -> Vec<String> {
        lines
            .into_iter()
            .filter_map(|l| DEPENDENCY_LINE_RE.captures(l))
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
            .filter(|n| !NON_DEPENDENCY_KEYS.contains(&n.as_str()))
            .collect()
    };

    let removed = names_in(file.removed_lines().collect());
    let mut bumped = Vec::new();
    for name in names_in(file.added_lines().collect()) {
        if removed.contains(&name) && !bumped.contains(&name) {
            bumped.push(name);
        }
    }
    bumped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, status: FileStatus) -> FileChange {
        FileChange::new(path, status)
    }

    #[test]
    fn test_kind_of_paths() {
        let cases = [
            ("README.md", FileKind::Docs),
            ("docs/guide/setup.rst", FileKind::Docs),
            ("CONTRIBUTING", FileKind::Docs),
            ("LICENSE.txt", FileKind::Docs),
            ("tests/README.md", FileKind::Docs),
            ("e2e/notes.mdx", FileKind::Docs),
            ("tests/fixtures/input.txt", FileKind::Test),
            ("src/services/license.ts", FileKind::Source),
            ("src/authors.tsx", FileKind::Source),
            ("package.json", FileKind::Manifest),
            ("Cargo.lock", FileKind::Manifest),
            ("vite.config.ts", FileKind::Manifest),
            (".github/workflows/ci.yml", FileKind::Ci),
            ("tests/api_test.rs", FileKind::Test),
            ("src/components/Hero.test.tsx", FileKind::Test),
            ("test_parser.py", FileKind::Test),
            ("styles/main.scss", FileKind::Style),
            ("src/main.rs", FileKind::Source),
            ("assets/logo.png", FileKind::Other),
        ];
        for (path, expected) in cases {
            assert_eq!(kind_of(&file(path, FileStatus::Modified)), expected, "{path}");
        }
    }

    #[test]
    fn test_comment_detection() {
        assert!(is_comment("  // note"));
        assert!(is_comment("# heading"));
        assert!(is_comment(" * continued"));
        assert!(!is_comment("#[derive(Debug)]"));
        assert!(!is_comment("let x = 1; // trailing"));
    }

    #[test]
    fn test_formatting_only_detection() {
        let f = file("src/a.ts", FileStatus::Modified).with_hunk(&[
            "-const x = {a:1,b:2}",
            "+const x = { a: 1, b: 2 };",
        ]);
        assert!(is_formatting_only(&f));

        let logic = file("src/a.ts", FileStatus::Modified)
            .with_hunk(&["-const x = 1", "+const x = 2"]);
        assert!(!is_formatting_only(&logic));
    }

    #[test]
    fn test_class_only_detection() {
        let f = file("src/Button.tsx", FileStatus::Modified).with_hunk(&[
            r#"-  <button className="btn">Go</button>"#,
            r#"+  <button className="btn btn-primary">Go</button>"#,
        ]);
        assert!(is_class_only(&f));
        assert!(!is_formatting_only(&f));
    }

    #[test]
    fn test_added_component_is_detected() {
        let f = file("app/components/Hero.tsx", FileStatus::Added).with_hunk(&[
            "+import Link from 'next/link';",
            "+export default function Hero() {",
            "+  return <section>Hi</section>;",
            "+}",
        ]);
        let units = units_in_added_file(&f);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].kind, UnitKind::Component);
        assert_eq!(units[0].name, "Hero");
    }

    #[test]
    fn test_added_command_file_is_named_by_path() {
        let f = file("src/commands/deploy.ts", FileStatus::Added)
            .with_hunk(&["+const run = () => {};"]);
        let units = units_in_added_file(&f);
        assert_eq!(units[0].kind, UnitKind::Command);
        assert_eq!(units[0].name, "deploy");
    }

    #[test]
    fn test_modified_file_new_route_is_capability() {
        let f = file("server/app.js", FileStatus::Modified).with_hunk(&[
            " app.get('/health', health);",
            "+app.post('/users', createUser);",
        ]);
        let units = units_in_modified_file(&f);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].kind, UnitKind::Route);
        assert_eq!(units[0].name, "/users");
    }

    #[test]
    fn test_modified_file_renamed_export_with_same_name_is_not_new() {
        let f = file("src/lib.rs", FileStatus::Modified).with_hunk(&[
            "-pub fn parse(input: &str) -> Ast {",
            "+pub fn parse(input: &str) -> Result<Ast, Error> {",
        ]);
        assert!(units_in_modified_file(&f).is_empty());
    }

    #[test]
    fn test_cargo_bin_is_capability() {
        let f = file("Cargo.toml", FileStatus::Modified).with_hunk(&[
            "+[[bin]]",
            "+name = \"courier-hook\"",
            "+path = \"src/bin/hook.rs\"",
        ]);
        let units = manifest_binaries(&f);
        assert_eq!(units[0].name, "courier-hook");
    }

    #[test]
    fn test_bumped_dependencies_in_package_json() {
        let f = file("package.json", FileStatus::Modified).with_hunk(&[
            "-    \"react\": \"^18.2.0\",",
            "+    \"react\": \"^18.3.1\",",
            "-  \"version\": \"1.0.0\",",
            "+  \"version\": \"1.0.1\",",
        ]);
        assert_eq!(bumped_dependencies(&f), vec!["react"]);
    }

    #[test]
    fn test_bumped_dependencies_in_cargo_toml() {
        let f = file("Cargo.toml", FileStatus::Modified).with_hunk(&[
            "-tokio = { version = \"1.37\", features = [\"full\"] }",
            "+tokio = { version = \"1.38\", features = [\"full\"] }",
            "-serde = \"1.0.200\"",
            "+serde = \"1.0.203\"",
        ]);
        assert_eq!(bumped_dependencies(&f), vec!["tokio", "serde"]);
    }

    #[test]
    fn test_control_and_error_patterns() {
        assert!(touches_control_flow("    if x.is_none() {"));
        assert!(touches_control_flow("    return Err(e);"));
        assert!(!touches_control_flow("    let total = a + b;"));
        assert!(touches_error_handling("    } catch (e) {"));
        assert!(!touches_error_handling("    if a > b {"));
    }
}
