//! Word a short imperative description from a rule's subject.

use super::rules::Subject;
use super::signals::{Unit, UnitKind};

/// Longest description emitted, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 72;

const FALLBACK: &str = "update project files";

pub fn describe(subject: &Subject) -> String {
    finalize(&raw_description(subject))
}

fn raw_description(subject: &Subject) -> String {
    match subject {
        Subject::Units(units) => describe_units(units),
        Subject::Fix {
            file,
            error_handling,
            files,
        } => {
            let target = if *files > 1 {
                format!("{} and related modules", words(file))
            } else {
                words(file)
            };
            if *error_handling {
                format!("handle errors in {}", target)
            } else {
                format!("correct conditional logic in {}", target)
            }
        }
        Subject::Readme => "update readme".to_string(),
        Subject::Comments { file: Some(f) } => format!("clarify comments in {}", words(f)),
        Subject::Comments { file: None } => "clarify code comments".to_string(),
        Subject::Doc { file, added: true } => format!("add {} docs", words(file)),
        Subject::Doc { file, added: false } => format!("update {} docs", words(file)),
        Subject::Documentation => "update documentation".to_string(),
        Subject::Stylesheets { file: Some(f) } => format!("adjust {} styles", words(f)),
        Subject::Stylesheets { file: None } => "adjust styles".to_string(),
        Subject::Formatting { file: Some(f) } => format!("format {}", words(f)),
        Subject::Formatting { file: None } => "format code".to_string(),
        Subject::Classes { file: Some(f) } => format!("adjust styling classes in {}", words(f)),
        Subject::Classes { file: None } => "adjust styling classes".to_string(),
        Subject::Rename { from, to } => format!("rename {} to {}", words(from), words(to)),
        Subject::Renames(n) => format!("reorganize {} modules", n),
        Subject::Removal {
            file: Some(f),
            deleted: true,
        } => format!("remove {}", words(f)),
        Subject::Removal {
            file: Some(f),
            deleted: false,
        } => format!("remove unused code in {}", words(f)),
        Subject::Removal { file: None, .. } => "remove unused code".to_string(),
        Subject::Moved { from, to } => format!("move {} logic into {}", words(from), words(to)),
        Subject::Tests {
            file: Some(f),
            added: true,
        } => format!("add {} tests", words(f)),
        Subject::Tests {
            file: Some(f),
            added: false,
        } => format!("update {} tests", words(f)),
        Subject::Tests { file: None, .. } => "update tests".to_string(),
        Subject::Dependencies(deps) => match deps.as_slice() {
            [one] => format!("bump {} dependency", one),
            [a, b] => format!("bump {} and {} dependencies", a, b),
            _ => format!("bump {} dependencies", deps.len()),
        },
        Subject::Lockfile => "update lockfile".to_string(),
        Subject::Ci => "update ci workflow".to_string(),
        Subject::Config { file: Some(f) } => format!("update {} configuration", words(f)),
        Subject::Config { file: None } => "update build configuration".to_string(),
        Subject::Maintenance { file: Some(f) } => format!("update {}", words(f)),
        Subject::Maintenance { file: None } => FALLBACK.to_string(),
    }
}

fn describe_units(units: &[Unit]) -> String {
    let phrases: Vec<String> = units.iter().map(unit_phrase).collect();
    match phrases.as_slice() {
        [] => FALLBACK.to_string(),
        [one] => format!("add {}", one),
        [a, b] => format!("add {} and {}", a, b),
        [a, b, rest @ ..] => format!("add {}, {} and {} more", a, b, rest.len()),
    }
}

fn unit_phrase(unit: &Unit) -> String {
    match unit.kind {
        UnitKind::Route => format!("{} endpoint", unit.name.trim()),
        kind => format!("{} {}", words(&unit.name), kind),
    }
}

/// Split an identifier into lowercase words: `HeroSection` -> `hero section`,
/// `parse_config` -> `parse config`, `APIClient` -> `api client`.
pub fn words(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            out.push(' ');
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower)
            {
                out.push(' ');
            }
        }
        out.extend(c.to_lowercase());
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Enforce description invariants: starts with a lowercase letter, contains no
/// period, at least two and at most [`MAX_DESCRIPTION_LENGTH`] characters.
pub fn finalize(raw: &str) -> String {
    let cleaned = raw.replace('.', "-");
    let mut text = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    match text.chars().next() {
        Some(c) if c.is_ascii_lowercase() => {}
        Some(c) if c.is_ascii_uppercase() => text[..1].make_ascii_lowercase(),
        _ => text = format!("update {}", text).trim_end().to_string(),
    }

    if text.chars().count() > MAX_DESCRIPTION_LENGTH {
        let cut: String = text.chars().take(MAX_DESCRIPTION_LENGTH).collect();
        text = match cut.rfind(' ') {
            Some(idx) if idx > 0 => cut[..idx].to_string(),
            _ => cut,
        };
        text = text.trim_end_matches(['-', ',', ' ']).to_string();
    }

    if text.chars().count() < 2 || text == "update" {
        return FALLBACK.to_string();
    }
    text
}
