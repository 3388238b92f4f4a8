//! Integration tests for conventional commit parsing and validation.

use courier::commit::{CommitType, MessageWarning, build, parse, validate};
use courier::classify::ChangeSummary;
use courier::error::ValidationError;

#[test]
fn test_parse_all_commit_types() {
    let types = vec![
        ("feat: add feature", CommitType::Feat),
        ("fix: fix bug", CommitType::Fix),
        ("docs: update docs", CommitType::Docs),
        ("style: format code", CommitType::Style),
        ("refactor: restructure", CommitType::Refactor),
        ("test: add tests", CommitType::Test),
        ("chore: cleanup", CommitType::Chore),
    ];

    for (message, expected_type) in types {
        let parsed = parse(message).unwrap();
        assert_eq!(parsed.commit_type, expected_type, "Failed to parse: {}", message);
    }
}

#[test]
fn test_types_outside_the_set_are_rejected() {
    for message in ["perf: speed up", "build: update deps", "ci: fix pipeline"] {
        assert!(
            matches!(validate(message), Err(ValidationError::UnknownType(_))),
            "accepted: {}",
            message
        );
    }
}

#[test]
fn test_parse_with_various_scopes() {
    let cases = vec![
        ("feat(api): new endpoint", Some("api")),
        ("fix(ui): button alignment", Some("ui")),
        ("fix(db-layer): connection leak", Some("db-layer")),
        ("feat: no scope", None),
    ];

    for (message, expected_scope) in cases {
        let parsed = parse(message).unwrap();
        assert_eq!(
            parsed.scope.as_deref(),
            expected_scope,
            "Failed scope for: {}",
            message
        );
    }
}

#[test]
fn test_parse_breaking_change_variations() {
    assert!(parse("feat!: breaking feature").unwrap().breaking);
    assert!(parse("feat(api)!: breaking api change").unwrap().breaking);
    assert!(!parse("feat: regular feature").unwrap().breaking);
}

#[test]
fn test_build_then_parse_round_trip() {
    let summaries = [
        (CommitType::Feat, Some("homepage"), "add hero section with call-to-action button"),
        (CommitType::Chore, None, "bump react dependency"),
        (CommitType::Test, Some("api"), "add users tests"),
    ];

    for (commit_type, scope, description) in summaries {
        let summary = ChangeSummary {
            commit_type,
            scope: scope.map(String::from),
            description: description.to_string(),
            rationale: vec!["evidence".to_string()],
        };
        let parsed = parse(&build(&summary)).unwrap();
        assert_eq!(parsed.commit_type, commit_type);
        assert_eq!(parsed.scope.as_deref(), scope);
        assert_eq!(parsed.description, description);
    }
}

#[test]
fn test_validation_warnings_are_advisory() {
    let validated = validate("feat: adding a very long description that keeps going well past the recommended limit").unwrap();

    assert_eq!(
        validated.message,
        "feat: adding a very long description that keeps going well past the recommended limit"
    );
    assert!(validated
        .warnings
        .iter()
        .any(|w| matches!(w, MessageWarning::NonImperative { word } if word == "adding")));
    assert!(validated
        .warnings
        .iter()
        .any(|w| matches!(w, MessageWarning::HeaderTooLong { .. })));
}

#[test]
fn test_hard_rejections() {
    assert_eq!(validate(""), Err(ValidationError::Empty));
    assert!(matches!(
        validate("fix: Handle errors"),
        Err(ValidationError::UppercaseDescription(_))
    ));
    assert!(matches!(
        validate("fix: handle errors."),
        Err(ValidationError::TrailingPeriod(_))
    ));
    assert!(matches!(
        validate("Fix: handle errors"),
        Err(ValidationError::UnknownType(_))
    ));
}
