//! Integration tests for the reset-detection patch
//!
//! Runs the built-in rules against an App.tsx fixture containing both
//! guarded blocks, one of them, or neither.

use std::fs;
use tempfile::TempDir;
use textfix::edit::LineEnding;
use textfix::patch::{patch_file, PatchOptions, PatchOutcome};
use textfix::reset::{
    reset_detection_rules, HAS_SESSION_NEW, HAS_SESSION_OLD, NO_SESSION_NEW, NO_SESSION_OLD,
};

const HEADER: &str = "import React from 'react';\n\nexport default function App() {\n";
const MIDDLE: &str = "\n    if (isResetPassword) {\n      return <ResetPassword />;\n    }\n    return <Login />;\n  }\n\n";
const FOOTER: &str = "\n    return <ResetPassword />;\n  }\n\n  return <Dashboard />;\n}\n";

fn app_source(no_session: &str, has_session: &str) -> String {
    format!("{HEADER}{no_session}{MIDDLE}{has_session}{FOOTER}")
}

fn setup(content: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("App.tsx");
    fs::write(&file, content).unwrap();
    (dir, file)
}

#[test]
fn test_both_blocks_patched() {
    let (_dir, file) = setup(&app_source(NO_SESSION_OLD, HAS_SESSION_OLD));

    let report = patch_file(&file, &reset_detection_rules(), PatchOptions::default()).unwrap();

    assert_eq!(report.applied_count(), 2);
    assert!(report.written);

    let content = fs::read_to_string(&file).unwrap();
    assert_eq!(content, app_source(NO_SESSION_NEW, HAS_SESSION_NEW));
    assert_eq!(content.matches("searchParams.has('resetToken')").count(), 2);
    assert!(content.contains(
        "const isResetPassword = hash.includes('type=recovery') || hash.includes('type=magiclink') || hasResetToken;"
    ));
    assert!(content.contains("if (hash.includes('type=recovery') || hasResetToken) {"));
}

#[test]
fn test_only_first_block_present() {
    let (_dir, file) = setup(&app_source(NO_SESSION_OLD, "  // no signed-in check here\n"));

    let report = patch_file(&file, &reset_detection_rules(), PatchOptions::default()).unwrap();

    assert_eq!(
        report.outcomes,
        vec![
            PatchOutcome::Applied {
                rule: "no-session-reset-check".to_string(),
                occurrences: 1,
            },
            PatchOutcome::NotFound {
                rule: "has-session-reset-check".to_string(),
            },
        ]
    );

    let content = fs::read_to_string(&file).unwrap();
    assert_eq!(
        content,
        app_source(NO_SESSION_NEW, "  // no signed-in check here\n")
    );
}

#[test]
fn test_only_second_block_present() {
    let (_dir, file) = setup(&app_source("  // signed-out branch removed\n", HAS_SESSION_OLD));

    let report = patch_file(&file, &reset_detection_rules(), PatchOptions::default()).unwrap();

    assert!(!report.outcomes[0].is_applied());
    assert!(report.outcomes[1].is_applied());
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        app_source("  // signed-out branch removed\n", HAS_SESSION_NEW)
    );
}

#[test]
fn test_second_run_is_noop() {
    let (_dir, file) = setup(&app_source(NO_SESSION_OLD, HAS_SESSION_OLD));
    let rules = reset_detection_rules();

    patch_file(&file, &rules, PatchOptions::default()).unwrap();
    let after_first = fs::read_to_string(&file).unwrap();

    let second = patch_file(&file, &rules, PatchOptions::default()).unwrap();
    assert!(second
        .outcomes
        .iter()
        .all(|o| matches!(o, PatchOutcome::NotFound { .. })));
    assert_eq!(fs::read_to_string(&file).unwrap(), after_first);
}

#[test]
fn test_crlf_source_patched_and_kept_crlf() {
    let source = app_source(NO_SESSION_OLD, HAS_SESSION_OLD).replace('\n', "\r\n");
    let (_dir, file) = setup(&source);

    let report = patch_file(&file, &reset_detection_rules(), PatchOptions::default()).unwrap();

    assert_eq!(report.applied_count(), 2);
    assert_eq!(report.line_ending, LineEnding::CrLf);

    let content = fs::read_to_string(&file).unwrap();
    assert_eq!(
        content,
        app_source(NO_SESSION_NEW, HAS_SESSION_NEW).replace('\n', "\r\n")
    );
    assert!(!content.replace("\r\n", "").contains('\n'));

    // second run on the CRLF result is a no-op
    let second = patch_file(&file, &reset_detection_rules(), PatchOptions::default()).unwrap();
    assert_eq!(second.applied_count(), 0);
    assert_eq!(fs::read_to_string(&file).unwrap(), content);
}

#[test]
fn test_unmatched_mixed_line_endings_left_alone() {
    let source = "line one\r\nline two\nline three\r\n";
    let (_dir, file) = setup(source);

    let report = patch_file(&file, &reset_detection_rules(), PatchOptions::default()).unwrap();

    assert_eq!(report.applied_count(), 0);
    assert_eq!(fs::read_to_string(&file).unwrap(), source);
}

#[test]
fn test_non_utf8_file_fails_without_writing() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("App.tsx");
    fs::write(&file, b"const s = 'sess\xe3o';\n").unwrap();

    let result = patch_file(&file, &reset_detection_rules(), PatchOptions::default());

    assert!(result.is_err());
    assert_eq!(fs::read(&file).unwrap(), b"const s = 'sess\xe3o';\n");
}
