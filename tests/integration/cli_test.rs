//! End-to-end tests of the concept-lint binary.

use std::fs;

use crate::support::fixtures::*;
use crate::support::harness::{stderr, stdout, TestHarness};

fn aligned_project() -> TestHarness {
    let harness = TestHarness::new();
    harness.write_spec("Team.concept", TEAM_SPEC);
    harness.write_impl("Team/TeamConcept.ts", &team_impl());
    harness
}

#[test]
fn test_validate_clean_project_exits_zero() {
    let harness = aligned_project();
    let output = harness.run(&["validate"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Team 100/100"));
    assert!(out.contains("No issues"));
}

#[test]
fn test_validate_with_errors_exits_one() {
    let harness = TestHarness::new();
    harness.write_spec("Team.concept", TEAM_SPEC);
    harness.write_impl("Team/TeamConcept.ts", &team_impl_without_delete());

    let output = harness.run(&["validate"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Action 'delete' is specified but not implemented"));
}

#[test]
fn test_strict_mode_fails_on_warnings() {
    let harness = aligned_project();
    harness.write_impl("Label/LabelConcept.ts", ORPHAN_IMPL);

    let lenient = harness.run(&["validate"]);
    assert_eq!(lenient.status.code(), Some(0));

    let strict = harness.run(&["validate", "--strict"]);
    assert_eq!(strict.status.code(), Some(1));
}

#[test]
fn test_strict_mode_from_config_file() {
    let harness = aligned_project();
    harness.write_impl("Label/LabelConcept.ts", ORPHAN_IMPL);
    fs::create_dir_all(harness.path().join(".concept-lint")).unwrap();
    fs::write(
        harness.path().join(".concept-lint/config.md"),
        "---\nstrict: true\n---\n",
    )
    .unwrap();

    let output = harness.run(&["validate"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_structured_export() {
    let harness = aligned_project();
    harness.write_spec("Audit.concept", AUDIT_SPEC);

    let output = harness.run(&["validate", "--format", "structured", "--output", "out"]);
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(harness.path().join("out/validation-report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(json["summary"]["conceptsAnalyzed"], 2);
    assert_eq!(json["summary"]["totalErrors"], 1);
    assert_eq!(json["summary"]["averageScore"], 50.0);

    let reports = json["reports"].as_array().unwrap();
    let audit = reports
        .iter()
        .find(|r| r["conceptName"] == "Audit")
        .unwrap();
    assert_eq!(audit["implementationFile"], "MISSING");
    assert_eq!(audit["issues"][0]["category"], "missing_action");

    // Console output is not printed for file-only formats
    assert!(!stdout(&output).contains("Summary:"));
}

#[test]
fn test_all_formats_written() {
    let harness = aligned_project();
    let output = harness.run(&["validate", "--format", "all", "--output", "reports"]);
    assert_eq!(output.status.code(), Some(0));

    let dir = harness.path().join("reports");
    assert!(dir.join("validation-report.html").exists());
    assert!(dir.join("validation-summary.md").exists());
    assert!(dir.join("validation-report.json").exists());
    assert!(stdout(&output).contains("Summary:"));
}

#[test]
fn test_directory_overrides() {
    let harness = TestHarness::new();
    let design = harness.path().join("design");
    fs::create_dir_all(&design).unwrap();
    fs::write(design.join("Team.concept"), TEAM_SPEC).unwrap();
    harness.write_impl("Team/TeamConcept.ts", &team_impl());

    let output = harness.run(&["validate", "--specs", "design"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Team 100/100"));
}

#[test]
fn test_missing_spec_directory_exits_one() {
    let harness = aligned_project();
    let output = harness.run(&["validate", "--specs", "nowhere"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Directory not found"));
}

#[test]
fn test_invalid_config_exits_one() {
    let harness = aligned_project();
    fs::create_dir_all(harness.path().join(".concept-lint")).unwrap();
    fs::write(
        harness.path().join(".concept-lint/config.md"),
        "---\nassessment:\n  timeout_secs: 0\n---\n",
    )
    .unwrap();

    let output = harness.run(&["validate"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("timeout_secs"));
}

#[test]
fn test_assessment_without_key_warns_and_continues() {
    let harness = aligned_project();
    let output = harness.run(&["validate", "--ai"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("no API key found"));
    assert!(!stdout(&output).contains("Assessment"));
}

#[test]
fn test_concept_filter_flag() {
    let harness = aligned_project();
    harness.write_spec("Audit.concept", AUDIT_SPEC);

    let output = harness.run(&["validate", "--concept", "Team"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(!stdout(&output).contains("Audit"));
}

#[test]
fn test_init_writes_config_and_refuses_overwrite() {
    let harness = TestHarness::new();

    let first = harness.run(&["init"]);
    assert_eq!(first.status.code(), Some(0));
    let path = harness.path().join(".concept-lint/config.md");
    assert!(path.exists());

    fs::write(&path, "---\nstrict: true\n---\n").unwrap();
    let second = harness.run(&["init"]);
    assert_eq!(second.status.code(), Some(1));
    assert!(stderr(&second).contains("--force"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "---\nstrict: true\n---\n");

    let forced = harness.run(&["init", "--force"]);
    assert_eq!(forced.status.code(), Some(0));
    assert!(fs::read_to_string(&path).unwrap().contains("implementations: concepts"));
}

#[test]
fn test_analyze_requires_assessment_key() {
    let harness = aligned_project();
    let output = harness.run(&["analyze", "Team", "actions"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("API key"));
}

#[test]
fn test_analyze_rejects_unknown_aspect() {
    let harness = aligned_project();
    let output = harness.run(&["analyze", "Team", "colour"]);
    assert_eq!(output.status.code(), Some(2));
}
