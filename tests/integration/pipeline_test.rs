//! Library-level tests of the full validation pipeline.

use std::fs;
use std::time::Duration;

use anyhow::Result;
use concept_lint::assessment::{
    CompletionClient, DisabledAssessor, ServiceAssessor, UNAVAILABLE_NOTE,
};
use concept_lint::compare::{Comparator, ValidationRun};
use concept_lint::validation::{IssueCategory, Severity, MISSING_IMPLEMENTATION};

use crate::support::fixtures::*;
use crate::support::harness::TestHarness;

/// Completion client that always answers with the same text.
struct CannedClient(&'static str);

impl CompletionClient for CannedClient {
    fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

fn validate(harness: &TestHarness) -> ValidationRun {
    Comparator::new(Box::new(DisabledAssessor))
        .unwrap()
        .validate_all(
            &harness.specs_dir,
            &harness.concepts_dir,
            Some(&harness.syncs_dir),
        )
        .unwrap()
}

#[test]
fn test_round_trip_completeness() {
    let harness = TestHarness::new();
    harness.write_spec("Team.concept", TEAM_SPEC);
    harness.write_impl("Team/TeamConcept.ts", &team_impl());

    let run = validate(&harness);
    assert_eq!(run.reports.len(), 1);
    let report = &run.reports[0];
    assert_eq!(report.concept_name, "Team");
    assert!(
        report
            .issues
            .iter()
            .all(|i| i.severity == Severity::Info),
        "unexpected issues: {:#?}",
        report.issues
    );
    assert_eq!(report.summary.score, 100);
    assert!(report.assessment.is_none());
    assert!(run.skipped.is_empty());
}

#[test]
fn test_missing_action_detection() {
    let harness = TestHarness::new();
    harness.write_spec("Team.concept", TEAM_SPEC);
    harness.write_impl("Team/TeamConcept.ts", &team_impl_without_delete());

    let run = validate(&harness);
    let report = &run.reports[0];
    let missing: Vec<_> = report
        .issues
        .iter()
        .filter(|i| i.category == IssueCategory::MissingAction)
        .collect();
    assert_eq!(missing.len(), 1);
    assert!(missing[0].message.contains("delete"));
    assert_eq!(missing[0].severity, Severity::Error);
    assert_eq!(report.summary.score, 80);
    assert!(run.has_errors());
}

#[test]
fn test_query_naming() {
    let harness = TestHarness::new();
    harness.write_spec("Roster.concept", ROSTER_SPEC);
    harness.write_impl("Roster/RosterConcept.ts", ROSTER_IMPL);

    let run = validate(&harness);
    let report = &run.reports[0];
    let naming: Vec<_> = report
        .issues
        .iter()
        .filter(|i| i.category == IssueCategory::NamingConvention)
        .collect();
    assert_eq!(naming.len(), 1, "issues: {:#?}", report.issues);
    assert_eq!(naming[0].severity, Severity::Error);
    assert!(naming[0]
        .suggestion
        .as_deref()
        .unwrap()
        .contains("_getActive"));
}

#[test]
fn test_pairing_on_exposed_type_name() {
    let harness = TestHarness::new();
    harness.write_spec("Team.concept", TEAM_SPEC);
    harness.write_impl("team/index.ts", &team_impl());

    let run = validate(&harness);
    assert_eq!(run.reports.len(), 1);
    assert!(run.reports[0].implementation_file.ends_with("index.ts"));
    assert_eq!(run.reports[0].summary.score, 100);
}

#[test]
fn test_pairing_independent_of_directory_order() {
    let harness = TestHarness::new();
    harness.write_spec("a_Team.concept", TEAM_SPEC);
    harness.write_spec("z_Roster.concept", ROSTER_SPEC);
    harness.write_impl("a/RosterConcept.ts", ROSTER_IMPL);
    harness.write_impl("z/TeamConcept.ts", &team_impl());

    let run = validate(&harness);
    assert_eq!(run.reports.len(), 2);
    for report in &run.reports {
        assert_ne!(report.implementation_file, MISSING_IMPLEMENTATION);
        assert!(report.implementation_file.contains(&format!("{}Concept", report.concept_name)));
    }
}

#[test]
fn test_spec_named_with_suffix_pairs_with_plain_module() {
    let harness = TestHarness::new();
    harness.write_spec(
        "Team.concept",
        &TEAM_SPEC.replace("concept Team", "concept TeamConcept"),
    );
    harness.write_impl("Team.ts", &team_impl());

    let run = validate(&harness);
    assert_eq!(run.reports.len(), 1);
    assert!(run.reports[0].implementation_file.ends_with("Team.ts"));
}

#[test]
fn test_unpaired_specification_and_implementation() {
    let harness = TestHarness::new();
    harness.write_spec("Audit.concept", AUDIT_SPEC);
    harness.write_impl("Label/LabelConcept.ts", ORPHAN_IMPL);

    let run = validate(&harness);
    assert_eq!(run.reports.len(), 2);

    let audit = &run.reports[0];
    assert_eq!(audit.concept_name, "Audit");
    assert_eq!(audit.implementation_file, MISSING_IMPLEMENTATION);
    assert_eq!(audit.issues.len(), 1);
    assert_eq!(audit.summary.error_count, 1);
    assert_eq!(audit.summary.score, 0);

    let label = &run.reports[1];
    assert_eq!(label.concept_name, "Label");
    assert_eq!(label.issues.len(), 1);
    assert_eq!(label.issues[0].category, IssueCategory::StateMismatch);
    assert_eq!(label.summary.warning_count, 1);
    assert_eq!(label.summary.score, 60);
}

#[test]
fn test_enrichment_fallback() {
    let harness = TestHarness::new();
    harness.write_spec("Team.concept", TEAM_SPEC);
    harness.write_impl("Team/TeamConcept.ts", &team_impl());

    let assessor = ServiceAssessor::chat_completions(
        "http://127.0.0.1:9",
        "gpt-4o-mini",
        "test-key",
        Duration::from_millis(500),
    )
    .unwrap();
    let run = Comparator::new(Box::new(assessor))
        .unwrap()
        .validate_all(&harness.specs_dir, &harness.concepts_dir, None)
        .unwrap();

    let assessment = run.reports[0].assessment.as_ref().unwrap();
    assert_eq!(assessment.purpose_alignment_note, UNAVAILABLE_NOTE);
    assert_eq!(assessment.suggestions.len(), 1);
    assert_eq!(run.reports[0].summary.score, 100);
}

#[test]
fn test_related_files_are_listed() {
    let harness = TestHarness::new();
    harness.write_spec("Team.concept", TEAM_SPEC);
    harness.write_impl("Team/TeamConcept.ts", &team_impl());
    harness.write_sync("teams.sync.ts", "export const CreateTeam = ({ TeamConcept }) => ({});");
    harness.write_sync("users.sync.ts", "export const Register = ({ UserConcept }) => ({});");

    let run = validate(&harness);
    let related = &run.reports[0].related_files;
    assert_eq!(related.len(), 1);
    assert!(related[0].ends_with("teams.sync.ts"));
}

#[test]
fn test_unreadable_related_file_is_skipped_once() {
    let harness = TestHarness::new();
    harness.write_spec("Team.concept", TEAM_SPEC);
    harness.write_spec("Roster.concept", ROSTER_SPEC);
    harness.write_impl("Team/TeamConcept.ts", &team_impl_without_delete());
    harness.write_impl("Roster/RosterConcept.ts", ROSTER_IMPL);
    harness.write_sync("teams.sync.ts", "export const CreateTeam = ({ TeamConcept }) => ({});");
    fs::write(harness.syncs_dir.join("unrelated.md"), [0xff, 0xfe, 0x00]).unwrap();

    let run = validate(&harness);
    assert_eq!(run.reports.len(), 2);
    assert_eq!(run.skipped.len(), 1);
    assert!(run.skipped[0].path.ends_with("unrelated.md"));

    let team = run
        .reports
        .iter()
        .find(|r| r.concept_name == "Team")
        .unwrap();
    assert!(team
        .issues
        .iter()
        .any(|i| i.category == IssueCategory::MissingAction && i.message.contains("delete")));
    assert_eq!(team.summary.score, 80);
    assert_eq!(team.related_files.len(), 1);

    let roster = run
        .reports
        .iter()
        .find(|r| r.concept_name == "Roster")
        .unwrap();
    assert!(roster
        .issues
        .iter()
        .any(|i| i.category == IssueCategory::NamingConvention));
    assert!(run.has_errors());
}

#[test]
fn test_assessment_issues_are_merged() {
    let harness = TestHarness::new();
    harness.write_spec("Team.concept", TEAM_SPEC);
    harness.write_impl("Team/TeamConcept.ts", &team_impl());

    let reply = r#"Here is my review:
{"alignment": "partial", "score": 70,
 "issues": [
   {"severity": "critical", "description": "Ownership is never checked", "suggestion": "Verify owner in delete"},
   {"severity": "minor", "description": "Team names are not normalized"}
 ],
 "suggestions": []}"#;
    let assessor = ServiceAssessor::new(Box::new(CannedClient(reply)));
    let run = Comparator::new(Box::new(assessor))
        .unwrap()
        .validate_all(&harness.specs_dir, &harness.concepts_dir, None)
        .unwrap();

    let report = &run.reports[0];
    let merged: Vec<_> = report
        .issues
        .iter()
        .filter(|i| i.category == IssueCategory::PurposeAlignment)
        .collect();
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].severity, Severity::Error);
    assert_eq!(merged[0].message, "Ownership is never checked");
    assert_eq!(merged[1].severity, Severity::Info);
    assert_eq!(report.summary.error_count, 1);
    assert_eq!(report.summary.info_count, 1);
    assert_eq!(report.summary.score, 79);
    assert_eq!(report.assessment.as_ref().unwrap().score, Some(70));
    assert!(run.has_errors());
}

#[test]
fn test_unusable_files_are_skipped() {
    let harness = TestHarness::new();
    harness.write_spec("Team.concept", TEAM_SPEC);
    harness.write_spec("notes.md", "# Design notes\n\nNothing to see here.\n");
    harness.write_impl("Team/TeamConcept.ts", &team_impl());
    harness.write_impl("Team/TeamConcept.test.ts", "Deno.test('x', () => {});");

    let run = validate(&harness);
    assert_eq!(run.reports.len(), 1);
    assert_eq!(run.skipped.len(), 1);
    assert!(run.skipped[0].path.ends_with("notes.md"));
}

#[test]
fn test_concept_filter() {
    let harness = TestHarness::new();
    harness.write_spec("Team.concept", TEAM_SPEC);
    harness.write_spec("Audit.concept", AUDIT_SPEC);
    harness.write_impl("Team/TeamConcept.ts", &team_impl());
    harness.write_impl("Label/LabelConcept.ts", ORPHAN_IMPL);

    let run = Comparator::new(Box::new(DisabledAssessor))
        .unwrap()
        .with_filter(Some("teamconcept".to_string()))
        .validate_all(&harness.specs_dir, &harness.concepts_dir, None)
        .unwrap();
    assert_eq!(run.reports.len(), 1);
    assert_eq!(run.reports[0].concept_name, "Team");
}

#[test]
fn test_missing_directory_fails_the_run() {
    let harness = TestHarness::new();
    let result = Comparator::new(Box::new(DisabledAssessor))
        .unwrap()
        .validate_all(
            &harness.path().join("nope"),
            &harness.concepts_dir,
            None,
        );
    assert!(result.is_err());
}
