//! Alignment issues and per-concept validation reports.
//!
//! Issue categories form a closed taxonomy so that every check maps to exactly
//! one category and renderers can match on it exhaustively.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::assessment::Assessment;

/// Sentinel used as the implementation file of an unpaired specification.
pub const MISSING_IMPLEMENTATION: &str = "MISSING";

/// Severity level for alignment issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,
    /// Should be addressed but does not fail the run
    Warning,
    /// Must be fixed
    Error,
}

impl Severity {
    /// Severities in rendering order, most severe first.
    pub const ORDERED: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Info];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Category of an alignment issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    MissingAction,
    MissingQuery,
    SignatureMismatch,
    ReturnTypeMismatch,
    MissingErrorHandling,
    StateMismatch,
    NamingConvention,
    PurposeAlignment,
    OperationalPrincipleViolation,
    SyncAlignment,
    DependencyViolation,
    ConceptIndependence,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingAction => "missing_action",
            Self::MissingQuery => "missing_query",
            Self::SignatureMismatch => "signature_mismatch",
            Self::ReturnTypeMismatch => "return_type_mismatch",
            Self::MissingErrorHandling => "missing_error_handling",
            Self::StateMismatch => "state_mismatch",
            Self::NamingConvention => "naming_convention",
            Self::PurposeAlignment => "purpose_alignment",
            Self::OperationalPrincipleViolation => "operational_principle_violation",
            Self::SyncAlignment => "sync_alignment",
            Self::DependencyViolation => "dependency_violation",
            Self::ConceptIndependence => "concept_independence",
        }
    }
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an issue was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Location {
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl Location {
    pub fn file(file: impl AsRef<Path>) -> Self {
        Self {
            file: file.as_ref().to_path_buf(),
            line: None,
            column: None,
        }
    }

    pub fn at(file: impl AsRef<Path>, line: usize) -> Self {
        Self {
            line: Some(line),
            ..Self::file(file)
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
            if let Some(column) = self.column {
                write!(f, ":{}", column)?;
            }
        }
        Ok(())
    }
}

/// The other side of an issue, e.g. the spec line a mismatch refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedReference {
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

/// A single alignment issue
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub severity: Severity,
    pub category: IssueCategory,
    pub message: String,
    pub description: String,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_reference: Option<RelatedReference>,
}

impl ValidationIssue {
    /// Create a new issue
    pub fn new(
        severity: Severity,
        category: IssueCategory,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            description: String::new(),
            location,
            suggestion: None,
            related_reference: None,
        }
    }

    pub fn error(category: IssueCategory, message: impl Into<String>, location: Location) -> Self {
        Self::new(Severity::Error, category, message, location)
    }

    pub fn warning(
        category: IssueCategory,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self::new(Severity::Warning, category, message, location)
    }

    pub fn info(category: IssueCategory, message: impl Into<String>, location: Location) -> Self {
        Self::new(Severity::Info, category, message, location)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a suggestion to this issue
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_related(
        mut self,
        file: impl AsRef<Path>,
        line: Option<usize>,
        excerpt: Option<String>,
    ) -> Self {
        self.related_reference = Some(RelatedReference {
            file: file.as_ref().to_path_buf(),
            line,
            excerpt,
        });
        self
    }
}

/// Issue counts and score of one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub score: u8,
}

impl ReportSummary {
    pub fn from_issues(issues: &[ValidationIssue]) -> Self {
        let count = |s: Severity| issues.iter().filter(|i| i.severity == s).count();
        let error_count = count(Severity::Error);
        let warning_count = count(Severity::Warning);
        let info_count = count(Severity::Info);
        Self {
            error_count,
            warning_count,
            info_count,
            score: score(error_count, warning_count, info_count),
        }
    }
}

/// `max(0, 100 - 20*errors - 5*warnings - 1*infos)`
pub fn score(errors: usize, warnings: usize, infos: usize) -> u8 {
    let penalty = errors
        .saturating_mul(20)
        .saturating_add(warnings.saturating_mul(5))
        .saturating_add(infos);
    100usize.saturating_sub(penalty) as u8
}

/// Validation outcome for one concept (paired or not).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub concept_name: String,
    pub spec_file: String,
    /// Path of the implementation, or [`MISSING_IMPLEMENTATION`]
    pub implementation_file: String,
    pub related_files: Vec<String>,
    pub issues: Vec<ValidationIssue>,
    pub summary: ReportSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Assessment>,
}

impl ValidationReport {
    /// Build a report, deriving the summary from `issues`.
    pub fn new(
        concept_name: impl Into<String>,
        spec_file: impl Into<String>,
        implementation_file: impl Into<String>,
        issues: Vec<ValidationIssue>,
    ) -> Self {
        let summary = ReportSummary::from_issues(&issues);
        Self {
            concept_name: concept_name.into(),
            spec_file: spec_file.into(),
            implementation_file: implementation_file.into(),
            related_files: Vec::new(),
            issues,
            summary,
            assessment: None,
        }
    }

    /// Override the derived score, as for unpaired concepts.
    pub fn with_score(mut self, score: u8) -> Self {
        self.summary.score = score.min(100);
        self
    }

    pub fn has_errors(&self) -> bool {
        self.summary.error_count > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.summary.warning_count > 0
    }

    /// Issues of one severity, in their original order.
    pub fn issues_with(&self, severity: Severity) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(severity: Severity) -> ValidationIssue {
        ValidationIssue::new(
            severity,
            IssueCategory::MissingAction,
            "x",
            Location::file("a.ts"),
        )
    }

    #[test]
    fn test_score_formula() {
        assert_eq!(score(0, 0, 0), 100);
        assert_eq!(score(1, 1, 1), 74);
        assert_eq!(score(0, 3, 2), 83);
    }

    #[test]
    fn test_score_drops_twenty_per_error_and_floors_at_zero() {
        for errors in 0..4 {
            assert_eq!(
                score(errors, 1, 1) as i32 - score(errors + 1, 1, 1) as i32,
                20
            );
        }
        assert_eq!(score(5, 0, 0), 0);
        assert_eq!(score(6, 0, 0), 0);
        assert_eq!(score(usize::MAX, usize::MAX, usize::MAX), 0);
    }

    #[test]
    fn test_summary_from_issues() {
        let issues = vec![
            issue(Severity::Error),
            issue(Severity::Warning),
            issue(Severity::Warning),
            issue(Severity::Info),
        ];
        let summary = ReportSummary::from_issues(&issues);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.warning_count, 2);
        assert_eq!(summary.info_count, 1);
        assert_eq!(summary.score, 69);
    }

    #[test]
    fn test_report_with_score_override() {
        let report = ValidationReport::new(
            "Team",
            "specs/Team.concept",
            MISSING_IMPLEMENTATION,
            vec![issue(Severity::Error)],
        )
        .with_score(0);
        assert_eq!(report.summary.score, 0);
        assert!(report.has_errors());
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_issue_serializes_snake_case_category() {
        let json = serde_json::to_value(
            issue(Severity::Warning).with_suggestion("rename it"),
        )
        .unwrap();
        assert_eq!(json["category"], "missing_action");
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["suggestion"], "rename it");
        assert!(json.get("relatedReference").is_none());
    }

    #[test]
    fn test_location_display() {
        assert_eq!(Location::at("a.ts", 3).to_string(), "a.ts:3");
        assert_eq!(Location::file("a.ts").to_string(), "a.ts");
    }
}
