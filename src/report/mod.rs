//! Report rendering.
//!
//! Every renderer works from the same `ValidationReport` slice and the same
//! [`ReportStats`]; they only differ in destination format. Nothing here
//! changes scores or issue sets.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::validation::{Severity, ValidationIssue, ValidationReport};

pub mod console;
pub mod document;
pub mod export;
pub mod summary;

pub use console::{render_console, render_skipped};
pub use document::render_document;
pub use export::{export_structured, StructuredExport};
pub use summary::render_summary;

pub const DOCUMENT_FILE: &str = "validation-report.html";
pub const SUMMARY_FILE: &str = "validation-summary.md";
pub const STRUCTURED_FILE: &str = "validation-report.json";

/// Aggregate statistics shared by every renderer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ReportStats {
    pub concepts: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    /// Mean score rounded to one decimal; 0 when there are no reports
    pub average_score: f64,
}

impl ReportStats {
    pub fn from_reports(reports: &[ValidationReport]) -> Self {
        let mut stats = Self {
            concepts: reports.len(),
            ..Default::default()
        };

        let mut total_score = 0u64;
        for report in reports {
            stats.errors += report.summary.error_count;
            stats.warnings += report.summary.warning_count;
            stats.infos += report.summary.info_count;
            total_score += u64::from(report.summary.score);
        }

        if !reports.is_empty() {
            let mean = total_score as f64 / reports.len() as f64;
            stats.average_score = (mean * 10.0).round() / 10.0;
        }
        stats
    }
}

/// Issues of one severity, in rendering order.
pub struct IssueGroup<'a> {
    pub severity: Severity,
    pub issues: Vec<&'a ValidationIssue>,
}

/// Group a report's issues by severity, most severe first, dropping empty groups.
pub fn group_by_severity(report: &ValidationReport) -> Vec<IssueGroup<'_>> {
    Severity::ORDERED
        .iter()
        .map(|&severity| IssueGroup {
            severity,
            issues: report.issues_with(severity),
        })
        .filter(|g| !g.issues.is_empty())
        .collect()
}

/// Heading used for a severity group.
pub fn group_title(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "Errors",
        Severity::Warning => "Warnings",
        Severity::Info => "Info",
    }
}

/// Output destination selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Console,
    Document,
    Summary,
    Structured,
    All,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::Document => "document",
            Self::Summary => "summary",
            Self::Structured => "structured",
            Self::All => "all",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "document" | "html" => Ok(Self::Document),
            "summary" | "markdown" => Ok(Self::Summary),
            "structured" | "json" => Ok(Self::Structured),
            "all" => Ok(Self::All),
            other => anyhow::bail!(
                "Unknown output format '{}'. Use console, document, summary, structured or all",
                other
            ),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write the file-based formats selected by `format` into `output_dir`.
///
/// Console output is not written here; the caller prints it. Returns the
/// paths written.
pub fn write_reports(
    reports: &[ValidationReport],
    format: OutputFormat,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let targets: &[OutputFormat] = match format {
        OutputFormat::Console => return Ok(Vec::new()),
        OutputFormat::All => &[
            OutputFormat::Document,
            OutputFormat::Summary,
            OutputFormat::Structured,
        ],
        _ => std::slice::from_ref(&format),
    };

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let mut written = Vec::new();
    for target in targets {
        let path = match target {
            OutputFormat::Document => {
                let path = output_dir.join(DOCUMENT_FILE);
                render_document(reports, &path)?;
                path
            }
            OutputFormat::Summary => {
                let path = output_dir.join(SUMMARY_FILE);
                render_summary(reports, &path)?;
                path
            }
            OutputFormat::Structured => {
                let path = output_dir.join(STRUCTURED_FILE);
                export_structured(reports, &path)?;
                path
            }
            OutputFormat::Console | OutputFormat::All => continue,
        };
        tracing::debug!(path = %path.display(), "report written");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::validation::{IssueCategory, Location, ValidationIssue, ValidationReport};

    /// Two reports: one with an error, a warning and an info; one clean.
    pub fn reports() -> Vec<ValidationReport> {
        let issues = vec![
            ValidationIssue::info(
                IssueCategory::SignatureMismatch,
                "Action 'rename' accesses the database but is not async",
                Location::at("concepts/TeamConcept.ts", 40),
            ),
            ValidationIssue::error(
                IssueCategory::MissingAction,
                "Action 'delete' is specified but not implemented",
                Location::file("concepts/TeamConcept.ts"),
            )
            .with_suggestion("Add an async 'delete' method to TeamConcept"),
            ValidationIssue::warning(
                IssueCategory::NamingConvention,
                "Type 'Teams' should be named 'TeamConcept' <b>",
                Location::file("concepts/TeamConcept.ts"),
            ),
        ];
        vec![
            ValidationReport::new(
                "Team",
                "specs/Team.concept",
                "concepts/TeamConcept.ts",
                issues,
            ),
            ValidationReport::new(
                "User",
                "specs/User.concept",
                "concepts/UserConcept.ts",
                Vec::new(),
            ),
        ]
    }
}
