//! Markdown summary report.

use anyhow::{Context, Result};
use std::fmt::Write;
use std::fs;
use std::path::Path;

use super::{group_by_severity, group_title, ReportStats};
use crate::validation::ValidationReport;

/// Markdown text of the summary report.
pub fn summary_markdown(reports: &[ValidationReport]) -> String {
    let stats = ReportStats::from_reports(reports);
    let mut out = String::new();

    let _ = writeln!(out, "# Concept Validation Summary\n");
    let _ = writeln!(out, "Generated {}\n", crate::utc_now_iso());
    let _ = writeln!(out, "| Concepts | Errors | Warnings | Info | Average score |");
    let _ = writeln!(out, "|---|---|---|---|---|");
    let _ = writeln!(
        out,
        "| {} | {} | {} | {} | {} |\n",
        stats.concepts, stats.errors, stats.warnings, stats.infos, stats.average_score
    );

    for report in reports {
        let _ = writeln!(
            out,
            "## {} ({}/100)\n",
            report.concept_name, report.summary.score
        );
        if !report.spec_file.is_empty() {
            let _ = writeln!(out, "- Specification: `{}`", report.spec_file);
        }
        let _ = writeln!(out, "- Implementation: `{}`", report.implementation_file);
        for related in &report.related_files {
            let _ = writeln!(out, "- Related: `{}`", related);
        }
        out.push('\n');

        let groups = group_by_severity(report);
        if groups.is_empty() {
            let _ = writeln!(out, "No issues found.\n");
        }
        for group in groups {
            let _ = writeln!(out, "### {}\n", group_title(group.severity));
            for issue in group.issues {
                let _ = writeln!(
                    out,
                    "- **{}** {} (`{}`)",
                    issue.category, issue.message, issue.location
                );
                if let Some(suggestion) = &issue.suggestion {
                    let _ = writeln!(out, "  - Suggestion: {}", suggestion);
                }
            }
            out.push('\n');
        }

        if let Some(assessment) = &report.assessment {
            let _ = writeln!(out, "### Assessment\n");
            let _ = writeln!(out, "{}\n", assessment.purpose_alignment_note);
            if !assessment.implementation_quality_note.is_empty() {
                let _ = writeln!(out, "{}\n", assessment.implementation_quality_note);
            }
            for suggestion in &assessment.suggestions {
                let _ = writeln!(out, "- {}", suggestion);
            }
            if !assessment.suggestions.is_empty() {
                out.push('\n');
            }
        }
    }

    out
}

/// Write the Markdown summary to `path`.
pub fn render_summary(reports: &[ValidationReport], path: &Path) -> Result<()> {
    fs::write(path, summary_markdown(reports))
        .with_context(|| format!("Failed to write {}", path.display()))
}
