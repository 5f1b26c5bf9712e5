//! Colored terminal output.

use colored::{ColoredString, Colorize};
use std::fmt::Write;

use super::{group_by_severity, group_title, ReportStats};
use crate::scan::Skipped;
use crate::validation::{Severity, ValidationReport, MISSING_IMPLEMENTATION};

fn severity_label(severity: Severity) -> ColoredString {
    match severity {
        Severity::Error => "✗".red(),
        Severity::Warning => "⚠".yellow(),
        Severity::Info => "ℹ".cyan(),
    }
}

fn score_label(score: u8) -> ColoredString {
    let text = format!("{}/100", score);
    match score {
        90..=100 => text.green(),
        60..=89 => text.yellow(),
        _ => text.red(),
    }
}

/// Render every report plus the run summary.
pub fn render_console(reports: &[ValidationReport]) -> String {
    let mut out = String::new();

    for report in reports {
        let _ = writeln!(
            out,
            "{} {}",
            report.concept_name.bold(),
            score_label(report.summary.score)
        );
        if !report.spec_file.is_empty() {
            let _ = writeln!(out, "  {} {}", "spec:".dimmed(), report.spec_file);
        }
        let implementation = if report.implementation_file == MISSING_IMPLEMENTATION {
            MISSING_IMPLEMENTATION.red()
        } else {
            report.implementation_file.normal()
        };
        let _ = writeln!(out, "  {} {}", "impl:".dimmed(), implementation);

        let groups = group_by_severity(report);
        if groups.is_empty() {
            let _ = writeln!(out, "  {}", "✓ No issues".green());
        }
        for group in groups {
            let _ = writeln!(
                out,
                "  {} ({})",
                group_title(group.severity).bold(),
                group.issues.len()
            );
            for issue in group.issues {
                let _ = writeln!(
                    out,
                    "    {} [{}] {}",
                    severity_label(issue.severity),
                    issue.category,
                    issue.message
                );
                let _ = writeln!(out, "      {}", issue.location.to_string().dimmed());
                if let Some(suggestion) = &issue.suggestion {
                    let _ = writeln!(out, "      → {}", suggestion);
                }
            }
        }

        if let Some(assessment) = &report.assessment {
            let _ = writeln!(out, "  {}", "Assessment".bold());
            let _ = writeln!(out, "    {}", assessment.purpose_alignment_note);
            if !assessment.implementation_quality_note.is_empty()
                && assessment.implementation_quality_note != assessment.purpose_alignment_note
            {
                let _ = writeln!(out, "    {}", assessment.implementation_quality_note);
            }
            for suggestion in &assessment.suggestions {
                let _ = writeln!(out, "    → {}", suggestion);
            }
        }
        out.push('\n');
    }

    let stats = ReportStats::from_reports(reports);
    let _ = writeln!(
        out,
        "{} {} concepts, {} errors, {} warnings, {} info, average score {}",
        "Summary:".bold(),
        stats.concepts,
        stats.errors.to_string().red(),
        stats.warnings.to_string().yellow(),
        stats.infos,
        stats.average_score
    );
    out
}

/// Files and concepts left out of the run.
pub fn render_skipped(skipped: &[Skipped]) -> String {
    let mut out = String::new();
    if skipped.is_empty() {
        return out;
    }
    let _ = writeln!(out, "{} ({})", "Skipped".yellow().bold(), skipped.len());
    for entry in skipped {
        let _ = writeln!(out, "  {}: {}", entry.path.display(), entry.reason);
    }
    out
}
