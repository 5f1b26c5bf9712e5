//! Self-contained HTML report.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tera::Tera;

use super::{group_by_severity, group_title, ReportStats};
use crate::assessment::Assessment;
use crate::validation::ValidationReport;

pub mod embedded {
    pub const DOCUMENT_HTML: &str = include_str!("../../templates/report/document.html");
    pub const STYLES_CSS: &str = include_str!("../../templates/report/styles.css");
}

#[derive(Serialize)]
struct IssueView {
    category: String,
    message: String,
    description: String,
    location: String,
    suggestion: Option<String>,
}

#[derive(Serialize)]
struct GroupView {
    severity: &'static str,
    title: &'static str,
    issues: Vec<IssueView>,
}

#[derive(Serialize)]
struct ConceptView<'a> {
    name: &'a str,
    score: u8,
    grade: &'static str,
    spec_file: &'a str,
    implementation_file: &'a str,
    related_files: &'a [String],
    groups: Vec<GroupView>,
    assessment: Option<&'a Assessment>,
}

impl<'a> ConceptView<'a> {
    fn from_report(report: &'a ValidationReport) -> Self {
        let groups = group_by_severity(report)
            .into_iter()
            .map(|g| GroupView {
                severity: g.severity.as_str(),
                title: group_title(g.severity),
                issues: g
                    .issues
                    .into_iter()
                    .map(|i| IssueView {
                        category: i.category.to_string(),
                        message: i.message.clone(),
                        description: i.description.clone(),
                        location: i.location.to_string(),
                        suggestion: i.suggestion.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            name: &report.concept_name,
            score: report.summary.score,
            grade: match report.summary.score {
                90..=100 => "good",
                60..=89 => "fair",
                _ => "poor",
            },
            spec_file: &report.spec_file,
            implementation_file: &report.implementation_file,
            related_files: &report.related_files,
            groups,
            assessment: report.assessment.as_ref(),
        }
    }
}

fn create_embedded_tera() -> Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_template("document.html", embedded::DOCUMENT_HTML)?;
    Ok(tera)
}

/// Render the HTML document to a string.
pub fn document_html(reports: &[ValidationReport]) -> Result<String> {
    let tera = create_embedded_tera()?;

    let concepts: Vec<ConceptView> = reports.iter().map(ConceptView::from_report).collect();
    let mut context = tera::Context::new();
    context.insert("styles", embedded::STYLES_CSS);
    context.insert("generated_at", &crate::utc_now_iso());
    context.insert("stats", &ReportStats::from_reports(reports));
    context.insert("concepts", &concepts);

    tera.render("document.html", &context)
        .context("Failed to render HTML report")
}

/// Write the HTML document to `path`.
pub fn render_document(reports: &[ValidationReport], path: &Path) -> Result<()> {
    let html = document_html(reports)?;
    fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))
}
