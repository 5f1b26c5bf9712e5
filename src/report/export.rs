//! Structured JSON export.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use super::ReportStats;
use crate::validation::ValidationReport;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub concepts_analyzed: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub average_score: f64,
}

/// Top-level document of the JSON export.
#[derive(Debug, Serialize)]
pub struct StructuredExport<'a> {
    pub timestamp: String,
    pub summary: ExportSummary,
    pub reports: &'a [ValidationReport],
}

impl<'a> StructuredExport<'a> {
    pub fn new(reports: &'a [ValidationReport]) -> Self {
        let stats = ReportStats::from_reports(reports);
        Self {
            timestamp: crate::utc_now_iso(),
            summary: ExportSummary {
                concepts_analyzed: stats.concepts,
                total_errors: stats.errors,
                total_warnings: stats.warnings,
                average_score: stats.average_score,
            },
            reports,
        }
    }
}

/// Write the JSON export to `path`.
pub fn export_structured(reports: &[ValidationReport], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&StructuredExport::new(reports))
        .context("Failed to serialize reports")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
