//! Validation orchestrator.
//!
//! Scans the specification and implementation directories, pairs concepts,
//! runs the check battery on every pair and asks the assessor for an optional
//! review. Only resolving the two top-level directories may fail the run; any
//! problem with a single file or concept ends up in [`ValidationRun::skipped`].

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use crate::assessment::Assessor;
use crate::concept::{parse_directory, ConceptSpecification};
use crate::scan::{find_files, Scan, Skipped};
use crate::source::{ImplementationModule, SourceExtractor};
use crate::validation::{
    IssueCategory, Location, Severity, ValidationIssue, ValidationReport, MISSING_IMPLEMENTATION,
};

pub mod checks;
pub mod pairing;

pub use checks::compare;
pub use pairing::{concept_key, module_matches, pair, Pairing};

/// File extensions scanned in the related (synchronization) directory.
pub const RELATED_EXTENSIONS: &[&str] = &["ts", "sync", "md"];

/// Score given to a specification with no implementation.
pub const UNPAIRED_SPEC_SCORE: u8 = 0;
/// Score given to an implementation with no specification.
pub const UNPAIRED_IMPL_SCORE: u8 = 60;

/// A readable file from the related directory.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedFile {
    pub path: PathBuf,
    pub text: String,
}

/// Everything one validation run produced.
#[derive(Debug, Default)]
pub struct ValidationRun {
    pub reports: Vec<ValidationReport>,
    pub skipped: Vec<Skipped>,
}

impl ValidationRun {
    pub fn has_errors(&self) -> bool {
        self.reports.iter().any(|r| r.has_errors())
    }

    pub fn has_warnings(&self) -> bool {
        self.reports.iter().any(|r| r.has_warnings())
    }
}

pub struct Comparator {
    assessor: Box<dyn Assessor>,
    extractor: SourceExtractor,
    concept_filter: Option<String>,
}

impl Comparator {
    pub fn new(assessor: Box<dyn Assessor>) -> Result<Self> {
        Ok(Self {
            assessor,
            extractor: SourceExtractor::new()?,
            concept_filter: None,
        })
    }

    /// Limit the run to one concept.
    pub fn with_filter(mut self, concept: Option<String>) -> Self {
        self.concept_filter = concept;
        self
    }

    pub fn assessor(&self) -> &dyn Assessor {
        self.assessor.as_ref()
    }

    pub fn extractor(&self) -> &SourceExtractor {
        &self.extractor
    }

    /// Validate every concept found under `spec_dir` against `impl_dir`.
    pub fn validate_all(
        &self,
        spec_dir: &Path,
        impl_dir: &Path,
        related_dir: Option<&Path>,
    ) -> Result<ValidationRun> {
        let spec_scan = parse_directory(spec_dir)
            .with_context(|| format!("Failed to scan specifications in {}", spec_dir.display()))?;
        let impl_scan = self.extractor.analyze_directory(impl_dir).with_context(|| {
            format!("Failed to scan implementations in {}", impl_dir.display())
        })?;

        let mut run = ValidationRun::default();
        run.skipped.extend(spec_scan.skipped);
        run.skipped.extend(impl_scan.skipped);

        let (specs, modules) = self.apply_filter(spec_scan.items, impl_scan.items);
        let related_scan = read_related(related_dir);
        run.skipped.extend(related_scan.skipped);
        let related_files = related_scan.items;

        tracing::debug!(
            specs = specs.len(),
            modules = modules.len(),
            related = related_files.len(),
            "pairing concepts"
        );

        let pairing = pair(&specs, &modules);
        for (spec_idx, module_idx) in pairing.specs {
            let spec = &specs[spec_idx];
            let report = match module_idx {
                Some(idx) => {
                    let module = &modules[idx];
                    match self.validate_pair(spec, module, &related_files) {
                        Ok(report) => report,
                        Err(e) => {
                            let reason = format!("{:#}", e);
                            tracing::warn!(concept = %spec.name, error = %reason, "validation failed");
                            run.skipped.push(Skipped {
                                path: module.source_location.clone(),
                                reason: reason.clone(),
                            });
                            failed_report(spec, module, &reason)
                        }
                    }
                }
                None => unpaired_spec_report(spec),
            };
            run.reports.push(report);
        }

        for idx in pairing.unpaired_modules {
            run.reports.push(unpaired_module_report(&modules[idx]));
        }

        Ok(run)
    }

    fn apply_filter(
        &self,
        specs: Vec<ConceptSpecification>,
        modules: Vec<ImplementationModule>,
    ) -> (Vec<ConceptSpecification>, Vec<ImplementationModule>) {
        let Some(filter) = self.concept_filter.as_deref() else {
            return (specs, modules);
        };
        let key = concept_key(filter);
        let specs = specs
            .into_iter()
            .filter(|s| concept_key(&s.name) == key)
            .collect();
        let modules = modules
            .into_iter()
            .filter(|m| module_matches(m, &key))
            .collect();
        (specs, modules)
    }

    /// Run the battery and the optional assessment for one pair.
    pub fn validate_pair(
        &self,
        spec: &ConceptSpecification,
        module: &ImplementationModule,
        related_files: &[RelatedFile],
    ) -> Result<ValidationReport> {
        tracing::debug!(concept = %spec.name, module = %module.source_location.display(), "validating");

        let (related_paths, related_text) = collect_related(&spec.name, related_files)?;
        let mut issues = compare(spec, module);

        let related = (!related_text.is_empty()).then_some(related_text.as_str());
        let assessment = self.assessor.assess(spec, module, related);
        if let Some(assessment) = &assessment {
            issues.extend(assessment.to_validation_issues(&Location::file(&module.source_location)));
        }

        let mut report = ValidationReport::new(
            &spec.name,
            spec.source_location.display().to_string(),
            module.source_location.display().to_string(),
            issues,
        );
        report.related_files = related_paths;
        report.assessment = assessment;
        Ok(report)
    }
}

/// Read the related directory once. Unreadable files are skipped one by one;
/// a missing directory only logs a warning.
fn read_related(related_dir: Option<&Path>) -> Scan<RelatedFile> {
    let mut scan = Scan::default();
    let Some(dir) = related_dir else {
        return scan;
    };
    let files = match find_files(dir, RELATED_EXTENSIONS) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "ignoring related directory");
            return scan;
        }
    };
    for path in files {
        let outcome = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read related file {}", path.display()))
            .map(|text| RelatedFile {
                path: path.clone(),
                text,
            });
        scan.push(&path, outcome);
    }
    scan
}

/// Related files that mention the concept, with their concatenated text.
fn collect_related(concept: &str, files: &[RelatedFile]) -> Result<(Vec<String>, String)> {
    if files.is_empty() {
        return Ok((Vec::new(), String::new()));
    }

    let base = crate::concept::strip_suffix(concept);
    let pattern = format!(
        r"\b(?:{}|{}{})\b",
        regex::escape(base),
        regex::escape(base),
        crate::concept::CONVENTIONAL_SUFFIX
    );
    let mention = Regex::new(&pattern).context("Failed to build concept name pattern")?;

    let mut paths = Vec::new();
    let mut text = String::new();
    for file in files {
        if mention.is_match(&file.text) {
            paths.push(file.path.display().to_string());
            text.push_str(&format!("// {}\n{}\n", file.path.display(), file.text));
        }
    }
    Ok((paths, text))
}

fn unpaired_spec_report(spec: &ConceptSpecification) -> ValidationReport {
    let issue = ValidationIssue::error(
        IssueCategory::MissingAction,
        format!("No implementation found for concept '{}'", spec.name),
        Location::file(&spec.source_location),
    )
    .with_suggestion(format!(
        "Create {}.ts exporting class {}",
        spec.expected_type_name(),
        spec.expected_type_name()
    ));
    ValidationReport::new(
        &spec.name,
        spec.source_location.display().to_string(),
        MISSING_IMPLEMENTATION,
        vec![issue],
    )
    .with_score(UNPAIRED_SPEC_SCORE)
}

fn unpaired_module_report(module: &ImplementationModule) -> ValidationReport {
    let name = module
        .exposed_type_name
        .clone()
        .unwrap_or_else(|| module.name.clone());
    let issue = ValidationIssue::warning(
        IssueCategory::StateMismatch,
        format!("No specification found for '{}'", name),
        Location::file(&module.source_location),
    )
    .with_suggestion(format!(
        "Write a specification starting with 'concept {}'",
        crate::concept::strip_suffix(&name)
    ));
    ValidationReport::new(
        crate::concept::strip_suffix(&name),
        String::new(),
        module.source_location.display().to_string(),
        vec![issue],
    )
    .with_score(UNPAIRED_IMPL_SCORE)
}

fn failed_report(
    spec: &ConceptSpecification,
    module: &ImplementationModule,
    reason: &str,
) -> ValidationReport {
    let issue = ValidationIssue::new(
        Severity::Warning,
        IssueCategory::StateMismatch,
        format!("Validation of '{}' failed: {}", spec.name, reason),
        Location::file(&module.source_location),
    );
    ValidationReport::new(
        &spec.name,
        spec.source_location.display().to_string(),
        module.source_location.display().to_string(),
        vec![issue],
    )
}
