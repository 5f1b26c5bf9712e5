//! The `validate` command.

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use concept_lint::compare::{Comparator, ValidationRun};
use concept_lint::config::ConfigOverrides;
use concept_lint::report::{render_console, render_skipped, write_reports, OutputFormat};

pub struct ValidateOptions {
    pub config: Option<PathBuf>,
    pub overrides: ConfigOverrides,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub concept: Option<String>,
}

/// Exit code for a finished run: 1 on errors, or on warnings in strict mode.
pub fn exit_code(run: &ValidationRun, strict: bool) -> i32 {
    if run.has_errors() || (strict && run.has_warnings()) {
        1
    } else {
        0
    }
}

pub fn cmd_validate(options: &ValidateOptions) -> Result<i32> {
    let config = super::load_config(options.config.as_deref(), &options.overrides)?;
    let assessor = super::build_assessor(&config, options.overrides.api_key.as_deref())?;

    let comparator = Comparator::new(assessor)?.with_filter(options.concept.clone());
    let related_dir = config.related_dir();
    let run = comparator.validate_all(
        &config.spec_dir(),
        &config.impl_dir(),
        related_dir.as_deref(),
    )?;

    if let Some(concept) = &options.concept {
        if run.reports.is_empty() {
            eprintln!(
                "{} No concept named '{}' was found",
                "Warning:".yellow(),
                concept
            );
        }
    }

    if matches!(options.format, OutputFormat::Console | OutputFormat::All) {
        print!("{}", render_console(&run.reports));
    }

    for path in write_reports(&run.reports, options.format, &options.output)? {
        println!("{} Wrote {}", "✓".green(), path.display());
    }

    let skipped = render_skipped(&run.skipped);
    if !skipped.is_empty() {
        eprint!("{}", skipped);
    }

    Ok(exit_code(&run, config.strict))
}

#[cfg(test)]
mod tests {
    use super::*;
    use concept_lint::validation::{IssueCategory, Location, ValidationIssue, ValidationReport};

    fn run_with(issue: Option<ValidationIssue>) -> ValidationRun {
        ValidationRun {
            reports: vec![ValidationReport::new(
                "Team",
                "specs/Team.concept",
                "concepts/TeamConcept.ts",
                issue.into_iter().collect(),
            )],
            skipped: Vec::new(),
        }
    }

    #[test]
    fn test_exit_code() {
        let location = Location::file("concepts/TeamConcept.ts");
        assert_eq!(exit_code(&run_with(None), true), 0);

        let warning = ValidationIssue::warning(IssueCategory::NamingConvention, "w", location.clone());
        assert_eq!(exit_code(&run_with(Some(warning.clone())), false), 0);
        assert_eq!(exit_code(&run_with(Some(warning)), true), 1);

        let error = ValidationIssue::error(IssueCategory::MissingAction, "e", location);
        assert_eq!(exit_code(&run_with(Some(error)), false), 1);
    }
}
