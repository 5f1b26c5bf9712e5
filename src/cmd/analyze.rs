//! The `analyze` command: a single-aspect assessment of one concept.

use anyhow::{anyhow, Result};
use colored::Colorize;
use std::path::Path;

use concept_lint::assessment::{Aspect, Assessment};
use concept_lint::compare::{concept_key, module_matches, Comparator};
use concept_lint::concept::parse_directory;
use concept_lint::config::ConfigOverrides;

pub fn cmd_analyze(
    concept: &str,
    aspect: Aspect,
    explicit_config: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<i32> {
    let config = super::load_config(explicit_config, overrides)?;
    let assessor = super::build_assessor(&config, overrides.api_key.as_deref())?;
    let comparator = Comparator::new(assessor)?;

    let key = concept_key(concept);
    let spec = parse_directory(&config.spec_dir())?
        .items
        .into_iter()
        .find(|s| concept_key(&s.name) == key)
        .ok_or_else(|| anyhow!("No specification found for concept '{}'", concept))?;
    let module = comparator
        .extractor()
        .analyze_directory(&config.impl_dir())?
        .items
        .into_iter()
        .find(|m| module_matches(m, &key))
        .ok_or_else(|| anyhow!("No implementation found for concept '{}'", concept))?;

    let assessment = comparator
        .assessor()
        .analyze_aspect(&spec, &module, aspect)
        .ok_or_else(|| anyhow!("`analyze` needs the assessment service; provide an API key"))?;

    print!("{}", format_assessment(&spec.name, aspect, &assessment));
    Ok(0)
}

fn format_assessment(concept: &str, aspect: Aspect, assessment: &Assessment) -> String {
    let mut out = format!("{} {}\n", concept.bold(), format!("({})", aspect).dimmed());

    if let Some(alignment) = &assessment.alignment {
        match assessment.score {
            Some(score) => out.push_str(&format!("  Alignment: {} ({}/100)\n", alignment, score)),
            None => out.push_str(&format!("  Alignment: {}\n", alignment)),
        }
    }
    out.push_str(&format!("  {}\n", assessment.purpose_alignment_note));
    if !assessment.implementation_quality_note.is_empty()
        && assessment.implementation_quality_note != assessment.purpose_alignment_note
    {
        out.push_str(&format!("  {}\n", assessment.implementation_quality_note));
    }
    for issue in &assessment.issues {
        out.push_str(&format!(
            "  [{}] {}\n",
            issue.severity.to_severity(),
            issue.description
        ));
        if !issue.suggestion.is_empty() {
            out.push_str(&format!("    → {}\n", issue.suggestion));
        }
    }
    for suggestion in &assessment.suggestions {
        out.push_str(&format!("  → {}\n", suggestion));
    }
    out
}
