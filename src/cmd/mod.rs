//! Command module structure for the concept-lint CLI

use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

use concept_lint::assessment::{Assessor, DisabledAssessor, ServiceAssessor};
use concept_lint::config::{Config, ConfigOverrides, API_KEY_ENV};

pub mod analyze;
pub mod init;
pub mod validate;

/// Load the configuration and merge command-line overrides.
pub fn load_config(explicit: Option<&Path>, overrides: &ConfigOverrides) -> Result<Config> {
    let base = overrides
        .project_root
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let mut config = Config::load_for(&base, explicit)?;
    config.apply(overrides);
    config.validate()?;
    tracing::debug!(
        root = %config.project.root.display(),
        assessment = config.assessment.enabled,
        strict = config.strict,
        "configuration loaded"
    );
    Ok(config)
}

/// Pick the assessor for this run.
///
/// Enrichment without a resolvable credential prints a warning and falls back
/// to [`DisabledAssessor`].
pub fn build_assessor(config: &Config, api_key_flag: Option<&str>) -> Result<Box<dyn Assessor>> {
    if !config.assessment.enabled {
        return Ok(Box::new(DisabledAssessor));
    }

    let Some(api_key) = config.resolve_api_key(api_key_flag) else {
        eprintln!(
            "{} Assessment requested but no API key found (use --api-key or {}); continuing without it",
            "Warning:".yellow(),
            API_KEY_ENV
        );
        return Ok(Box::new(DisabledAssessor));
    };

    let assessor = ServiceAssessor::chat_completions(
        &config.assessment.endpoint,
        &config.assessment.model,
        &api_key,
        config.timeout(),
    )?;
    Ok(Box::new(assessor))
}
