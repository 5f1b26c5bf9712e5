//! Configuration for concept-lint projects.
//!
//! The configuration file is `<root>/.concept-lint/config.md`: YAML frontmatter
//! followed by free-form Markdown notes. Command-line flags are merged on top
//! with [`Config::apply`] and always win.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths::CONFIG_FILE;

pub mod defaults;
pub mod validation;

pub use defaults::*;

/// Environment variable holding the assessment credential.
pub const API_KEY_ENV: &str = "CONCEPT_LINT_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub assessment: AssessmentConfig,
    #[serde(default)]
    pub strict: bool,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub project_root: Option<PathBuf>,
    pub specs: Option<PathBuf>,
    pub implementations: Option<PathBuf>,
    pub related: Option<PathBuf>,
    pub enable_assessment: bool,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub strict: bool,
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let (frontmatter, _body) = split_frontmatter(content);
        let frontmatter = frontmatter.context("Failed to extract frontmatter from config")?;

        let config: Config =
            serde_yaml::from_str(&frontmatter).context("Failed to parse config frontmatter")?;

        config.validate()?;

        Ok(config)
    }

    /// Load the configuration for the project at `base`.
    ///
    /// An explicit path must exist. Otherwise `<base>/.concept-lint/config.md`
    /// is used when present, and the defaults when it is not. A relative
    /// `project.root` is resolved against `base`.
    pub fn load_for(base: &Path, explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = base.join(CONFIG_FILE);
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };

        if config.project.root.is_relative() {
            config.project.root = base.join(&config.project.root);
        }
        Ok(config)
    }

    /// Merge command-line values over the loaded configuration.
    ///
    /// The credential flag is not merged; see [`Config::resolve_api_key`].
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(root) = &overrides.project_root {
            self.project.root = root.clone();
        }
        if let Some(specs) = &overrides.specs {
            self.paths.specs = specs.clone();
        }
        if let Some(implementations) = &overrides.implementations {
            self.paths.implementations = implementations.clone();
        }
        if let Some(related) = &overrides.related {
            self.paths.related = Some(related.clone());
        }
        if overrides.enable_assessment {
            self.assessment.enabled = true;
        }
        if let Some(model) = &overrides.model {
            self.assessment.model = model.clone();
        }
        if overrides.strict {
            self.strict = true;
        }
    }

    pub fn spec_dir(&self) -> PathBuf {
        self.project.root.join(&self.paths.specs)
    }

    pub fn impl_dir(&self) -> PathBuf {
        self.project.root.join(&self.paths.implementations)
    }

    pub fn related_dir(&self) -> Option<PathBuf> {
        self.paths
            .related
            .as_ref()
            .map(|related| self.project.root.join(related))
    }

    /// Assessment credential: flag, then environment, then config file.
    pub fn resolve_api_key(&self, flag: Option<&str>) -> Option<String> {
        flag.map(str::to_string)
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .or_else(|| self.assessment.api_key.clone())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.assessment.timeout_secs)
    }
}

/// Split a document into YAML frontmatter and body.
pub fn split_frontmatter(content: &str) -> (Option<String>, &str) {
    let content = content.trim();

    if !content.starts_with("---") {
        return (None, content);
    }

    let rest = &content[3..];
    if let Some(end) = rest.find("\n---") {
        let frontmatter = rest[..end].to_string();
        let body = rest[end + 4..].trim_start();
        (Some(frontmatter), body)
    } else {
        (None, content)
    }
}
