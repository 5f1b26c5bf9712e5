//! Default values and configuration structs with default implementations.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Macro to generate default functions for serde attributes
macro_rules! default_fn {
    ($name:ident, $type:ty, $value:expr) => {
        pub(crate) fn $name() -> $type {
            $value
        }
    };
}

// =========================================================================
// DEFAULT VALUE FUNCTIONS
// =========================================================================

default_fn!(default_root, PathBuf, PathBuf::from("."));
default_fn!(default_specs_dir, PathBuf, PathBuf::from("specs"));
default_fn!(default_impl_dir, PathBuf, PathBuf::from("concepts"));
default_fn!(default_related_dir, Option<PathBuf>, Some(PathBuf::from("syncs")));
default_fn!(default_model, String, "gpt-4o-mini".to_string());
default_fn!(
    default_endpoint,
    String,
    "https://api.openai.com/v1".to_string()
);
default_fn!(default_timeout_secs, u64, 60);

/// Default configuration file written by `init`.
pub const DEFAULT_CONFIG: &str = r#"---
project:
  root: .
paths:
  specs: specs
  implementations: concepts
  related: syncs
assessment:
  enabled: false
  model: gpt-4o-mini
  endpoint: https://api.openai.com/v1
  api_key: ~
  timeout_secs: 60
strict: false
---

# concept-lint configuration

`paths` are resolved against `project.root`, which is itself relative to the
directory that holds `.concept-lint/`.

- `paths.specs`: concept specifications (`*.concept`, `*.md`)
- `paths.implementations`: concept classes (`*.ts`)
- `paths.related`: synchronizations that reference concepts

Assessment calls an OpenAI-compatible chat-completions endpoint. Prefer the
`CONCEPT_LINT_API_KEY` environment variable over storing `api_key` here.

With `strict: true`, warnings fail the run as well as errors.
"#;

// =========================================================================
// CONFIG STRUCTS WITH DEFAULTS
// =========================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProjectConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

/// Input directories, relative to the project root.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PathsConfig {
    #[serde(default = "default_specs_dir")]
    pub specs: PathBuf,
    #[serde(default = "default_impl_dir")]
    pub implementations: PathBuf,
    #[serde(default = "default_related_dir")]
    pub related: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            specs: default_specs_dir(),
            implementations: default_impl_dir(),
            related: default_related_dir(),
        }
    }
}

/// Settings for the optional assessment service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AssessmentConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: default_model(),
            endpoint: default_endpoint(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}
