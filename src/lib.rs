//! # concept-lint
//!
//! Static alignment checker for concept specifications and the TypeScript
//! classes that implement them.
//!
//! ## Overview
//!
//! A concept specification declares a concept's purpose, state, actions and
//! queries. concept-lint reads a directory of specifications and a directory
//! of implementations, pairs them by name, and reports every place where the
//! implementation drifts from what the specification promises.
//!
//! ## Modules
//!
//! - [`concept`] - Specification data model and parser
//! - [`source`] - Lexical extraction of implementation modules
//! - [`compare`] - Pairing and the per-concept check battery
//! - [`assessment`] - Optional review through a chat-completion service
//! - [`report`] - Console, HTML, Markdown and JSON renderers
//! - [`config`] - Project configuration
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use concept_lint::assessment::DisabledAssessor;
//! use concept_lint::compare::Comparator;
//!
//! let comparator = Comparator::new(Box::new(DisabledAssessor))?;
//! let run = comparator.validate_all(Path::new("specs"), Path::new("concepts"), None)?;
//! for report in &run.reports {
//!     println!("{}: {}", report.concept_name, report.summary.score);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod assessment;
pub mod compare;
pub mod concept;
pub mod config;
pub mod report;
pub mod scan;
pub mod source;
pub mod validation;

/// Default path constants for the concept-lint directory structure.
pub mod paths {
    /// Directory holding project settings: `.concept-lint`
    pub const CONFIG_DIR: &str = ".concept-lint";
    /// Configuration file: `.concept-lint/config.md`
    pub const CONFIG_FILE: &str = ".concept-lint/config.md";
    /// Default output directory for file reports
    pub const OUTPUT_DIR: &str = "validation-reports";
}

/// Generate a UTC timestamp in ISO 8601 format: `YYYY-MM-DDTHH:MM:SSZ`
pub fn utc_now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
