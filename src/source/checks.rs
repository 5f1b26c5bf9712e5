//! Convention checks and complexity metrics for implementation modules.

use std::fmt;

use super::{ImplMethod, ImplementationModule};
use crate::concept::QUERY_MARKER;

/// Verbs that mark a method as a read even without the query marker.
const QUERY_VERBS: &[&str] = &[
    "get", "find", "list", "fetch", "search", "count", "lookup", "query",
];

/// Tokens showing that a method deals with failure in some visible way.
const FAILURE_TOKENS: &[&str] = &["throw", "catch", "reject", "Error("];

/// A convention defect found in an implementation module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImplDefect {
    /// Import reaching into another concept's module
    DependencyViolation { import: String },
    /// Read-shaped method without the query marker
    QueryNaming { method: String, suggested: String },
    /// Action with no error result and no failure handling
    MissingFailureHandling { method: String },
    /// Synchronous action that touches storage
    SyncPersistenceAccess { method: String },
}

impl ImplDefect {
    /// Method the defect is attached to, if any.
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::DependencyViolation { .. } => None,
            Self::QueryNaming { method, .. }
            | Self::MissingFailureHandling { method }
            | Self::SyncPersistenceAccess { method } => Some(method),
        }
    }
}

impl fmt::Display for ImplDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DependencyViolation { import } => {
                write!(f, "Concept imports another concept: {}", import)
            }
            Self::QueryNaming { method, suggested } => write!(
                f,
                "Query method '{}' should start with '{}' (rename to '{}')",
                method, QUERY_MARKER, suggested
            ),
            Self::MissingFailureHandling { method } => write!(
                f,
                "Action '{}' neither returns an error result nor handles failure",
                method
            ),
            Self::SyncPersistenceAccess { method } => write!(
                f,
                "Action '{}' accesses the database but is not async",
                method
            ),
        }
    }
}

/// Size and branching metrics for one method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Complexity {
    pub line_count: usize,
    /// Branch keywords plus `&&`/`||`, plus one for the straight-line path
    pub branch_count: usize,
    /// Awaited calls plus calls through `this`
    pub external_call_count: usize,
}

/// Convention defects of an implementation module.
pub fn validate_implementation(module: &ImplementationModule) -> Vec<ImplDefect> {
    let mut defects: Vec<ImplDefect> = module
        .dependencies
        .iter()
        .map(|import| ImplDefect::DependencyViolation {
            import: import.clone(),
        })
        .collect();

    for method in &module.methods {
        if method.is_query {
            continue;
        }

        if is_query_shaped(&method.name) {
            defects.push(ImplDefect::QueryNaming {
                method: method.name.clone(),
                suggested: format!("{}{}", QUERY_MARKER, method.name),
            });
            continue;
        }

        if !has_failure_handling(method) {
            defects.push(ImplDefect::MissingFailureHandling {
                method: method.name.clone(),
            });
        }

        if !method.is_async && module.touches_persistence(method) {
            defects.push(ImplDefect::SyncPersistenceAccess {
                method: method.name.clone(),
            });
        }
    }

    defects
}

/// A name that starts with a read verb followed by a word boundary (`getActive`, `list`).
pub fn is_query_shaped(name: &str) -> bool {
    let name = name.trim_start_matches(QUERY_MARKER);
    QUERY_VERBS.iter().any(|verb| {
        name.strip_prefix(verb)
            .map(|rest| {
                rest.is_empty()
                    || rest
                        .chars()
                        .next()
                        .map(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
                        .unwrap_or(false)
            })
            .unwrap_or(false)
    })
}

/// The return type or body mentions an `error` result.
pub fn has_error_result(method: &ImplMethod) -> bool {
    contains_word(&method.return_type_text, "error") || contains_word(&method.body_text, "error")
}

/// An error result or any visible failure-handling token.
pub fn has_failure_handling(method: &ImplMethod) -> bool {
    has_error_result(method) || FAILURE_TOKENS.iter().any(|t| method.body_text.contains(t))
}

/// Whether a return type visibly describes a sequence.
pub fn is_sequence_type(type_text: &str) -> bool {
    type_text.contains("[]") || type_text.contains("Array<")
}

fn contains_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|token| token == word)
}
