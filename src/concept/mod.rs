//! Concept specifications: data model and parsing.
//!
//! A concept specification is a small declarative document:
//!
//! ```text
//! concept Team
//! purpose
//!   group users so they can share work
//! state
//!   Teams
//!     name: String
//!     owner: User
//! actions
//!   create (name: String, owner: User) : {team: Team} | {error: String}
//!     - creates a team owned by `owner`
//! queries
//!   _getByOwner (owner: User) : (team: Team)[]
//! operational principle
//!   after create, the team is returned by _getByOwner
//! ```

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub mod parse;

pub use parse::{parse_directory, parse_one, validate_spec};

/// Leading character that marks a query (read-only) method.
pub const QUERY_MARKER: char = '_';

/// Conventional suffix carried by implementation type names.
pub const CONVENTIONAL_SUFFIX: &str = "Concept";

/// Returns true when `name` carries the query marker.
pub fn is_query_name(name: &str) -> bool {
    name.starts_with(QUERY_MARKER)
}

/// Strip the conventional suffix (case-insensitive) from a concept or type name.
pub fn strip_suffix(name: &str) -> &str {
    let suffix_len = CONVENTIONAL_SUFFIX.len();
    if name.len() > suffix_len
        && name.is_char_boundary(name.len() - suffix_len)
        && name[name.len() - suffix_len..].eq_ignore_ascii_case(CONVENTIONAL_SUFFIX)
    {
        &name[..name.len() - suffix_len]
    } else {
        name
    }
}

/// A parsed concept specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptSpecification {
    pub name: String,
    pub purpose: String,
    /// Entity name -> (field name -> declared type text)
    pub state: BTreeMap<String, BTreeMap<String, String>>,
    pub actions: Vec<SpecMethod>,
    pub queries: Vec<SpecMethod>,
    pub operational_principle: String,
    pub source_location: PathBuf,
}

impl ConceptSpecification {
    pub fn action(&self, name: &str) -> Option<&SpecMethod> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn query(&self, name: &str) -> Option<&SpecMethod> {
        self.queries.iter().find(|q| q.name == name)
    }

    /// Type name the implementation is expected to expose, e.g. `TeamConcept`.
    pub fn expected_type_name(&self) -> String {
        format!("{}{}", strip_suffix(&self.name), CONVENTIONAL_SUFFIX)
    }
}

/// An action or query declared in a specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecMethod {
    pub name: String,
    pub signature_text: String,
    pub inputs: BTreeMap<String, String>,
    /// One entry per alternative outcome shape (success, error, ...)
    pub outputs: BTreeMap<String, String>,
    pub description: String,
    pub line_number: usize,
}
