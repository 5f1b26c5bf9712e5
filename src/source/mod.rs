//! Implementation modules recovered from source text.
//!
//! Extraction is lexical: regexes and line scans over TypeScript-style concept
//! classes, not a compiler front end. It tolerates incomplete or invalid
//! snippets and is fast, at the price of precision. Known false negatives:
//! methods whose name and `(` sit on different lines, bodies with unbalanced
//! braces inside string literals, and members declared outside a class body.

use serde::Serialize;
use std::path::PathBuf;

use crate::concept::is_query_name;

pub mod checks;
pub mod extract;

pub use checks::{validate_implementation, Complexity, ImplDefect};
pub use extract::SourceExtractor;

/// File extensions treated as implementation modules.
pub const IMPL_EXTENSIONS: &[&str] = &["ts"];

/// Name of the constructor-injected persistence handle.
pub const PERSISTENCE_HANDLE: &str = "db";

/// Structural facts about one implementation file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationModule {
    /// File stem, e.g. `TeamConcept` for `concepts/Team/TeamConcept.ts`
    pub name: String,
    pub exposed_type_name: Option<String>,
    pub methods: Vec<ImplMethod>,
    pub imports: Vec<String>,
    /// Imports pointing into another concept's directory
    pub dependencies: Vec<String>,
    /// Fields through which the class reaches storage
    pub persistence_fields: Vec<String>,
    pub source_location: PathBuf,
}

impl ImplementationModule {
    pub fn method(&self, name: &str) -> Option<&ImplMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Non-query methods.
    pub fn actions(&self) -> impl Iterator<Item = &ImplMethod> {
        self.methods.iter().filter(|m| !m.is_query)
    }

    /// Methods carrying the query marker.
    pub fn queries(&self) -> impl Iterator<Item = &ImplMethod> {
        self.methods.iter().filter(|m| m.is_query)
    }

    /// Whether the method body touches the persistence handle or a collection field.
    pub fn touches_persistence(&self, method: &ImplMethod) -> bool {
        let handle = format!("this.{}", PERSISTENCE_HANDLE);
        if contains_member(&method.body_text, &handle) {
            return true;
        }
        self.persistence_fields
            .iter()
            .any(|field| contains_member(&method.body_text, &format!("this.{}", field)))
    }
}

/// True if `needle` occurs in `text` and is not followed by an identifier character.
fn contains_member(text: &str, needle: &str) -> bool {
    text.match_indices(needle).any(|(idx, _)| {
        text[idx + needle.len()..]
            .chars()
            .next()
            .map(|c| !(c.is_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(true)
    })
}

/// A method declared by an implementation class.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplMethod {
    pub name: String,
    pub is_async: bool,
    pub parameters: Vec<Parameter>,
    pub return_type_text: String,
    /// Raw method text from the signature line to the closing brace
    pub body_text: String,
    pub is_query: bool,
    pub line_number: usize,
    pub complexity: Complexity,
}

impl ImplMethod {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            is_query: is_query_name(&name),
            name,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub type_text: String,
    pub optional: bool,
}
