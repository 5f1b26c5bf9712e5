//! Optional natural-language assessment of a concept and its implementation.
//!
//! The comparator always talks to an [`Assessor`]. When enrichment is off it
//! gets a [`DisabledAssessor`]; otherwise a [`ServiceAssessor`] backed by a
//! chat-completion service. A service failure never propagates: the assessor
//! answers with [`Assessment::unavailable`] instead.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::concept::ConceptSpecification;
use crate::source::ImplementationModule;
use crate::validation::{IssueCategory, Location, Severity, ValidationIssue};

pub mod client;
pub mod prompt;

pub use client::{ChatCompletionsClient, CompletionClient};
pub use prompt::{build_aspect_prompt, build_prompt};

/// Purpose note used when the service could not be reached.
pub const UNAVAILABLE_NOTE: &str = "AI analysis unavailable";

/// Normalized output of the assessment service.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    pub purpose_alignment_note: String,
    pub implementation_quality_note: String,
    pub issues: Vec<AssessmentIssue>,
    pub suggestions: Vec<String>,
}

impl Assessment {
    /// Fixed record returned when the service fails or is misconfigured.
    pub fn unavailable() -> Self {
        Self {
            purpose_alignment_note: UNAVAILABLE_NOTE.to_string(),
            implementation_quality_note: UNAVAILABLE_NOTE.to_string(),
            suggestions: vec![
                "Enable AI analysis by providing an assessment API key".to_string(),
            ],
            ..Default::default()
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.purpose_alignment_note == UNAVAILABLE_NOTE
    }

    /// Convert reported issues into `purpose_alignment` validation issues.
    pub fn to_validation_issues(&self, location: &Location) -> Vec<ValidationIssue> {
        self.issues
            .iter()
            .map(|issue| {
                let mut converted = ValidationIssue::new(
                    issue.severity.to_severity(),
                    IssueCategory::PurposeAlignment,
                    issue.description.clone(),
                    location.clone(),
                )
                .with_description("Reported by the assessment service");
                if !issue.suggestion.is_empty() {
                    converted = converted.with_suggestion(issue.suggestion.clone());
                }
                converted
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentIssue {
    #[serde(default)]
    pub severity: AssessmentSeverity,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub suggestion: String,
}

/// Severity scale used by the assessment service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentSeverity {
    Critical,
    Major,
    #[default]
    #[serde(other)]
    Minor,
}

impl AssessmentSeverity {
    /// critical → error, major → warning, minor → info
    pub fn to_severity(self) -> Severity {
        match self {
            Self::Critical => Severity::Error,
            Self::Major => Severity::Warning,
            Self::Minor => Severity::Info,
        }
    }
}

/// Single aspect for a narrow assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aspect {
    Purpose,
    Actions,
    Queries,
    State,
    Independence,
}

impl Aspect {
    pub const ALL: [Aspect; 5] = [
        Aspect::Purpose,
        Aspect::Actions,
        Aspect::Queries,
        Aspect::State,
        Aspect::Independence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purpose => "purpose",
            Self::Actions => "actions",
            Self::Queries => "queries",
            Self::State => "state",
            Self::Independence => "independence",
        }
    }
}

impl std::fmt::Display for Aspect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aspect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown aspect '{}'. Use one of: purpose, actions, queries, state, independence",
                    s
                )
            })
    }
}

/// Capability that reviews a concept and its implementation.
pub trait Assessor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Full review; `None` when enrichment is disabled.
    fn assess(
        &self,
        spec: &ConceptSpecification,
        module: &ImplementationModule,
        related: Option<&str>,
    ) -> Option<Assessment>;

    /// Review of a single aspect; `None` when enrichment is disabled.
    fn analyze_aspect(
        &self,
        spec: &ConceptSpecification,
        module: &ImplementationModule,
        aspect: Aspect,
    ) -> Option<Assessment>;
}

/// Assessor used when enrichment is off.
pub struct DisabledAssessor;

impl Assessor for DisabledAssessor {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn assess(
        &self,
        _spec: &ConceptSpecification,
        _module: &ImplementationModule,
        _related: Option<&str>,
    ) -> Option<Assessment> {
        None
    }

    fn analyze_aspect(
        &self,
        _spec: &ConceptSpecification,
        _module: &ImplementationModule,
        _aspect: Aspect,
    ) -> Option<Assessment> {
        None
    }
}

/// Assessor backed by an external completion service.
pub struct ServiceAssessor {
    client: Box<dyn CompletionClient>,
}

impl ServiceAssessor {
    pub fn new(client: Box<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Assessor talking to an OpenAI-compatible chat-completions endpoint.
    pub fn chat_completions(
        endpoint: &str,
        model: &str,
        api_key: &str,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let client = ChatCompletionsClient::new(endpoint, model, api_key, timeout)?;
        Ok(Self::new(Box::new(client)))
    }

    fn ask(&self, concept: &str, prompt: &str) -> Assessment {
        match self.client.complete(prompt) {
            Ok(reply) => parse_reply(&reply),
            Err(e) => {
                tracing::warn!(concept, error = %e, "assessment service failed");
                Assessment::unavailable()
            }
        }
    }
}

impl Assessor for ServiceAssessor {
    fn name(&self) -> &'static str {
        "service"
    }

    fn assess(
        &self,
        spec: &ConceptSpecification,
        module: &ImplementationModule,
        related: Option<&str>,
    ) -> Option<Assessment> {
        let prompt = build_prompt(spec, module, related);
        Some(self.ask(&spec.name, &prompt))
    }

    fn analyze_aspect(
        &self,
        spec: &ConceptSpecification,
        module: &ImplementationModule,
        aspect: Aspect,
    ) -> Option<Assessment> {
        let prompt = build_aspect_prompt(spec, module, aspect);
        Some(self.ask(&spec.name, &prompt))
    }
}

/// Structured reply as requested by the prompts. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Reply {
    alignment: Option<String>,
    score: Option<f64>,
    #[serde(alias = "purposeAlignment", alias = "purpose_alignment")]
    purpose_alignment_note: Option<String>,
    #[serde(alias = "implementationQuality", alias = "implementation_quality")]
    implementation_quality_note: Option<String>,
    issues: Vec<AssessmentIssue>,
    suggestions: Vec<String>,
}

/// Normalize a service reply.
///
/// The first balanced `{...}` fragment is parsed as JSON. If there is none,
/// or it does not parse, the raw reply becomes the purpose note.
pub fn parse_reply(reply: &str) -> Assessment {
    let parsed = first_json_object(reply)
        .and_then(|fragment| serde_json::from_str::<Reply>(fragment).ok());

    match parsed {
        Some(r) => Assessment {
            alignment: r.alignment,
            score: r.score.map(|s| s.clamp(0.0, 100.0).round() as u8),
            purpose_alignment_note: r.purpose_alignment_note.unwrap_or_default(),
            implementation_quality_note: r.implementation_quality_note.unwrap_or_default(),
            issues: r.issues,
            suggestions: r.suggestions,
        },
        None => Assessment {
            purpose_alignment_note: reply.trim().to_string(),
            ..Default::default()
        },
    }
}

/// First balanced `{...}` fragment, ignoring braces inside string literals.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + idx]);
                }
            }
            _ => {}
        }
    }
    None
}
