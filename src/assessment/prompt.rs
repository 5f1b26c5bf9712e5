//! Prompt assembly for the assessment service.

use std::fmt::Write;

use super::Aspect;
use crate::concept::{ConceptSpecification, SpecMethod};
use crate::source::ImplementationModule;

/// Upper bound on related-file text copied into a prompt.
const RELATED_TEXT_LIMIT: usize = 8_000;

const REPLY_FORMAT: &str = r#"Respond with a single JSON object and nothing else:
{
  "alignment": "good" | "partial" | "poor",
  "score": <0-100>,
  "purposeAlignment": "<how well the implementation serves the stated purpose>",
  "implementationQuality": "<notes on structure, error handling and naming>",
  "issues": [
    { "severity": "critical" | "major" | "minor", "description": "...", "suggestion": "..." }
  ],
  "suggestions": ["..."]
}"#;

/// Prompt for a full review of one concept pair.
pub fn build_prompt(
    spec: &ConceptSpecification,
    module: &ImplementationModule,
    related: Option<&str>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "You are reviewing whether an implementation faithfully realizes a concept specification.\n\
         Concepts are independent units of behavior: they own their state, expose actions that \
         change it and queries (names starting with `_`) that only read it, and never import \
         other concepts.\n"
    );

    write_specification(&mut out, spec);
    write_implementation(&mut out, module);

    if let Some(text) = related.filter(|t| !t.trim().is_empty()) {
        let _ = writeln!(out, "## Related synchronizations\n");
        let _ = writeln!(out, "```\n{}\n```\n", truncate(text, RELATED_TEXT_LIMIT));
    }

    let _ = writeln!(
        out,
        "## Task\n\n\
         Judge whether the implementation serves the purpose, whether every action and query \
         is realized with matching inputs and outcomes, whether the state is modelled as \
         declared, and whether the operational principle holds.\n"
    );
    out.push_str(REPLY_FORMAT);
    out.push('\n');
    out
}

/// Prompt for a review narrowed to a single aspect.
pub fn build_aspect_prompt(
    spec: &ConceptSpecification,
    module: &ImplementationModule,
    aspect: Aspect,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "You are reviewing one aspect ({}) of how an implementation realizes a concept \
         specification.\n",
        aspect
    );

    write_specification(&mut out, spec);
    write_implementation(&mut out, module);

    let focus = match aspect {
        Aspect::Purpose => {
            "Does the implementation serve the stated purpose, and nothing beyond it?"
        }
        Aspect::Actions => {
            "Is every declared action implemented with matching inputs, success outcome and \
             error outcome? Are there actions the specification does not declare?"
        }
        Aspect::Queries => {
            "Is every declared query implemented, marked with a leading `_`, free of side \
             effects, and returning a list of results?"
        }
        Aspect::State => {
            "Does the persisted state match the declared entities and fields, with nothing \
             missing or extra?"
        }
        Aspect::Independence => {
            "Does the implementation stay independent of other concepts: no imports of other \
             concepts, no calls into their state, identities treated as opaque?"
        }
    };
    let _ = writeln!(out, "## Task\n\n{}\n", focus);
    out.push_str(REPLY_FORMAT);
    out.push('\n');
    out
}

fn write_specification(out: &mut String, spec: &ConceptSpecification) {
    let _ = writeln!(out, "## Specification: {}\n", spec.name);
    let _ = writeln!(out, "Purpose: {}\n", non_empty(&spec.purpose));

    if !spec.state.is_empty() {
        let _ = writeln!(out, "State:");
        for (entity, fields) in &spec.state {
            let _ = writeln!(out, "- {}", entity);
            for (field, ty) in fields {
                let _ = writeln!(out, "  - {}: {}", field, ty);
            }
        }
        out.push('\n');
    }

    write_spec_methods(out, "Actions", &spec.actions);
    write_spec_methods(out, "Queries", &spec.queries);

    if !spec.operational_principle.is_empty() {
        let _ = writeln!(
            out,
            "Operational principle: {}\n",
            spec.operational_principle
        );
    }
}

fn write_spec_methods(out: &mut String, title: &str, methods: &[SpecMethod]) {
    if methods.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}:", title);
    for method in methods {
        let _ = writeln!(out, "- {}", method.signature_text);
        if !method.description.is_empty() {
            let _ = writeln!(out, "  {}", method.description);
        }
    }
    out.push('\n');
}

fn write_implementation(out: &mut String, module: &ImplementationModule) {
    let _ = writeln!(
        out,
        "## Implementation: {} ({})\n",
        module.exposed_type_name.as_deref().unwrap_or(&module.name),
        module.source_location.display()
    );

    if !module.dependencies.is_empty() {
        let _ = writeln!(
            out,
            "Imports of other concepts: {}\n",
            module.dependencies.join(", ")
        );
    }
    if !module.persistence_fields.is_empty() {
        let _ = writeln!(
            out,
            "Persistence fields: {}\n",
            module.persistence_fields.join(", ")
        );
    }

    for method in &module.methods {
        let c = method.complexity;
        let params: Vec<String> = method
            .parameters
            .iter()
            .map(|p| {
                let marker = if p.optional { "?" } else { "" };
                if p.type_text.is_empty() {
                    format!("{}{}", p.name, marker)
                } else {
                    format!("{}{}: {}", p.name, marker, p.type_text)
                }
            })
            .collect();
        let _ = writeln!(
            out,
            "### {}{}({}) -> {}",
            if method.is_async { "async " } else { "" },
            method.name,
            params.join(", "),
            non_empty(&method.return_type_text)
        );
        let _ = writeln!(
            out,
            "lines: {}, branches: {}, external calls: {}\n",
            c.line_count, c.branch_count, c.external_call_count
        );
        let _ = writeln!(out, "```ts\n{}\n```\n", method.body_text.trim_end());
    }
}

fn non_empty(text: &str) -> &str {
    if text.trim().is_empty() {
        "(none)"
    } else {
        text
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
