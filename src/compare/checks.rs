//! The fixed battery of alignment checks for one paired concept.

use crate::concept::{is_query_name, validate_spec, ConceptSpecification, SpecMethod, QUERY_MARKER};
use crate::source::checks::{has_error_result, is_query_shaped, is_sequence_type};
use crate::source::{validate_implementation, ImplDefect, ImplMethod, ImplementationModule};
use crate::validation::{IssueCategory, Location, ValidationIssue};

/// Run the structural, action, query and naming checks in order.
pub fn compare(spec: &ConceptSpecification, module: &ImplementationModule) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    structural_defects(spec, module, &mut issues);
    compare_actions(spec, module, &mut issues);
    compare_queries(spec, module, &mut issues);
    check_type_name(spec, module, &mut issues);
    issues
}

fn method_location(module: &ImplementationModule, method: &ImplMethod) -> Location {
    Location::at(&module.source_location, method.line_number)
}

fn spec_reference(
    issue: ValidationIssue,
    spec: &ConceptSpecification,
    method: &SpecMethod,
) -> ValidationIssue {
    issue.with_related(
        &spec.source_location,
        Some(method.line_number),
        Some(method.signature_text.clone()),
    )
}

fn base_name(name: &str) -> &str {
    name.trim_start_matches(QUERY_MARKER)
}

/// Whether the spec declares `name` as an action or a query, with or without the marker.
fn declared_in_spec(spec: &ConceptSpecification, name: &str) -> bool {
    let base = base_name(name);
    spec.actions
        .iter()
        .chain(spec.queries.iter())
        .any(|m| base_name(&m.name) == base)
}

/// Step 1: spec defects as errors, implementation defects as warnings.
///
/// Defects on methods the spec declares are reported by the action and query
/// comparisons instead, and query naming is always left to the query step.
fn structural_defects(
    spec: &ConceptSpecification,
    module: &ImplementationModule,
    issues: &mut Vec<ValidationIssue>,
) {
    for defect in validate_spec(spec) {
        let category = if defect.starts_with("Query") {
            IssueCategory::NamingConvention
        } else {
            IssueCategory::StateMismatch
        };
        issues.push(ValidationIssue::error(
            category,
            defect,
            Location::file(&spec.source_location),
        ));
    }

    for defect in validate_implementation(module) {
        if let Some(method) = defect.method() {
            if declared_in_spec(spec, method) {
                continue;
            }
        }

        let (category, location) = match &defect {
            ImplDefect::DependencyViolation { .. } => (
                IssueCategory::DependencyViolation,
                Location::file(&module.source_location),
            ),
            ImplDefect::QueryNaming { .. } => continue,
            ImplDefect::MissingFailureHandling { method } => (
                IssueCategory::MissingErrorHandling,
                located(module, method),
            ),
            ImplDefect::SyncPersistenceAccess { method } => {
                (IssueCategory::SignatureMismatch, located(module, method))
            }
        };

        let mut issue = ValidationIssue::warning(category, defect.to_string(), location);
        if matches!(defect, ImplDefect::DependencyViolation { .. }) {
            issue = issue
                .with_description("Concepts must not depend on each other; compose them with synchronizations")
                .with_suggestion("Remove the import and pass the other concept's identifiers as opaque values");
        }
        issues.push(issue);
    }
}

fn located(module: &ImplementationModule, method: &str) -> Location {
    module
        .method(method)
        .map(|m| method_location(module, m))
        .unwrap_or_else(|| Location::file(&module.source_location))
}

/// Step 2: actions.
fn compare_actions(
    spec: &ConceptSpecification,
    module: &ImplementationModule,
    issues: &mut Vec<ValidationIssue>,
) {
    let type_name = spec.expected_type_name();

    for action in &spec.actions {
        let implemented = module.actions().find(|m| m.name == action.name);
        let Some(method) = implemented else {
            let issue = ValidationIssue::error(
                IssueCategory::MissingAction,
                format!("Action '{}' is specified but not implemented", action.name),
                Location::file(&module.source_location),
            )
            .with_description(format!(
                "{} declares action '{}' but {} has no method with that name",
                spec.name, action.name, type_name
            ))
            .with_suggestion(format!(
                "Add an async '{}' method to {}",
                action.name, type_name
            ));
            issues.push(spec_reference(issue, spec, action));
            continue;
        };

        if !has_error_result(method) {
            let issue = ValidationIssue::warning(
                IssueCategory::MissingErrorHandling,
                format!("Action '{}' has no error outcome", action.name),
                method_location(module, method),
            )
            .with_description("Actions report failure as an alternative output shape")
            .with_suggestion("Return { error: string } when the action cannot complete");
            issues.push(spec_reference(issue, spec, action));
        }

        if !method.is_async && module.touches_persistence(method) {
            issues.push(
                ValidationIssue::info(
                    IssueCategory::SignatureMismatch,
                    format!("Action '{}' accesses the database but is not async", action.name),
                    method_location(module, method),
                )
                .with_suggestion(format!("Declare '{}' as async", action.name)),
            );
        }
    }

    for method in module.actions() {
        if spec.action(&method.name).is_some() {
            continue;
        }
        // Unmarked queries are reported by the query step.
        if spec
            .queries
            .iter()
            .any(|q| base_name(&q.name) == method.name)
        {
            continue;
        }
        issues.push(
            ValidationIssue::warning(
                IssueCategory::SignatureMismatch,
                format!("Unspecified action '{}'", method.name),
                method_location(module, method),
            )
            .with_description(format!(
                "{} implements '{}' but the specification does not declare it",
                module.name, method.name
            ))
            .with_suggestion("Add the action to the specification or remove it"),
        );
    }
}

/// Step 3: queries.
fn compare_queries(
    spec: &ConceptSpecification,
    module: &ImplementationModule,
    issues: &mut Vec<ValidationIssue>,
) {
    for query in &spec.queries {
        let base = base_name(&query.name);
        let implemented = module
            .queries()
            .find(|m| m.name == query.name)
            .or_else(|| module.methods.iter().find(|m| base_name(&m.name) == base));

        let Some(method) = implemented else {
            let issue = ValidationIssue::error(
                IssueCategory::MissingQuery,
                format!("Query '{}' is specified but not implemented", query.name),
                Location::file(&module.source_location),
            )
            .with_suggestion(format!(
                "Add a '{}{}' method returning an array",
                QUERY_MARKER, base
            ));
            issues.push(spec_reference(issue, spec, query));
            continue;
        };

        if !is_sequence_type(&method.return_type_text) {
            let issue = ValidationIssue::error(
                IssueCategory::ReturnTypeMismatch,
                format!("Query '{}' must return an array", method.name),
                method_location(module, method),
            )
            .with_description(format!(
                "Return type '{}' does not describe a sequence",
                method.return_type_text
            ))
            .with_suggestion("Return an array of results, empty when nothing matches");
            issues.push(spec_reference(issue, spec, query));
        }

        // Query-shaped names are reported by the loop below.
        if !is_query_name(&method.name) && !is_query_shaped(&method.name) {
            issues.push(naming_error(module, method));
        }
    }

    for method in module.actions() {
        if is_query_shaped(&method.name) {
            issues.push(naming_error(module, method));
        }
    }
}

fn naming_error(module: &ImplementationModule, method: &ImplMethod) -> ValidationIssue {
    let suggested = format!("{}{}", QUERY_MARKER, method.name);
    ValidationIssue::error(
        IssueCategory::NamingConvention,
        format!(
            "Query method '{}' should start with '{}'",
            method.name, QUERY_MARKER
        ),
        method_location(module, method),
    )
    .with_suggestion(format!("Rename to '{}'", suggested))
}

/// Step 4: the exposed type name.
fn check_type_name(
    spec: &ConceptSpecification,
    module: &ImplementationModule,
    issues: &mut Vec<ValidationIssue>,
) {
    let expected = spec.expected_type_name();
    let message = match module.exposed_type_name.as_deref() {
        Some(name) if name == expected => return,
        Some(name) => format!("Type '{}' should be named '{}'", name, expected),
        None => format!("No exported type found; expected '{}'", expected),
    };
    issues.push(
        ValidationIssue::warning(
            IssueCategory::NamingConvention,
            message,
            Location::file(&module.source_location),
        )
        .with_suggestion(format!("export default class {}", expected)),
    );
}
