//! Concept specification parsing.
//!
//! The parser is a small state machine over lines. Each recognized header
//! flushes the lines accumulated for the previous section into that section's
//! sub-parser. Parsing never fails: malformed input yields a partial record
//! and [`validate_spec`] reports what is missing.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::{is_query_name, ConceptSpecification, SpecMethod, QUERY_MARKER};
use crate::scan::{find_files, Scan};

/// File extensions treated as concept specifications.
pub const SPEC_EXTENSIONS: &[&str] = &["concept", "md"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Purpose,
    State,
    Actions,
    Queries,
    OperationalPrinciple,
}

/// A recognized header line.
enum Header {
    Concept(String),
    Section(Section, Option<String>),
}

/// Parse one specification document. Never fails.
pub fn parse_one(text: &str, path: &Path) -> ConceptSpecification {
    let mut spec = ConceptSpecification {
        source_location: path.to_path_buf(),
        ..Default::default()
    };

    let mut current: Option<Section> = None;
    let mut buffer: Vec<(usize, String)> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_number = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        // Only the first `concept` line names the concept; later ones are prose
        let header = match parse_header(trimmed) {
            Some(Header::Concept(_)) if !spec.name.is_empty() => None,
            other => other,
        };
        if let Some(header) = header {
            if let Some(section) = current.take() {
                flush_section(&mut spec, section, std::mem::take(&mut buffer));
            }
            match header {
                Header::Concept(name) => spec.name = name,
                Header::Section(section, inline) => {
                    current = Some(section);
                    if let Some(text) = inline {
                        buffer.push((line_number, text));
                    }
                }
            }
            continue;
        }

        if is_comment(trimmed) {
            continue;
        }

        if current.is_some() {
            buffer.push((line_number, raw.to_string()));
        }
    }

    if let Some(section) = current {
        flush_section(&mut spec, section, buffer);
    }

    spec
}

/// Parse every specification file under `dir`.
///
/// Unreadable files and documents without a `concept <name>` header are
/// recorded in the returned scan's `skipped` list.
pub fn parse_directory(dir: &Path) -> Result<Scan<ConceptSpecification>> {
    let mut scan = Scan::default();
    for path in find_files(dir, SPEC_EXTENSIONS)? {
        tracing::debug!(path = %path.display(), "parsing specification");
        let outcome = load_spec(&path);
        scan.push(&path, outcome);
    }
    Ok(scan)
}

fn load_spec(path: &Path) -> Result<ConceptSpecification> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read specification {}", path.display()))?;
    let spec = parse_one(&content, path);
    if spec.name.is_empty() {
        anyhow::bail!("No `concept <name>` header found");
    }
    Ok(spec)
}

/// Human-readable defects of a parsed specification.
pub fn validate_spec(spec: &ConceptSpecification) -> Vec<String> {
    let mut defects = Vec::new();

    if spec.name.trim().is_empty() {
        defects.push("Specification is missing a concept name".to_string());
    }
    if spec.purpose.trim().is_empty() {
        defects.push("Specification is missing a purpose".to_string());
    }
    if spec.state.is_empty() {
        defects.push("Specification declares no state".to_string());
    }
    if spec.actions.is_empty() {
        defects.push("Specification declares no actions".to_string());
    }
    for query in &spec.queries {
        if !is_query_name(&query.name) {
            defects.push(format!(
                "Query '{}' should start with '{}'",
                query.name, QUERY_MARKER
            ));
        }
    }

    defects
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("//")
}

fn parse_header(line: &str) -> Option<Header> {
    // Markdown headings (`## Actions`) are accepted as headers too
    let stripped = line.trim_start_matches('#').trim();
    let lower = stripped.to_lowercase();

    if lower.starts_with("concept ") {
        let name = stripped
            .get("concept ".len()..)
            .unwrap_or("")
            .trim()
            .split(|c: char| c.is_whitespace() || c == '[' || c == '<' || c == ':')
            .next()
            .unwrap_or("")
            .to_string();
        if !name.is_empty() {
            return Some(Header::Concept(name));
        }
        return None;
    }

    let bare = lower.trim_end_matches(':').trim();
    match bare {
        "purpose" => return Some(Header::Section(Section::Purpose, None)),
        "state" => return Some(Header::Section(Section::State, None)),
        "actions" => return Some(Header::Section(Section::Actions, None)),
        "queries" => return Some(Header::Section(Section::Queries, None)),
        "operational principle" | "principle" => {
            return Some(Header::Section(Section::OperationalPrinciple, None))
        }
        _ => {}
    }

    // Free-text sections may carry their content on the header line, but a
    // `#` line is only a header when it is bare
    if line.starts_with('#') {
        return None;
    }
    for (prefix, section) in [
        ("purpose", Section::Purpose),
        ("operational principle", Section::OperationalPrinciple),
    ] {
        if let Some(rest) = lower.strip_prefix(prefix) {
            if rest.starts_with(':') || rest.starts_with(' ') {
                let inline = stripped
                    .get(prefix.len()..)
                    .unwrap_or("")
                    .trim_start_matches(':')
                    .trim()
                    .to_string();
                return Some(Header::Section(section, Some(inline)));
            }
        }
    }

    None
}

fn flush_section(spec: &mut ConceptSpecification, section: Section, lines: Vec<(usize, String)>) {
    match section {
        Section::Purpose => spec.purpose = join_text(&lines),
        Section::OperationalPrinciple => spec.operational_principle = join_text(&lines),
        Section::State => {
            let default_entity = if spec.name.is_empty() {
                "State".to_string()
            } else {
                spec.name.clone()
            };
            parse_state(&mut spec.state, &lines, &default_entity);
        }
        Section::Actions => spec.actions.extend(parse_methods(&lines)),
        Section::Queries => spec.queries.extend(parse_methods(&lines)),
    }
}

fn join_text(lines: &[(usize, String)]) -> String {
    lines
        .iter()
        .map(|(_, l)| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_state(
    state: &mut BTreeMap<String, BTreeMap<String, String>>,
    lines: &[(usize, String)],
    default_entity: &str,
) {
    let mut entity: Option<String> = None;

    for (_, raw) in lines {
        let line = raw.trim().trim_start_matches('-').trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once(':') {
            None => {
                let name = line.trim_end_matches('{').trim().to_string();
                state.entry(name.clone()).or_default();
                entity = Some(name);
            }
            Some((field, ty)) => {
                let owner = entity.get_or_insert_with(|| default_entity.to_string());
                state
                    .entry(owner.clone())
                    .or_default()
                    .insert(field.trim().to_string(), ty.trim().to_string());
            }
        }
    }
}

fn parse_methods(lines: &[(usize, String)]) -> Vec<SpecMethod> {
    let mut methods: Vec<SpecMethod> = Vec::new();
    let mut last_was_method = false;

    for (line_number, raw) in lines {
        let line = raw.trim();

        if let Some(desc) = line.strip_prefix('-') {
            if last_was_method {
                if let Some(method) = methods.last_mut() {
                    let desc = desc.trim();
                    if !method.description.is_empty() {
                        method.description.push(' ');
                    }
                    method.description.push_str(desc);
                }
            }
            continue;
        }

        match parse_signature(line, *line_number) {
            Some(method) => {
                methods.push(method);
                last_was_method = true;
            }
            None => last_was_method = false,
        }
    }

    methods
}

/// Parse `name (a: A, b: B) : {ok: T} | {error: String}`.
fn parse_signature(line: &str, line_number: usize) -> Option<SpecMethod> {
    let open = line.find('(')?;
    let close = matching_close(line, open)?;
    let rest = line[close + 1..].trim_start();

    let outcome = if let Some(r) = rest.strip_prefix("->") {
        r
    } else if let Some(r) = rest.strip_prefix("=>") {
        r
    } else if let Some(r) = rest.strip_prefix(':') {
        r
    } else {
        return None;
    };

    let name = line[..open]
        .split_whitespace()
        .last()
        .unwrap_or("")
        .to_string();
    if name.is_empty() {
        return None;
    }

    let mut inputs = BTreeMap::new();
    for param in split_top_level(&line[open + 1..close], ',') {
        let param = param.trim();
        if param.is_empty() {
            continue;
        }
        match param.split_once(':') {
            Some((n, t)) => inputs.insert(n.trim().to_string(), t.trim().to_string()),
            None => inputs.insert(param.to_string(), String::new()),
        };
    }

    let mut outputs = BTreeMap::new();
    for (idx, alternative) in split_top_level(outcome, '|').into_iter().enumerate() {
        let alternative = alternative.trim();
        if alternative.is_empty() {
            continue;
        }
        let mut key = output_label(alternative).unwrap_or_else(|| idx.to_string());
        if outputs.contains_key(&key) {
            key = format!("{}_{}", key, idx);
        }
        outputs.insert(key, alternative.to_string());
    }

    Some(SpecMethod {
        name,
        signature_text: line.to_string(),
        inputs,
        outputs,
        description: String::new(),
        line_number,
    })
}

/// Label of an explicit `{label: Type}` or `(label: Type)` outcome shape.
fn output_label(alternative: &str) -> Option<String> {
    let open = alternative.find(['{', '('])?;
    if !alternative[..open].trim().is_empty() {
        return None;
    }
    let close = matching_close(alternative, open)?;
    let inner = &alternative[open + 1..close];
    let first = split_top_level(inner, ',').into_iter().next()?;
    let (label, _) = first.split_once(':')?;
    let label = label.trim();
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

/// Byte index of the delimiter closing the one at `open`.
pub(crate) fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (idx, ch) in text[open..].char_indices() {
        match ch {
            '(' | '{' | '[' | '<' => depth += 1,
            ')' | '}' | ']' | '>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on `sep` outside of any bracket pair.
pub(crate) fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        match ch {
            '(' | '{' | '[' | '<' => depth += 1,
            ')' | '}' | ']' | '>' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}
