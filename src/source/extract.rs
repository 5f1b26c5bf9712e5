//! Line-level structural extraction of implementation modules.

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::Path;

use super::{
    Complexity, ImplMethod, ImplementationModule, Parameter, IMPL_EXTENSIONS, PERSISTENCE_HANDLE,
};
use crate::concept::parse::split_top_level;
use crate::concept::{is_query_name, CONVENTIONAL_SUFFIX};
use crate::scan::{find_files, Scan};

/// Identifiers that look like `name(` but never start a method.
const NON_METHOD_WORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "function", "super", "new", "await",
    "typeof", "throw", "yield", "import", "export",
];

/// Compiled pattern set used to read implementation sources.
pub struct SourceExtractor {
    exported_class: Regex,
    exported_type: Regex,
    import: Regex,
    collection_field: Regex,
    method: Regex,
    promise: Regex,
    branch_keyword: Regex,
    self_call: Regex,
}

impl SourceExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            exported_class: Regex::new(
                r"(?m)^export\s+(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)",
            )?,
            exported_type: Regex::new(
                r"(?m)^export\s+(?:default\s+)?(?:interface|type|enum)\s+([A-Za-z_$][\w$]*)",
            )?,
            import: Regex::new(
                r#"(?m)^\s*(?:import|export)\s+(?:type\s+)?(?:[\w*{}\s,$]+?\s+from\s+)?["']([^"']+)["']"#,
            )?,
            collection_field: Regex::new(
                r"(?m)^\s*(?:(?:private|public|protected|readonly)\s+)*([A-Za-z_$][\w$]*)\s*[!?]?\s*:\s*Collection\s*<",
            )?,
            method: Regex::new(
                r"^\s*(?:(?:public|private|protected|static|override|readonly)\s+)*(async\s+)?([A-Za-z_$][\w$]*)\s*(?:<[^>(]*>)?\s*\(",
            )?,
            promise: Regex::new(r"Promise\s*<(.+)>")?,
            branch_keyword: Regex::new(r"\b(?:if|for|while|case|catch)\b")?,
            self_call: Regex::new(r"\bthis\.[A-Za-z_$][\w$.]*\s*\(")?,
        })
    }

    /// Read and analyze one implementation file.
    pub fn analyze_one(&self, path: &Path) -> Result<ImplementationModule> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read implementation {}", path.display()))?;
        Ok(self.analyze_source(&content, path))
    }

    /// Size and branching metrics for one method body.
    pub fn complexity_of(&self, body: &str) -> Complexity {
        let branch_keywords = self.branch_keyword.find_iter(body).count();
        let ternaries = body.matches(" ? ").count();
        let logical = body.matches("&&").count() + body.matches("||").count();

        let awaited = body.matches("await ").count();
        let self_calls = self.self_call.find_iter(body).count();

        Complexity {
            line_count: body.lines().count(),
            branch_count: branch_keywords + ternaries + logical + 1,
            external_call_count: awaited + self_calls,
        }
    }

    /// Analyze every implementation file under `dir`, skipping test and declaration files.
    pub fn analyze_directory(&self, dir: &Path) -> Result<Scan<ImplementationModule>> {
        let mut scan = Scan::default();
        for path in find_files(dir, IMPL_EXTENSIONS)? {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if file_name.ends_with(".test.ts") || file_name.ends_with(".d.ts") {
                continue;
            }
            tracing::debug!(path = %path.display(), "analyzing implementation");
            let outcome = self.analyze_one(&path);
            scan.push(&path, outcome);
        }
        Ok(scan)
    }

    /// Extract structural facts from source text.
    pub fn analyze_source(&self, text: &str, path: &Path) -> ImplementationModule {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let imports: Vec<String> = self
            .import
            .captures_iter(text)
            .map(|c| c[1].to_string())
            .collect();
        let dependencies = imports
            .iter()
            .filter(|i| is_sibling_concept_import(i))
            .cloned()
            .collect();

        let mut persistence_fields: Vec<String> = self
            .collection_field
            .captures_iter(text)
            .map(|c| c[1].to_string())
            .collect();
        persistence_fields.dedup();

        ImplementationModule {
            name,
            exposed_type_name: self.exposed_type_name(text),
            methods: self.extract_methods(text),
            imports,
            dependencies,
            persistence_fields,
            source_location: path.to_path_buf(),
        }
    }

    /// First exported class; exported interfaces and aliases only when no class exists.
    fn exposed_type_name(&self, text: &str) -> Option<String> {
        self.exported_class
            .captures(text)
            .or_else(|| self.exported_type.captures(text))
            .map(|c| c[1].to_string())
    }

    fn extract_methods(&self, text: &str) -> Vec<ImplMethod> {
        let lines: Vec<&str> = text.lines().collect();
        let handle_access = format!("this.{}", PERSISTENCE_HANDLE);
        let mut methods = Vec::new();
        let mut idx = 0;

        while idx < lines.len() {
            let line = lines[idx];
            let caps = match self.method.captures(line) {
                Some(c) => c,
                None => {
                    idx += 1;
                    continue;
                }
            };

            let name = caps[2].to_string();
            let trimmed = line.trim_end();
            if NON_METHOD_WORDS.contains(&name.as_str())
                || trimmed.ends_with(';')
                || line.contains(&handle_access)
            {
                idx += 1;
                continue;
            }

            let Some(span) = method_span(&lines, idx) else {
                idx += 1;
                continue;
            };

            // Constructors are skipped along with their bodies
            if name != "constructor" {
                let signature = lines[idx..=span.body_open].join("\n");
                let (parameters, return_type_text) = self.parse_signature(&signature, &name);
                let body_text = lines[idx..=span.end].join("\n");
                methods.push(ImplMethod {
                    is_query: is_query_name(&name),
                    name,
                    is_async: caps.get(1).is_some(),
                    parameters,
                    return_type_text,
                    complexity: self.complexity_of(&body_text),
                    body_text,
                    line_number: idx + 1,
                });
            }

            idx = span.end + 1;
        }

        methods
    }

    fn parse_signature(&self, signature: &str, name: &str) -> (Vec<Parameter>, String) {
        let start = signature.find(name).map(|i| i + name.len()).unwrap_or(0);
        let Some(open) = signature[start..].find('(').map(|i| i + start) else {
            return (Vec::new(), String::new());
        };
        let Some(close) = matching_paren(signature, open) else {
            return (Vec::new(), String::new());
        };

        let parameters = parse_parameters(&signature[open + 1..close]);

        let rest = signature[close + 1..].trim();
        let return_type = match rest.strip_prefix(':') {
            Some(annotated) => {
                let annotated = annotated.trim();
                let ty = match annotated.strip_suffix('{') {
                    Some(ty) => ty,
                    None => first_brace_outside_generics(annotated)
                        .map(|b| &annotated[..b])
                        .unwrap_or(annotated),
                };
                ty.trim().to_string()
            }
            None => self
                .promise
                .captures(rest)
                .map(|c| format!("Promise<{}>", &c[1]))
                .unwrap_or_default(),
        };

        (parameters, return_type)
    }
}

/// Line indices of a method: where its body opens and where it ends.
struct MethodSpan {
    body_open: usize,
    end: usize,
}

/// Count braces from the signature line. The body opens on the first line
/// that ends with unclosed braces and ends where the count returns to zero.
/// A single line that opens and closes a brace is a one-line method.
fn method_span(lines: &[&str], start: usize) -> Option<MethodSpan> {
    let mut balance: i32 = 0;
    let mut body_open: Option<usize> = None;

    for (offset, line) in lines[start..].iter().enumerate() {
        let idx = start + offset;
        for ch in line.chars() {
            match ch {
                '{' => balance += 1,
                '}' => balance -= 1,
                _ => {}
            }
        }

        match body_open {
            None if balance > 0 => body_open = Some(idx),
            None if balance == 0 && line.trim_end().ends_with('}') && line.contains('{') => {
                return Some(MethodSpan {
                    body_open: idx,
                    end: idx,
                })
            }
            None if balance < 0 || line.trim_end().ends_with(';') => return None,
            Some(open) if balance <= 0 => {
                return Some(MethodSpan {
                    body_open: open,
                    end: idx,
                })
            }
            _ => {}
        }
    }

    // Unterminated body: take the rest of the file
    body_open.map(|open| MethodSpan {
        body_open: open,
        end: lines.len() - 1,
    })
}

/// Byte index of the first `{` not nested inside `<...>`.
fn first_brace_outside_generics(text: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut prev = ' ';
    for (idx, ch) in text.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' if prev != '=' => depth -= 1,
            '{' if depth <= 0 => return Some(idx),
            _ => {}
        }
        prev = ch;
    }
    None
}

/// Byte index of the `)` closing the `(` at `open`, counting parentheses only.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (idx, ch) in text[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
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

/// Parse either a single aggregate `{ a, b }: { a: A; b?: B }` input object or
/// a flat `a: A, b?: B` list.
fn parse_parameters(list: &str) -> Vec<Parameter> {
    let list = list.trim().trim_end_matches(',').trim();
    if list.is_empty() {
        return Vec::new();
    }

    let parts = split_top_level(list, ',');
    if parts.len() == 1 {
        let (pattern, ty) = split_annotation(list);
        let ty = ty.unwrap_or("");
        if ty.starts_with('{') {
            return parse_type_literal(ty);
        }
        if pattern.starts_with('{') {
            return destructured_names(pattern);
        }
    }

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            let (name_part, default) = match p.split_once('=') {
                Some((n, d)) => (n.trim(), Some(d)),
                None => (p, None),
            };
            let (name, ty) = split_annotation(name_part);
            let optional = name.ends_with('?') || default.is_some();
            Parameter {
                name: name.trim_end_matches('?').trim().to_string(),
                type_text: ty.unwrap_or("").trim().to_string(),
                optional,
            }
        })
        .collect()
}

/// Split `pattern: Type` on the first top-level colon.
fn split_annotation(text: &str) -> (&str, Option<&str>) {
    let parts = split_top_level(text, ':');
    if parts.len() < 2 {
        return (text.trim(), None);
    }
    let first = parts[0];
    let ty = text[first.len() + 1..].trim();
    (first.trim(), Some(ty))
}

/// Fields of a `{ a: A; b?: B }` type literal.
fn parse_type_literal(ty: &str) -> Vec<Parameter> {
    let inner = ty
        .trim()
        .strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .unwrap_or(ty);

    inner
        .split(';')
        .flat_map(|chunk| split_top_level(chunk, ','))
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|field| {
            let (name, ty) = split_annotation(field);
            Parameter {
                optional: name.ends_with('?'),
                name: name.trim_end_matches('?').to_string(),
                type_text: ty.unwrap_or("").to_string(),
            }
        })
        .collect()
}

/// Names bound by an unannotated `{ a, b = 1 }` pattern.
fn destructured_names(pattern: &str) -> Vec<Parameter> {
    let inner = pattern
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}');
    split_top_level(inner, ',')
        .into_iter()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| {
            let (name, default) = match n.split_once('=') {
                Some((name, _)) => (name.trim(), true),
                None => (n, false),
            };
            Parameter {
                name: name.to_string(),
                type_text: String::new(),
                optional: default,
            }
        })
        .collect()
}

/// A relative import reaching into another concept's module, or a concept alias import.
fn is_sibling_concept_import(path: &str) -> bool {
    if path.starts_with("@concepts/") {
        return true;
    }
    if !path.starts_with("../") {
        return false;
    }
    let last = path.rsplit('/').next().unwrap_or("");
    let stem = last
        .strip_suffix(".ts")
        .or_else(|| last.strip_suffix(".js"))
        .unwrap_or(last);
    stem.ends_with(CONVENTIONAL_SUFFIX) && stem.len() > CONVENTIONAL_SUFFIX.len()
}
