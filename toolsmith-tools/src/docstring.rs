//! Google-style docstring parsing and `{{key}}` templating
//!
//! A tool's docstring supplies its description and, in an `Args:` block,
//! one description per parameter:
//!
//! ```text
//! Mocks a database query.
//!
//! Args:
//!     query: The query to run.
//!     k (int): Number to return. Long descriptions may
//!         continue on the following lines.
//!
//! Returns:
//!     A list of strings
//! ```
//!
//! Lines outside the `Args:` block form the description, so the example
//! above describes itself as `Mocks a database query. Returns: A list of strings`.

use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static PARAM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_*][\w*]*)\s*(?:\([^)]*\))?\s*:\s*(.*)$")
        .expect("failed to create the docstring parameter pattern")
});

static TEMPLATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(\w+)\}\}").expect("failed to create the template marker pattern")
});

const ARGS_HEADER: &str = "Args:";

/// Descriptions extracted from a docstring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Docstring {
    /// Free-text description of the function
    pub description: String,
    /// Parameter descriptions in docstring order
    pub params: IndexMap<String, String>,
}

impl Docstring {
    /// Description of one parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Parse a docstring into its description and parameter descriptions.
///
/// The `Args:` block runs from the line reading exactly `Args:` to the next
/// section header, a line ending in `:` indented no deeper than `Args:`. Entries start at the
/// indentation of the first entry as `name: text` or `name (type): text`;
/// every other line continues the current entry.
pub fn parse_docstring(doc: &str) -> Docstring {
    let lines: Vec<&str> = doc.lines().map(str::trim_end).collect();

    let Some(header) = lines.iter().position(|line| line.trim() == ARGS_HEADER) else {
        return Docstring {
            description: doc.trim().to_string(),
            params: IndexMap::new(),
        };
    };

    let header_indent = indent_of(lines[header]);
    let block_end = lines[header + 1..]
        .iter()
        .position(|line| line.ends_with(':') && indent_of(line) <= header_indent)
        .map_or(lines.len(), |offset| header + 1 + offset);

    let description = lines[..header]
        .iter()
        .chain(&lines[block_end..])
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Docstring {
        description,
        params: parse_args_block(&lines[header + 1..block_end]),
    }
}

fn parse_args_block(lines: &[&str]) -> IndexMap<String, String> {
    let mut params = IndexMap::new();
    let mut entry_indent = None;
    let mut current: Option<(String, Vec<String>)> = None;

    for line in lines.iter().filter(|line| !line.trim().is_empty()) {
        let indent = indent_of(line);
        let entry_indent = *entry_indent.get_or_insert(indent);
        let text = line.trim();

        let entry = (indent == entry_indent)
            .then(|| PARAM_PATTERN.captures(text))
            .flatten();

        match entry {
            Some(caps) => {
                if let Some((name, parts)) = current.take() {
                    params.insert(name, parts.join(" "));
                }
                let name = caps[1].trim_start_matches('*').to_string();
                let first = caps[2].trim();
                let parts = if first.is_empty() {
                    Vec::new()
                } else {
                    vec![first.to_string()]
                };
                current = Some((name, parts));
            }
            None => {
                if let Some((_, parts)) = current.as_mut() {
                    parts.push(text.to_string());
                }
            }
        }
    }

    if let Some((name, parts)) = current {
        params.insert(name, parts.join(" "));
    }
    params
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Replace every `{{key}}` marker whose key `lookup` resolves.
///
/// Markers with unknown keys are left as they are.
pub fn render_template<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    TEMPLATE_PATTERN
        .replace_all(template, |caps: &Captures<'_>| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Substitute `{{key}}` markers in a docstring with the given values
pub fn inject_into_docstring(doc: &str, substitutions: &HashMap<String, String>) -> String {
    render_template(doc, |key| substitutions.get(key).cloned())
}
