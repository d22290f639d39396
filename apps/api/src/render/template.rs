//! Mustache rendering over the `mustache` crate, plus the tag scan that tells
//! which record fields a template reads.
//!
//! `{{name}}` output is HTML-escaped, `{{{name}}}` and `{{& name}}` are not.
//! Partials and delimiter changes are rejected before compiling.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use mustache::Data;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unsupported tag '{0}' (partials and delimiter changes are not available)")]
    Unsupported(String),

    #[error("template does not compile: {0}")]
    Compile(#[from] mustache::Error),

    #[error("a list or object was used where text was expected")]
    Shape,
}

/// A compiled template and the top-level names it reads.
#[derive(Debug, Clone)]
pub struct Template {
    compiled: mustache::Template,
    variables: Vec<String>,
}

impl Template {
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        let tags = scan_tags(source);
        if let Some(tag) = tags
            .iter()
            .find(|t| matches!(t.kind, TagKind::Partial | TagKind::Delimiters))
        {
            return Err(TemplateError::Unsupported(tag.name.clone()));
        }
        let compiled = mustache::compile_str(source)?;
        Ok(Self {
            compiled,
            variables: top_level_names(&tags),
        })
    }

    /// Top-level names the template reads from its data, in first-use order,
    /// without duplicates. Names used inside a section resolve against the
    /// section's items and are not included.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn render(&self, data: &Value) -> Result<String, TemplateError> {
        let data = template_data(data);
        // The engine panics on a list or object in variable position.
        panic::catch_unwind(AssertUnwindSafe(|| self.compiled.render_data_to_string(&data)))
            .map_err(|_| TemplateError::Shape)?
            .map_err(TemplateError::from)
    }
}

/// Converts JSON into engine data. Falsy values (null, false, "", 0-length
/// lists and objects) become `Data::Null` so they render empty and open
/// inverted sections; numbers and `true` render as text.
pub fn template_data(value: &Value) -> Data {
    match value {
        Value::Null | Value::Bool(false) => Data::Null,
        Value::Bool(true) => Data::String("true".to_string()),
        Value::Number(n) => Data::String(n.to_string()),
        Value::String(s) if s.is_empty() => Data::Null,
        Value::String(s) => Data::String(s.clone()),
        Value::Array(items) if items.is_empty() => Data::Null,
        Value::Array(items) => Data::Vec(items.iter().map(template_data).collect()),
        Value::Object(map) if map.is_empty() => Data::Null,
        Value::Object(map) => Data::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), template_data(v)))
                .collect::<HashMap<_, _>>(),
        ),
    }
}

/// Plain `{{word}}` placeholders in first-use order, without duplicates.
/// Used when a template cannot be compiled.
pub fn scan_placeholders(source: &str) -> Vec<String> {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let pattern = PLACEHOLDER
        .get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder pattern is valid"));

    let mut names: Vec<String> = Vec::new();
    for capture in pattern.captures_iter(source) {
        let name = &capture[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Variable,
    Open,
    Close,
    Comment,
    Partial,
    Delimiters,
}

#[derive(Debug)]
struct Tag {
    kind: TagKind,
    name: String,
}

fn scan_tags(source: &str) -> Vec<Tag> {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let pattern = TAG.get_or_init(|| {
        Regex::new(r"\{\{(\{[^}]*\}|[^}]*)\}\}").expect("tag pattern is valid")
    });

    pattern
        .captures_iter(source)
        .map(|capture| {
            let body = capture[1].trim();
            if let Some(inner) = body.strip_prefix('{') {
                return Tag {
                    kind: TagKind::Variable,
                    name: inner.trim_end_matches('}').trim().to_string(),
                };
            }
            let mut chars = body.chars();
            let kind = match chars.next() {
                Some('#' | '^') => TagKind::Open,
                Some('/') => TagKind::Close,
                Some('!') => TagKind::Comment,
                Some('>' | '<' | '$') => TagKind::Partial,
                Some('=') => TagKind::Delimiters,
                Some('&') => TagKind::Variable,
                _ => {
                    return Tag {
                        kind: TagKind::Variable,
                        name: body.to_string(),
                    }
                }
            };
            Tag {
                kind,
                name: chars.as_str().trim().to_string(),
            }
        })
        .collect()
}

fn top_level_names(tags: &[Tag]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut depth = 0usize;
    for tag in tags {
        let at_top = depth == 0;
        match tag.kind {
            TagKind::Open => depth += 1,
            TagKind::Close => {
                depth = depth.saturating_sub(1);
                continue;
            }
            TagKind::Variable => {}
            _ => continue,
        }
        if !at_top || tag.name == "." || tag.name.is_empty() {
            continue;
        }
        let head = tag.name.split('.').next().unwrap_or(&tag.name);
        if !names.iter().any(|n| n == head) {
            names.push(head.to_string());
        }
    }
    names
}
