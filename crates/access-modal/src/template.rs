//! Content templates.
//!
//! `<%= path %>` and `${path}` insert a value as is, `<%- path %>` inserts
//! it HTML-escaped. `path` is a variable name optionally followed by
//! `.field` segments walking into JSON objects. Evaluation blocks
//! (`<% ... %>`) are not supported and are copied through unchanged.

use serde_json::Value;
use std::collections::BTreeMap;

/// Turns a template and its variables into the HTML placed in the modal content
pub trait TemplateRenderer {
    fn render(&self, template: &str, vars: &BTreeMap<String, Value>) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InterpolateTemplate;

impl TemplateRenderer for InterpolateTemplate {
    fn render(&self, template: &str, vars: &BTreeMap<String, Value>) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = next_tag(rest) {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];

            // `escape` is None for evaluation blocks
            let (open_len, close, escape) = if tail.starts_with("<%=") {
                (3, "%>", Some(false))
            } else if tail.starts_with("<%-") {
                (3, "%>", Some(true))
            } else if tail.starts_with("${") {
                (2, "}", Some(false))
            } else {
                (2, "%>", None)
            };

            let Some(end) = tail[open_len..].find(close) else {
                // Unterminated tag, keep the remainder verbatim
                out.push_str(tail);
                return out;
            };
            let tag_len = open_len + end + close.len();

            let Some(escape) = escape else {
                log::warn!("Template evaluation blocks are not supported, copied as text");
                out.push_str(&tail[..tag_len]);
                rest = &tail[tag_len..];
                continue;
            };

            let path = tail[open_len..open_len + end].trim();
            let value = lookup(vars, path).map(stringify).unwrap_or_else(|| {
                log::warn!("Template variable `{path}` is not defined");
                String::new()
            });
            if escape {
                out.push_str(&escape_html(&value));
            } else {
                out.push_str(&value);
            }
            rest = &tail[tag_len..];
        }

        out.push_str(rest);
        out
    }
}

fn next_tag(s: &str) -> Option<usize> {
    match (s.find("<%"), s.find("${")) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn lookup<'a>(vars: &'a BTreeMap<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.').map(str::trim);
    let mut value = vars.get(segments.next()?)?;
    for segment in segments {
        value = match value {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(value)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
