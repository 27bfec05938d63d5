//! Markup template components.
//!
//! Placeholders are `{{ key }}` or `{{ a.b.c }}`, looked up in the props and
//! HTML-escaped; `{{ children }}` inserts the child markup verbatim. Missing
//! keys and `null` render as nothing.

use super::{Component, Props};
use crate::utils::html::escape;
use anyhow::Result;
use serde_json::Value;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const CHILDREN: &str = "children";

/// A component backed by a markup template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateComponent {
    source: String,
}

impl TemplateComponent {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl Component for TemplateComponent {
    fn render(&self, props: &Props, children: Option<&str>) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source.as_str();

        while let Some(start) = rest.find(OPEN) {
            let after = &rest[start + OPEN.len()..];
            let Some(end) = after.find(CLOSE) else {
                break;
            };
            out.push_str(&rest[..start]);

            let key = after[..end].trim();
            if key == CHILDREN {
                out.push_str(children.unwrap_or_default());
            } else if let Some(value) = lookup(props, key) {
                push_value(&mut out, value);
            }
            rest = &after[end + CLOSE.len()..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// Resolve a dotted key path inside the props.
fn lookup<'a>(props: &'a Props, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('.');
    let mut value = props.get(parts.next()?)?;
    for part in parts {
        value = match value {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(value)
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(&escape(s)),
        other => out.push_str(&escape(&other.to_string())),
    }
}
