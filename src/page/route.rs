//! Static data resolution and dynamic route expansion.
//!
//! A page's data getter returns one of three shapes:
//!
//! ```text
//! { "props": {...} }                                  one page
//! { "props": {...}, "paths": { "slug": "a" } }        one page, [slug] -> a
//! [ { "props": ..., "paths": ... }, ... ]             one page per item
//! ```
//!
//! Anything else (null, empty arrays, objects with neither key) means "no
//! data": the page is emitted once with default props.

use crate::module::{PageModule, Props};
use anyhow::Result;
use serde_json::Value;
use std::path::PathBuf;

/// Normalized `{props, paths}` pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticDataItem {
    pub props: Props,
    pub paths: Props,
}

impl StaticDataItem {
    /// Overlay the keys of a getter object on the defaults.
    fn from_value(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };
        let field = |key: &str| match map.get(key) {
            Some(Value::Object(inner)) => inner.clone(),
            _ => Props::new(),
        };
        Self {
            props: field("props"),
            paths: field("paths"),
        }
    }

    /// Substitute every `[name]` token of `route` with its path parameter.
    pub fn apply_paths(&self, route: &str) -> String {
        self.paths.iter().fold(route.to_string(), |acc, (name, value)| {
            acc.replace(&format!("[{name}]"), &path_param(value))
        })
    }
}

/// String coercion of a path parameter.
fn path_param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The recognized getter result shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum StaticData {
    /// `{props}` without `paths`.
    Props(StaticDataItem),
    /// `{paths}` with optional `props`.
    Paths(StaticDataItem),
    /// Non-empty array of `{props, paths}` items.
    List(Vec<StaticDataItem>),
    /// Nothing recognizable.
    Empty,
}

impl From<Value> for StaticData {
    fn from(value: Value) -> Self {
        match &value {
            Value::Array(items) if !items.is_empty() => {
                Self::List(items.iter().map(StaticDataItem::from_value).collect())
            }
            Value::Object(map) if map.contains_key("paths") => {
                Self::Paths(StaticDataItem::from_value(&value))
            }
            Value::Object(map) if map.contains_key("props") => {
                Self::Props(StaticDataItem::from_value(&value))
            }
            _ => Self::Empty,
        }
    }
}

/// One concrete output of a page module.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    pub item: StaticDataItem,
    pub out_file: PathBuf,
}

impl ResolvedRoute {
    fn new(item: StaticDataItem, out_file: PathBuf) -> Self {
        Self { item, out_file }
    }

    fn substituted(item: StaticDataItem, out_file: &str) -> Self {
        let out_file = PathBuf::from(item.apply_paths(out_file));
        Self { item, out_file }
    }
}

/// Resolve a page module into its concrete routes.
///
/// `out_file` is the output path derived from the module path, possibly
/// containing `[name]` tokens. Drafts resolve normally; filtering happens
/// at render time.
pub async fn resolve_routes(module: &PageModule, out_file: PathBuf) -> Result<Vec<ResolvedRoute>> {
    let data = match &module.get_static_data {
        Some(getter) => StaticData::from(getter().await?),
        None => StaticData::Empty,
    };

    let template = out_file.to_string_lossy().into_owned();
    Ok(match data {
        StaticData::Empty => vec![ResolvedRoute::new(StaticDataItem::default(), out_file)],
        StaticData::Props(item) => vec![ResolvedRoute::new(item, out_file)],
        StaticData::Paths(item) => vec![ResolvedRoute::substituted(item, &template)],
        StaticData::List(items) => items
            .into_iter()
            .map(|item| ResolvedRoute::substituted(item, &template))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Node, data_getter};
    use serde_json::json;

    fn page_with(value: Value) -> PageModule {
        PageModule::new(Node::Fragment).with_data(data_getter(move || {
            let value = value.clone();
            async move { Ok::<_, anyhow::Error>(value) }
        }))
    }

    #[tokio::test]
    async fn test_no_getter() {
        let routes = resolve_routes(&PageModule::new(Node::Fragment), "dist/about.html".into())
            .await
            .unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].out_file, PathBuf::from("dist/about.html"));
        assert_eq!(routes[0].item, StaticDataItem::default());
    }

    #[tokio::test]
    async fn test_props_only() {
        let page = page_with(json!({ "props": { "title": "Hi" } }));
        let routes = resolve_routes(&page, "dist/[id].html".into()).await.unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].out_file, PathBuf::from("dist/[id].html"));
        assert_eq!(routes[0].item.props.get("title"), Some(&json!("Hi")));
        assert!(routes[0].item.paths.is_empty());
    }

    #[tokio::test]
    async fn test_single_paths() {
        let page = page_with(json!({ "paths": { "id": 7 } }));
        let routes = resolve_routes(&page, "dist/posts/[id].html".into()).await.unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].out_file, PathBuf::from("dist/posts/7.html"));
        assert!(routes[0].item.props.is_empty());
    }

    #[tokio::test]
    async fn test_array_fan_out_keeps_items_apart() {
        let page = page_with(json!([
            { "props": { "title": "A" }, "paths": { "slug": "a" } },
            { "paths": { "slug": "b" } },
        ]));
        let routes = resolve_routes(&page, "dist/[slug]/index.html".into()).await.unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].out_file, PathBuf::from("dist/a/index.html"));
        assert_eq!(routes[1].out_file, PathBuf::from("dist/b/index.html"));
        assert_eq!(routes[0].item.props.get("title"), Some(&json!("A")));
        assert!(routes[1].item.props.is_empty());
    }

    #[tokio::test]
    async fn test_every_occurrence_replaced() {
        let page = page_with(json!({ "paths": { "tag": "rust" } }));
        let routes = resolve_routes(&page, "dist/[tag]/[tag]-list.html".into()).await.unwrap();
        assert_eq!(routes[0].out_file, PathBuf::from("dist/rust/rust-list.html"));
    }

    #[tokio::test]
    async fn test_unrecognized_shapes_fall_back() {
        for value in [json!(null), json!([]), json!({ "other": 1 }), json!("text")] {
            let routes = resolve_routes(&page_with(value), "dist/x.html".into()).await.unwrap();
            assert_eq!(routes.len(), 1);
            assert_eq!(routes[0].item, StaticDataItem::default());
        }
    }

    #[tokio::test]
    async fn test_getter_error_propagates() {
        let page = PageModule::new(Node::Fragment)
            .with_data(data_getter(|| async { Err::<Value, _>(anyhow::anyhow!("network down")) }));
        let err = resolve_routes(&page, "dist/x.html".into()).await.unwrap_err();
        assert!(err.to_string().contains("network down"));
    }

    #[test]
    fn test_path_param_coercion() {
        assert_eq!(path_param(&json!("a b")), "a b");
        assert_eq!(path_param(&json!(1.5)), "1.5");
        assert_eq!(path_param(&json!(true)), "true");
    }
}
