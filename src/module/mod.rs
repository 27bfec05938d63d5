//! Page and root modules.
//!
//! A module is what the compiler leaves behind for one source page: a
//! renderable [`Node`], optional frontmatter and an optional async data
//! getter. Modules are obtained through a [`ModuleLoader`] and never mutated
//! after loading.
//!
//! ```text
//! PageModule
//! ├── component         Node::Component | Node::Fragment
//! ├── frontmatter       { draft = true, ... }
//! └── get_static_data   async () -> JSON (see page::route::StaticData)
//! ```

mod loader;
#[cfg(test)]
mod memory;
mod template;

pub use loader::{FsModuleLoader, ModuleLoader};
#[cfg(test)]
pub use memory::MemoryLoader;
pub use template::TemplateComponent;

use anyhow::Result;
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Props handed to components: a JSON object.
pub type Props = Map<String, Value>;

/// Something that renders props (and optional child markup) to markup.
pub trait Component: Send + Sync {
    fn render(&self, props: &Props, children: Option<&str>) -> Result<String>;
}

/// A renderable node: a named component or the empty identity marker.
#[derive(Clone)]
pub enum Node {
    Component(Arc<dyn Component>),
    Fragment,
}

impl Node {
    pub fn component(component: impl Component + 'static) -> Self {
        Self::Component(Arc::new(component))
    }

    pub const fn is_fragment(&self) -> bool {
        matches!(self, Self::Fragment)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component(_) => f.write_str("Node::Component"),
            Self::Fragment => f.write_str("Node::Fragment"),
        }
    }
}

/// Async data getter of a module.
pub type DataGetter = Arc<dyn Fn() -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Wrap a closure returning a future as a [`DataGetter`].
pub fn data_getter<F, Fut>(f: F) -> DataGetter
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<Value>> + Send + 'static,
{
    Arc::new(move || Box::pin(f()))
}

/// A loaded page module.
#[derive(Clone)]
pub struct PageModule {
    pub component: Node,
    pub get_static_data: Option<DataGetter>,
    pub frontmatter: Option<Props>,
}

impl PageModule {
    pub fn new(component: Node) -> Self {
        Self {
            component,
            get_static_data: None,
            frontmatter: None,
        }
    }

    pub fn with_data(mut self, getter: DataGetter) -> Self {
        self.get_static_data = Some(getter);
        self
    }

    pub fn with_frontmatter(mut self, frontmatter: Props) -> Self {
        self.frontmatter = Some(frontmatter);
        self
    }

    /// Whether the frontmatter marks this page as a draft.
    ///
    /// Any truthy `draft` value counts: `true`, a non-zero number, a
    /// non-empty string, an array or a table.
    pub fn is_draft(&self) -> bool {
        self.frontmatter
            .as_ref()
            .and_then(|fm| fm.get("draft"))
            .is_some_and(is_truthy)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl fmt::Debug for PageModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageModule")
            .field("component", &self.component)
            .field("get_static_data", &self.get_static_data.is_some())
            .field("frontmatter", &self.frontmatter)
            .finish()
    }
}

/// The layout wrapping every page, with its resolved global props.
#[derive(Debug, Clone)]
pub struct RootModule {
    pub component: Node,
    pub props: Props,
}

impl RootModule {
    /// The pass-through root used when no root module exists.
    pub fn identity() -> Self {
        Self {
            component: Node::Fragment,
            props: Props::new(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.component.is_fragment()
    }

    /// Resolve a loaded module into a root, awaiting its data getter.
    ///
    /// Only the `props` key of the getter result is used.
    pub async fn resolve(module: PageModule) -> Result<Self> {
        let props = match &module.get_static_data {
            Some(getter) => match getter().await? {
                Value::Object(mut data) => match data.remove("props") {
                    Some(Value::Object(props)) => props,
                    _ => Props::new(),
                },
                _ => Props::new(),
            },
            None => Props::new(),
        };
        Ok(Self {
            component: module.component,
            props,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_draft() {
        let page = PageModule::new(Node::Fragment);
        assert!(!page.is_draft());

        let Value::Object(fm) = json!({ "draft": true }) else { unreachable!() };
        assert!(page.clone().with_frontmatter(fm).is_draft());

        let Value::Object(fm) = json!({ "draft": "yes" }) else { unreachable!() };
        assert!(page.clone().with_frontmatter(fm).is_draft());
    }

    #[test]
    fn test_is_draft_falsy_values() {
        let page = PageModule::new(Node::Fragment);
        for value in [json!(false), json!(""), json!(0), json!(0.0), json!(null)] {
            let Value::Object(fm) = json!({ "draft": value }) else { unreachable!() };
            assert!(!page.clone().with_frontmatter(fm).is_draft(), "{value} is not a draft");
        }
        for value in [json!(1), json!(-2.5), json!("false"), json!([]), json!({})] {
            let Value::Object(fm) = json!({ "draft": value }) else { unreachable!() };
            assert!(page.clone().with_frontmatter(fm).is_draft(), "{value} is a draft");
        }
    }

    #[tokio::test]
    async fn test_root_resolve_props() {
        let module = PageModule::new(Node::Fragment).with_data(data_getter(|| async {
            Ok::<_, anyhow::Error>(json!({ "props": { "site": "islet" }, "ignored": 1 }))
        }));
        let root = RootModule::resolve(module).await.unwrap();
        assert_eq!(root.props.get("site"), Some(&json!("islet")));
        assert!(root.is_identity());
    }

    #[tokio::test]
    async fn test_root_resolve_without_getter() {
        let root = RootModule::resolve(PageModule::new(Node::Fragment)).await.unwrap();
        assert!(root.props.is_empty());
    }
}
