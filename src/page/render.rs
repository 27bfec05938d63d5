//! HTML assembly for one resolved route.
//!
//! ```text
//! props    = root.props + item.props + { frontmatter, location }
//! markup   = root(props, children = page(props))     or page(props) alone
//! markup   = inject asset tags before </head>
//! markup   = partial placeholders -> pre-rendered partials
//! markup   = comment markers -> <!-- ... -->
//! ```

use super::route::StaticDataItem;
use crate::asset::{AssetTagObject, build_assets_tag_str};
use crate::module::{Node, PageModule, Props, RootModule};
use crate::partial::PartialStrings;
use crate::utils::path::route_pathname;
use anyhow::Result;
use serde_json::{Value, json};
use std::path::Path;

const COMMENT_OPEN: &str = r#"<div class="islet-comment" hidden="">"#;
const DIV_CLOSE: &str = "</div>";
const HEAD_CLOSE: &str = "</head>";

/// Shared state for rendering every page of a build.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub root: &'a RootModule,
    pub partials: &'a PartialStrings,
    pub assets: &'a [AssetTagObject],
    /// Output root, stripped from page paths to form `location.pathname`.
    pub out_base: &'a Path,
}

/// Render one route of a page. Drafts render to `None`.
pub fn render_page(
    ctx: &RenderContext<'_>,
    page: &PageModule,
    item: &StaticDataItem,
    out_file: &Path,
) -> Result<Option<String>> {
    if page.is_draft() {
        return Ok(None);
    }

    let pathname = route_pathname(out_file, ctx.out_base, "html");
    let props = page_props(ctx.root, page, item, &pathname);

    let page_html = render_node(&page.component, &props, None)?;
    let html = if ctx.root.is_identity() {
        page_html
    } else {
        render_node(&ctx.root.component, &props, Some(&page_html))?
    };

    let html = inject_assets(&html, &build_assets_tag_str(&pathname, ctx.assets));
    let html = ctx.partials.replace_placeholders(&html);
    Ok(Some(rewrite_comments(&html)))
}

/// Root props, then item props, then the fixed `frontmatter` and `location`.
fn page_props(root: &RootModule, page: &PageModule, item: &StaticDataItem, pathname: &str) -> Props {
    let mut props = root.props.clone();
    props.extend(item.props.iter().map(|(k, v)| (k.clone(), v.clone())));
    props.insert(
        "frontmatter".into(),
        page.frontmatter.clone().map_or(Value::Null, Value::Object),
    );
    props.insert("location".into(), json!({ "pathname": pathname }));
    props
}

fn render_node(node: &Node, props: &Props, children: Option<&str>) -> Result<String> {
    match node {
        Node::Component(component) => component.render(props, children),
        Node::Fragment => Ok(children.unwrap_or_default().to_string()),
    }
}

/// Insert `tags` before `</head>`, or wrap bare markup in a document.
fn inject_assets(html: &str, tags: &str) -> String {
    if let Some(pos) = html.find(HEAD_CLOSE) {
        let mut out = String::with_capacity(html.len() + tags.len());
        out.push_str(&html[..pos]);
        out.push_str(tags);
        out.push_str(&html[pos..]);
        return out;
    }
    format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n{tags}\n</head>\n<body>\n{html}\n</body>\n</html>\n"
    )
}

/// Rewrite `<div class="islet-comment" hidden="">TEXT</div>` to `\n<!-- TEXT -->`.
///
/// TEXT is at least one character on a single line, ending at the nearest
/// closing `</div>`.
fn rewrite_comments(html: &str) -> String {
    if !html.contains(COMMENT_OPEN) {
        return html.to_string();
    }

    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find(COMMENT_OPEN) {
        out.push_str(&rest[..start]);
        let body = &rest[start + COMMENT_OPEN.len()..];

        let first_len = body.chars().next().map_or(0, char::len_utf8);
        let text_end = (first_len > 0)
            .then(|| body[first_len..].find(DIV_CLOSE).map(|i| i + first_len))
            .flatten()
            .filter(|&end| !body[..end].contains('\n'));

        match text_end {
            Some(end) => {
                out.push_str("\n<!-- ");
                out.push_str(&body[..end]);
                out.push_str(" -->");
                rest = &body[end + DIV_CLOSE.len()..];
            }
            None => {
                out.push_str(COMMENT_OPEN);
                rest = body;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::TemplateComponent;
    use crate::partial::string::PartialString;
    use std::path::PathBuf;

    fn obj(value: Value) -> Props {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn template(src: &str) -> Node {
        Node::component(TemplateComponent::new(src))
    }

    struct Fixture {
        root: RootModule,
        partials: PartialStrings,
        assets: Vec<AssetTagObject>,
        out_base: PathBuf,
    }

    impl Fixture {
        fn new(root: RootModule) -> Self {
            Self {
                root,
                partials: PartialStrings::default(),
                assets: Vec::new(),
                out_base: PathBuf::from("dist"),
            }
        }

        fn ctx(&self) -> RenderContext<'_> {
            RenderContext {
                root: &self.root,
                partials: &self.partials,
                assets: &self.assets,
                out_base: &self.out_base,
            }
        }
    }

    #[test]
    fn test_draft_renders_nothing() {
        let fx = Fixture::new(RootModule::identity());
        let page = PageModule::new(template("<p>x</p>")).with_frontmatter(obj(json!({ "draft": true })));
        let out = render_page(&fx.ctx(), &page, &StaticDataItem::default(), Path::new("dist/x.html")).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_props_precedence_and_location() {
        let root = RootModule {
            component: template("<html><head></head><body>{{ site }}|{{ title }}|{{ children }}</body></html>"),
            props: obj(json!({ "site": "S", "title": "root" })),
        };
        let fx = Fixture::new(root);
        let page = PageModule::new(template("<main>{{ title }} {{ location.pathname }} {{ frontmatter }}</main>"));
        let item = StaticDataItem {
            props: obj(json!({ "title": "page" })),
            paths: Props::new(),
        };

        let out = render_page(&fx.ctx(), &page, &item, Path::new("dist/blog/index.html"))
            .unwrap()
            .unwrap();
        assert_eq!(
            out,
            "<html><head></head><body>S|page|<main>page /blog/ </main></body></html>"
        );
    }

    #[test]
    fn test_identity_root_and_identity_page() {
        let fx = Fixture::new(RootModule::identity());
        let page = PageModule::new(Node::Fragment);
        let out = render_page(&fx.ctx(), &page, &StaticDataItem::default(), Path::new("dist/index.html"))
            .unwrap()
            .unwrap();
        assert!(out.contains("<body>\n\n</body>"));
        assert!(out.starts_with("<!doctype html>"));
    }

    #[test]
    fn test_assets_and_partials_injected() {
        let mut fx = Fixture::new(RootModule::identity());
        fx.assets.push(AssetTagObject {
            pattern: vec!["/docs/**".into()],
            asset_tag: r#"<script defer src="./a.js"></script>"#.into(),
            asset_path: "./a.js".into(),
        });
        fx.partials = PartialStrings {
            items: vec![PartialString {
                id: "Counter".into(),
                html: r#"<div data-partial-hydration="ph-1"><button>0</button></div>"#.into(),
            }],
        };
        let page = PageModule::new(template(
            r#"<html><head></head><body><div data-partial-hydration="Counter"></div></body></html>"#,
        ));
        let out = render_page(&fx.ctx(), &page, &StaticDataItem::default(), Path::new("dist/docs/a/b.html"))
            .unwrap()
            .unwrap();
        assert!(out.contains(r#"<script defer src="../../a.js"></script></head>"#));
        assert!(out.contains(r#"<div data-partial-hydration="ph-1"><button>0</button></div>"#));
        assert!(!out.contains(r#"data-partial-hydration="Counter""#));
    }

    #[test]
    fn test_rewrite_comments() {
        let html = r#"<p>a</p><div class="islet-comment" hidden=""> keep  this </div><p>b</p>"#;
        assert_eq!(rewrite_comments(html), "<p>a</p>\n<!--  keep  this  --><p>b</p>");
    }

    #[test]
    fn test_rewrite_comments_requires_text() {
        let html = r#"<div class="islet-comment" hidden=""></div>"#;
        assert_eq!(rewrite_comments(html), html);

        let multiline = "<div class=\"islet-comment\" hidden=\"\">a\nb</div>";
        assert_eq!(rewrite_comments(multiline), multiline);
    }

    #[test]
    fn test_rewrite_multiple_comments() {
        let html = r#"<div class="islet-comment" hidden="">a</div>x<div class="islet-comment" hidden="">b</div>"#;
        assert_eq!(rewrite_comments(html), "\n<!-- a -->x\n<!-- b -->");
    }
}
