//! Scan phase: which partials each page needs, grouped into hydrate bundles.
//!
//! Pages needing the same partial set share one bundle. The group key is the
//! sorted, deduplicated union of a page's ids and the root's ids joined with
//! `-`; the empty key means "no hydration" and gets no bundle.

use super::PartialModule;
use crate::config::PartialConfig;
use crate::module::ModuleLoader;
use crate::utils::path::route_pathname;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file name inside the partial temp directory.
pub const HYDRATE_PAGES: &str = "pages.json";

/// Partial ids referenced by one compiled module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedModule {
    pub path: PathBuf,
    pub ids: Vec<String>,
}

/// One hydrate bundle and the pages it is injected into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HydrateGroup {
    pub name: String,
    pub insert_pages: Vec<String>,
    pub has_partial_modules: Vec<PartialModule>,
}

/// Find the partial ids a compiled module references.
///
/// Plain substring search over the module source: an id that is a prefix of
/// another id (or of any other text in the module) also counts as used.
pub fn scan_module(loader: &dyn ModuleLoader, path: &Path, ids: &[String]) -> Result<ScannedModule> {
    let source = loader.source(path)?;
    Ok(ScannedModule {
        path: path.to_path_buf(),
        ids: ids
            .iter()
            .filter(|id| source.contains(id.as_str()))
            .cloned()
            .collect(),
    })
}

/// Group pages by partial set and name the non-empty groups.
///
/// `modules_dir` is the compiled pages directory; page paths relative to it
/// become the `insert_pages` patterns.
pub fn group_pages(
    root: Option<&ScannedModule>,
    pages: &[ScannedModule],
    modules: &[PartialModule],
    config: &PartialConfig,
    modules_dir: &Path,
) -> Vec<HydrateGroup> {
    let root_ids = root.map(|r| r.ids.as_slice()).unwrap_or_default();

    let mut groups: BTreeMap<String, (BTreeSet<&str>, Vec<&ScannedModule>)> = BTreeMap::new();
    for page in pages {
        let ids: BTreeSet<&str> = page
            .ids
            .iter()
            .chain(root_ids)
            .map(String::as_str)
            .collect();
        if ids.is_empty() {
            continue;
        }
        let key = ids.iter().copied().collect::<Vec<_>>().join("-");
        groups.entry(key).or_insert_with(|| (ids, Vec::new())).1.push(page);
    }

    groups
        .into_values()
        .enumerate()
        .map(|(index, (ids, members))| HydrateGroup {
            name: format!("{}-{}", config.out_name, index + 1),
            insert_pages: members
                .iter()
                .map(|page| insert_page(&page.path, modules_dir))
                .collect(),
            has_partial_modules: modules
                .iter()
                .filter(|module| ids.contains(module.id.as_str()))
                .cloned()
                .collect(),
        })
        .collect()
}

/// Page pattern of a compiled module, with `[name]` route tokens widened to `*`.
fn insert_page(path: &Path, modules_dir: &Path) -> String {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("html");
    widen_route_tokens(&route_pathname(path, modules_dir, ext))
}

fn widen_route_tokens(pathname: &str) -> String {
    let mut out = String::with_capacity(pathname.len());
    let mut rest = pathname;
    while let Some(start) = rest.find('[') {
        let Some(len) = rest[start..].find(']').filter(|&len| !rest[start..start + len].contains('/'))
        else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push('*');
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}

/// Persist the groups as `pages.json`.
pub fn save_groups(groups: &[HydrateGroup], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(groups)?;
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{MemoryLoader, Node, PageModule};
    use crate::partial::{PartialEntry, build_partial_modules};

    fn scanned(path: &str, ids: &[&str]) -> ScannedModule {
        ScannedModule {
            path: PathBuf::from(path),
            ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn modules() -> Vec<PartialModule> {
        let entries: Vec<_> = ["Counter", "Tabs", "Toggle"]
            .iter()
            .map(|id| PartialEntry {
                id: id.to_string(),
                importer: PathBuf::from(format!("partials/{id}.html")),
            })
            .collect();
        build_partial_modules(&entries, &PartialConfig::default())
    }

    #[test]
    fn test_scan_module_substring() {
        let loader = MemoryLoader::new();
        let path = Path::new("/t/pages/a.html");
        loader.insert(
            path,
            PageModule::new(Node::Fragment),
            r#"<div data-partial-hydration="CounterLarge"></div>"#,
        );
        let ids = vec!["Counter".to_string(), "Tabs".to_string()];
        let scan = scan_module(&loader, path, &ids).unwrap();
        assert_eq!(scan.ids, vec!["Counter"]);
    }

    #[test]
    fn test_group_pages() {
        let dir = Path::new("/t/pages");
        let pages = [
            scanned("/t/pages/index.html", &["Tabs", "Counter"]),
            scanned("/t/pages/about.html", &[]),
            scanned("/t/pages/blog/index.html", &["Counter", "Tabs"]),
            scanned("/t/pages/posts/[slug].html", &["Toggle"]),
        ];
        let groups = group_pages(None, &pages, &modules(), &PartialConfig::default(), dir);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "hydrate-1");
        assert_eq!(groups[0].insert_pages, vec!["/", "/blog/"]);
        let ids: Vec<_> = groups[0].has_partial_modules.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["Counter", "Tabs"]);

        assert_eq!(groups[1].name, "hydrate-2");
        assert_eq!(groups[1].insert_pages, vec!["/posts/*"]);
    }

    #[test]
    fn test_root_ids_join_every_page() {
        let dir = Path::new("/t/pages");
        let root = scanned("/t/root/root.html", &["Toggle"]);
        let pages = [
            scanned("/t/pages/index.html", &[]),
            scanned("/t/pages/docs.html", &["Counter"]),
        ];
        let groups = group_pages(Some(&root), &pages, &modules(), &PartialConfig::default(), dir);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].insert_pages, vec!["/docs"]);
        assert_eq!(groups[0].has_partial_modules.len(), 2);
        assert_eq!(groups[1].insert_pages, vec!["/"]);
        assert_eq!(groups[1].has_partial_modules[0].id, "Toggle");
    }

    #[test]
    fn test_no_partials_no_groups() {
        let pages = [scanned("/t/pages/index.html", &[])];
        let groups = group_pages(None, &pages, &[], &PartialConfig::default(), Path::new("/t/pages"));
        assert!(groups.is_empty());
    }

    #[test]
    fn test_widen_route_tokens() {
        assert_eq!(widen_route_tokens("/posts/[slug]"), "/posts/*");
        assert_eq!(widen_route_tokens("/[a]/[b]/"), "/*/*/");
        assert_eq!(widen_route_tokens("/tags/[tag]-list"), "/tags/*-list");
        assert_eq!(widen_route_tokens("/odd[/x"), "/odd[/x");
    }
}
