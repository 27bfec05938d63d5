//! Client-side search index.
//!
//! Every rendered page is reduced to its title words and the words of the
//! configured content subtree. All words of all pages form one sorted
//! vocabulary; pages store indices into it.
//!
//! ```json
//! {
//!   "words": [" ", "Hello", "Rust", ...],
//!   "hits":  [1, 2],
//!   "pages": [{ "path": "/", "title": [1], "toc": [[0, "intro"]], "content": [1, 0, 2] }]
//! }
//! ```
//!
//! `toc` entries are `[word offset, element id]`: the id of an element inside
//! the content subtree and the number of content words preceding it.

mod hit;
mod segment;

pub use hit::HitMatcher;
pub use segment::{normalize_text, segment};

use crate::compiler::collect_all_files;
use crate::config::SearchConfig;
use crate::log;
use crate::utils::html::{is_raw_text_element, unescape};
use crate::utils::path::route_pathname;
use crate::utils::sort::upper_cmp;
use anyhow::{Context, Result};
use futures::future::join_all;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIndex {
    pub words: Vec<String>,
    pub hits: Vec<usize>,
    pub pages: Vec<SearchPage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub path: String,
    pub title: Vec<usize>,
    pub toc: Vec<(usize, String)>,
    pub content: Vec<usize>,
}

/// One page before vocabulary encoding.
#[derive(Debug, Default, PartialEq, Eq)]
struct PageWords {
    path: String,
    title: Vec<String>,
    toc: Vec<(usize, String)>,
    content: Vec<String>,
}

/// Rendered pages under `output`, for rebuilding the index alone.
pub fn collect_page_files(output: &Path) -> Vec<PathBuf> {
    collect_all_files(output)
        .into_iter()
        .filter(|path| path.extension().is_some_and(|ext| ext == "html"))
        .collect()
}

/// Build and write the search index for `pages`.
///
/// Returns `None` without touching anything when `use_cache_exists` is set.
/// Pages that cannot be read are logged and left out of the index.
pub async fn build_search_json(
    config: &SearchConfig,
    use_cache_exists: bool,
    pages: &[PathBuf],
    out_base: &Path,
    out_file: &Path,
) -> Result<Option<SearchIndex>> {
    if use_cache_exists {
        return Ok(None);
    }

    let trim_title = Regex::new(&config.trim_title).context("invalid search.trim_title")?;
    let hit = HitMatcher::new(&config.hit)?;

    let reads = pages.iter().map(|path| async move {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))
            .map(|html| (path, html))
    });
    let mut words = Vec::with_capacity(pages.len());
    for read in join_all(reads).await {
        match read {
            Ok((path, html)) => {
                let pathname = route_pathname(path, out_base, "html");
                words.push(extract_page(&html, pathname, &trim_title, &config.target_selector));
            }
            Err(err) => log!("warning"; "search index skips a page: {:#}", err),
        }
    }

    let index = encode(words, &hit);

    if let Some(parent) = out_file.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    tokio::fs::write(out_file, serde_json::to_string(&index)?)
        .await
        .with_context(|| format!("failed to write {}", out_file.display()))?;
    Ok(Some(index))
}

/// Title and content words of one page.
///
/// Unparseable markup or a missing content node yield a title-only page.
fn extract_page(html: &str, path: String, trim_title: &Regex, selector: &str) -> PageWords {
    let mut page = PageWords {
        path,
        ..PageWords::default()
    };
    let Ok(dom) = tl::parse(html, tl::ParserOptions::default()) else {
        return page;
    };
    let parser = dom.parser();

    let title = dom
        .query_selector("title")
        .and_then(|mut nodes| nodes.next())
        .and_then(|handle| handle.get(parser))
        .map(|node| unescape(&node.inner_text(parser)).into_owned())
        .unwrap_or_default();
    page.title = segment(&trim_title.replace(&title, ""));

    let target = dom
        .query_selector(selector)
        .and_then(|mut nodes| nodes.next());
    if let Some(handle) = target {
        walk(handle, parser, &mut page);
    }
    page
}

/// Depth-first walk collecting toc anchors and content words.
fn walk(handle: tl::NodeHandle, parser: &tl::Parser, page: &mut PageWords) {
    let Some(node) = handle.get(parser) else {
        return;
    };
    match node {
        tl::Node::Tag(tag) => {
            let name = tag.name().as_utf8_str().to_ascii_lowercase();
            if is_raw_text_element(&name) {
                return;
            }
            if let Some(id) = tag.attributes().get("id").flatten() {
                page.toc.push((page.content.len(), id.as_utf8_str().into_owned()));
            }
            for child in tag.children().top().iter() {
                walk(*child, parser, page);
            }
        }
        tl::Node::Raw(bytes) => {
            let text = normalize_text(&bytes.as_utf8_str());
            page.content.extend(segment(&unescape(&text)));
        }
        tl::Node::Comment(_) => {}
    }
}

/// Build the vocabulary and encode every page against it.
fn encode(pages: Vec<PageWords>, hit: &HitMatcher) -> SearchIndex {
    let unique: FxHashSet<&str> = pages
        .iter()
        .flat_map(|page| page.title.iter().chain(&page.content))
        .map(String::as_str)
        .collect();
    let mut words: Vec<String> = unique.into_iter().map(str::to_string).collect();
    words.sort_by(|a, b| upper_cmp(a, b));

    let position: FxHashMap<&str, usize> = words
        .iter()
        .enumerate()
        .map(|(i, word)| (word.as_str(), i))
        .collect();
    let lookup = |list: &[String]| -> Vec<usize> {
        list.iter()
            .filter_map(|word| position.get(word.as_str()).copied())
            .collect()
    };

    let hits = words
        .iter()
        .enumerate()
        .filter(|(_, word)| hit.is_hit(word))
        .map(|(i, _)| i)
        .collect();

    let mut encoded: Vec<SearchPage> = pages
        .iter()
        .map(|page| SearchPage {
            path: page.path.clone(),
            title: lookup(&page.title),
            toc: page.toc.clone(),
            content: lookup(&page.content),
        })
        .collect();
    encoded.sort_by(|a, b| upper_cmp(&a.path, &b.path));

    SearchIndex {
        words,
        hits,
        pages: encoded,
    }
}
