//! Asset tag resolution.
//!
//! Every emitted client file becomes an [`AssetTagObject`] carrying the page
//! patterns it belongs to. Per page, the tags whose patterns match the page
//! pathname are concatenated and relative hrefs are re-rooted for the page
//! depth.

use crate::config::EntryPattern;
use crate::config::section::assets::ALL_PAGES;
use crate::debug;
use crate::utils::path::{is_external_link, to_slash};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// One injectable tag and the pages it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTagObject {
    pub pattern: Vec<String>,
    pub asset_tag: String,
    pub asset_path: String,
}

impl AssetTagObject {
    /// Whether any pattern matches `pathname`.
    pub fn matches(&self, pathname: &str) -> bool {
        self.pattern.iter().any(|p| page_matches(p, pathname))
    }

    /// The tag with its href re-rooted for a page at `pathname`.
    fn tag_for(&self, pathname: &str) -> String {
        if self.asset_path.starts_with('/') || is_external_link(&self.asset_path) {
            return self.asset_tag.clone();
        }
        let Some(rest) = self.asset_path.strip_prefix("./") else {
            return self.asset_tag.clone();
        };

        let depth = pathname.matches('/').count();
        if depth < 2 {
            return self.asset_tag.clone();
        }
        let relative = format!("{}{rest}", "../".repeat(depth - 1));
        self.asset_tag.replacen(&self.asset_path, &relative, 1)
    }
}

/// Glob match of a page pattern. `**/*` and `**` match every page.
fn page_matches(pattern: &str, pathname: &str) -> bool {
    if pattern == ALL_PAGES || pattern == "**" {
        return true;
    }
    match Pattern::new(pattern) {
        Ok(glob) => glob.matches_with(pathname, MATCH_OPTIONS),
        Err(e) => {
            debug!("assets"; "invalid page pattern `{}`: {}", pattern, e);
            false
        }
    }
}

/// Map an output file to its href: `out_base` replaced by `href_base`.
fn asset_href(file: &Path, out_base: &Path, href_base: &str) -> String {
    match file.strip_prefix(out_base) {
        Ok(relative) => {
            let base = href_base.trim_end_matches('/');
            format!("{base}/{}", to_slash(relative))
        }
        Err(_) => to_slash(file),
    }
}

/// Build the tag list for every emitted client file.
///
/// Each file's logical name (file name without extension) is looked up in
/// `entry`, then `bundle`, then `partial`; the first rule with that name
/// supplies the patterns, otherwise the tag goes on every page.
pub fn build_assets_tag_array(
    entry_points: &[PathBuf],
    out_base: &Path,
    href_base: &str,
    entry: &[EntryPattern],
    bundle: &[EntryPattern],
    partial: &[EntryPattern],
) -> Vec<AssetTagObject> {
    entry_points
        .iter()
        .map(|file| {
            let asset_path = asset_href(file, out_base, href_base);
            let asset_tag = if asset_path.ends_with(".css") {
                format!(r#"<link rel="stylesheet" href="{asset_path}">"#)
            } else {
                format!(r#"<script defer src="{asset_path}"></script>"#)
            };

            let name = file.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            let pattern = entry
                .iter()
                .chain(bundle)
                .chain(partial)
                .find(|rule| rule.name == name)
                .map(|rule| rule.insert_pages.clone())
                .unwrap_or_else(|| vec![ALL_PAGES.to_string()]);

            AssetTagObject {
                pattern,
                asset_tag,
                asset_path,
            }
        })
        .collect()
}

/// Concatenate the tags that apply to the page at `pathname`.
pub fn build_assets_tag_str(pathname: &str, tags: &[AssetTagObject]) -> String {
    tags.iter()
        .filter(|tag| tag.matches(pathname))
        .map(|tag| tag.tag_for(pathname))
        .collect()
}
