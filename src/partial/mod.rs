//! Partial hydration.
//!
//! Partials are interactive components that are pre-rendered into every
//! page and later hydrated on the client. The build handles them in three
//! phases:
//!
//! ```text
//! string   render every partial once     -> string-initial.json
//! scan     which partials each page uses -> pages.json (hydrate groups)
//! client   one hydrate bundle per group  -> hydrate-<n>.js
//! ```
//!
//! Pages reference a partial through a placeholder carrying the partial id
//! (its file stem): `<div data-partial-hydration="Counter"></div>`.

mod client;
mod group;
pub mod string;

pub use client::{emit_hydrate_groups, partial_patterns};
pub use group::{HYDRATE_PAGES, HydrateGroup, group_pages, save_groups, scan_module};
pub use string::{PartialStrings, STRING_INITIAL, build_partial_strings};

use crate::compiler::collect_all_files;
use crate::config::{BuildSectionConfig, PartialConfig};
use crate::utils::sort::upper_cmp;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A discovered partial source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialEntry {
    /// File stem, the name pages reference.
    pub id: String,
    pub importer: PathBuf,
}

/// A numbered partial with every derived identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialModule {
    pub id: String,
    /// Binding name in generated entries, `PH_<n>`.
    pub ph_id: String,
    /// Wrapper attribute value, `<prefix>-<n>`.
    pub ph_dom_id: String,
    pub html_id: String,
    pub targets_id: String,
    pub importer: PathBuf,
    /// `data-<suffix>`.
    pub root_attr: String,
    pub root_dom_element: String,
    pub root_style_str: String,
}

impl PartialModule {
    /// Attribute selector matching this partial's wrappers.
    pub fn selector(&self) -> String {
        format!(r#"[{}="{}"]"#, self.root_attr, self.ph_dom_id)
    }
}

/// Every partial module source under `dir`.
pub fn collect_partial_entries(dir: &Path, build: &BuildSectionConfig) -> Vec<PartialEntry> {
    collect_all_files(dir)
        .into_iter()
        .filter(|path| build.is_page_module(path))
        .filter_map(|path| {
            let id = path.file_stem()?.to_str()?.to_string();
            Some(PartialEntry { id, importer: path })
        })
        .collect()
}

/// Sort entries by importer and number them from 1.
pub fn build_partial_modules(entries: &[PartialEntry], config: &PartialConfig) -> Vec<PartialModule> {
    let mut sorted: Vec<_> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        upper_cmp(&a.importer.to_string_lossy(), &b.importer.to_string_lossy())
    });

    let root_attr = format!("data-{}", config.root_attr_suffix);
    let root_style_str = style_string(config);

    sorted
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let n = index + 1;
            PartialModule {
                id: entry.id.clone(),
                ph_id: format!("PH_{n}"),
                ph_dom_id: format!("{}-{n}", config.root_value_prefix),
                html_id: format!("html_{n}"),
                targets_id: format!("targets_{n}"),
                importer: entry.importer.clone(),
                root_attr: root_attr.clone(),
                root_dom_element: config.root_dom_element.clone(),
                root_style_str: root_style_str.clone(),
            }
        })
        .collect()
}

/// `key:value;` pairs with kebab-cased keys, or empty without a style.
fn style_string(config: &PartialConfig) -> String {
    config
        .root_style
        .iter()
        .map(|(key, value)| format!("{}:{};", kebab_case(key), value))
        .collect()
}

fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
