//! `[assets]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [assets]
//! out_dir = "assets"
//!
//! [[assets.entries]]
//! name = "blog"
//! input = "src/assets/blog.css"
//! insert_pages = ["/blog/**"]
//!
//! [assets.bundle]
//! out_name = "bundle"
//!
//! [assets.partial]
//! out_name = "hydrate"
//! use_intersection_observer = true
//! root_style = { display = "contents" }
//!
//! [assets.partial.intersection_observer]
//! root_margin = "0px"
//! thresholds = [0.0]
//! ```

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The pattern list meaning "every page".
pub const ALL_PAGES: &str = "**/*";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Output sub-directory for client assets.
    pub out_dir: PathBuf,

    /// Ask the bundler to minify client output.
    pub minify: bool,

    /// Named client entries with their page patterns.
    pub entries: Vec<EntryPattern>,

    /// Shared client bundle settings.
    pub bundle: BundleConfig,

    /// Partial hydration settings.
    pub partial: PartialConfig,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            out_dir: "assets".into(),
            minify: true,
            entries: Vec::new(),
            bundle: BundleConfig::default(),
            partial: PartialConfig::default(),
        }
    }
}

/// A named asset and the pages it is injected into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPattern {
    /// Logical asset name (output file name without extension).
    pub name: String,

    /// Source entry for the client bundler.
    #[serde(default)]
    pub input: PathBuf,

    /// Page-path glob patterns.
    #[serde(default = "all_pages")]
    pub insert_pages: Vec<String>,
}

impl EntryPattern {
    pub fn new(name: impl Into<String>, insert_pages: Vec<String>) -> Self {
        Self {
            name: name.into(),
            input: PathBuf::new(),
            insert_pages,
        }
    }
}

fn all_pages() -> Vec<String> {
    vec![ALL_PAGES.to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Output name of the shared bundle.
    pub out_name: String,
    pub insert_pages: Vec<String>,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            out_name: "bundle".into(),
            insert_pages: all_pages(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialConfig {
    /// Prefix of hydrate group names (`hydrate-1`, `hydrate-2`, ...).
    pub out_name: String,

    /// Element wrapping each pre-rendered partial.
    pub root_dom_element: String,

    /// Wrapper attribute is `data-<suffix>`.
    pub root_attr_suffix: String,

    /// Wrapper attribute value is `<prefix>-<n>`.
    pub root_value_prefix: String,

    /// Inline style for the wrapper, keys in camel or kebab case.
    pub root_style: BTreeMap<String, String>,

    /// Hydrate when the partial becomes visible instead of on load.
    pub use_intersection_observer: bool,

    pub intersection_observer: ObserverConfig,
}

impl Default for PartialConfig {
    fn default() -> Self {
        Self {
            out_name: "hydrate".into(),
            root_dom_element: "div".into(),
            root_attr_suffix: "partial-hydration".into(),
            root_value_prefix: "ph".into(),
            root_style: BTreeMap::new(),
            use_intersection_observer: true,
            intersection_observer: ObserverConfig::default(),
        }
    }
}

/// Visibility observer options for lazy hydration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// CSS selector of the scrolling root; viewport when absent.
    pub root: Option<String>,
    pub root_margin: String,
    pub thresholds: Vec<f64>,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            root: None,
            root_margin: "0px".into(),
            thresholds: vec![0.0],
        }
    }
}

impl AssetsConfig {
    /// Normalize entry inputs relative to root directory.
    pub fn normalize(&mut self, root: &Path) {
        for entry in &mut self.entries {
            if !entry.input.as_os_str().is_empty() {
                entry.input = crate::utils::path::normalize_path(&root.join(&entry.input));
            }
        }
    }

    /// Bundle rule, in the same shape as entry rules.
    pub fn bundle_pattern(&self) -> EntryPattern {
        EntryPattern::new(&self.bundle.out_name, self.bundle.insert_pages.clone())
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.out_dir.is_absolute() {
            diag.error_with_hint(
                "assets.out_dir",
                "must be relative to build.output",
                format!("use `{}`", self.out_dir.display().to_string().trim_start_matches('/')),
            );
        }
        for entry in &self.entries {
            if entry.name.is_empty() {
                diag.error("assets.entries", "entry name must not be empty");
            }
            if entry.input.as_os_str().is_empty() {
                diag.error("assets.entries", format!("entry `{}` has no input", entry.name));
            } else if !entry.input.is_file() {
                diag.error(
                    "assets.entries",
                    format!("entry input not found: {}", entry.input.display()),
                );
            }
        }
        let partial = &self.partial;
        if partial.out_name.is_empty() {
            diag.error("assets.partial.out_name", "must not be empty");
        }
        if partial.root_dom_element.is_empty()
            || !partial.root_dom_element.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            diag.error(
                "assets.partial.root_dom_element",
                format!("not a valid element name: `{}`", partial.root_dom_element),
            );
        }
        let thresholds = &partial.intersection_observer.thresholds;
        if thresholds.iter().any(|t| !(0.0..=1.0).contains(t)) {
            diag.error(
                "assets.partial.intersection_observer.thresholds",
                "thresholds must be between 0.0 and 1.0",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        let partial = &config.assets.partial;
        assert_eq!(partial.out_name, "hydrate");
        assert_eq!(partial.root_attr_suffix, "partial-hydration");
        assert!(partial.use_intersection_observer);
        assert_eq!(partial.intersection_observer.thresholds, vec![0.0]);
        assert_eq!(config.assets.bundle_pattern().insert_pages, vec!["**/*"]);
    }

    #[test]
    fn test_entries_default_to_all_pages() {
        let config = test_parse_config(
            r#"
[[assets.entries]]
name = "blog"
input = "src/blog.css"
insert_pages = ["/blog/**"]

[[assets.entries]]
name = "site"
input = "src/site.js"
"#,
        );
        assert_eq!(config.assets.entries[0].insert_pages, vec!["/blog/**"]);
        assert_eq!(config.assets.entries[1].insert_pages, vec!["**/*"]);
    }

    #[test]
    fn test_root_style_and_observer() {
        let config = test_parse_config(
            r#"
[assets.partial]
use_intersection_observer = false
root_style = { display = "contents" }

[assets.partial.intersection_observer]
root_margin = "200px"
thresholds = [0.0, 0.5]
"#,
        );
        let partial = &config.assets.partial;
        assert!(!partial.use_intersection_observer);
        assert_eq!(partial.root_style.get("display").map(String::as_str), Some("contents"));
        assert_eq!(partial.intersection_observer.root_margin, "200px");
        assert_eq!(partial.intersection_observer.thresholds, vec![0.0, 0.5]);
    }

    #[test]
    fn test_validate_thresholds() {
        let mut config = test_parse_config("");
        config.assets.partial.intersection_observer.thresholds = vec![1.5];
        let mut diag = crate::config::ConfigDiagnostics::new();
        config.assets.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
