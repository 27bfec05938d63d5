//! `[search]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [search]
//! enable = true
//! output = "assets/search.json"   # relative to build.output
//! trim_title = " \\| My Site$"     # regex removed from <title>
//! target_selector = "main"        # subtree indexed as page content
//!
//! [search.hit]
//! min_length = 3
//! number = false
//! english = true
//! hiragana = false
//! katakana = true
//! kanji = true
//! ```

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub enable: bool,

    /// Index output path, relative to build.output.
    pub output: PathBuf,

    /// Reuse an existing index file instead of rebuilding it.
    pub cache: bool,

    /// Regex stripped from page titles.
    pub trim_title: String,

    /// Selector of the indexed content subtree.
    pub target_selector: String,

    pub hit: HitConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enable: true,
            output: "assets/search.json".into(),
            cache: false,
            trim_title: String::new(),
            target_selector: "main".into(),
            hit: HitConfig::default(),
        }
    }
}

/// Which vocabulary words count as searchable hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitConfig {
    pub min_length: usize,
    pub number: bool,
    pub english: bool,
    pub hiragana: bool,
    pub katakana: bool,
    pub kanji: bool,
}

impl Default for HitConfig {
    fn default() -> Self {
        Self {
            min_length: 3,
            number: false,
            english: true,
            hiragana: false,
            katakana: true,
            kanji: true,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.enable {
            return;
        }
        if let Err(e) = regex::Regex::new(&self.trim_title) {
            diag.error_with_hint(
                "search.trim_title",
                format!("invalid regex: {e}"),
                "escape special characters such as `|` or `(`",
            );
        }
        if self.target_selector.trim().is_empty() {
            diag.error("search.target_selector", "must not be empty");
        }
        if self.output.is_absolute() {
            diag.error("search.output", "must be relative to build.output");
        }
        let hit = &self.hit;
        if !(hit.number || hit.english || hit.hiragana || hit.katakana || hit.kanji) {
            diag.error_with_hint(
                "search.hit",
                "no character class enabled, the index would have no hits",
                "enable at least one of number, english, hiragana, katakana, kanji",
            );
        }
    }
}
