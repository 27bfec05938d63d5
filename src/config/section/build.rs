//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! src = "src"                 # Directory holding the root module
//! root = "root.html"          # Root module file name (optional file)
//! pages = "src/pages"         # Page modules
//! page_ext = ["html"]         # Extensions treated as page modules
//! partials = "src/partials"   # Interactive partial components
//! output = "dist"             # Generated site
//! temp = ".islet"             # Compiled modules and build metadata
//! base = "/"                  # href base for generated asset tags
//!
//! [build.alias]
//! "~/" = "/src/"
//! ```

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Directory holding the root module.
    pub src: PathBuf,

    /// Root module file name inside `src`.
    pub root: PathBuf,

    /// Page module directory.
    pub pages: PathBuf,

    /// Extensions of page modules.
    pub page_ext: Vec<String>,

    /// Partial component directory.
    pub partials: PathBuf,

    /// Build output directory.
    pub output: PathBuf,

    /// Temporary directory for compiled modules and metadata.
    pub temp: PathBuf,

    /// href base used when rewriting output asset paths into tags.
    pub base: String,

    /// Textual import aliases handed to the compiler.
    pub alias: BTreeMap<String, String>,

    /// Remove output and temp directories before building (CLI only).
    #[serde(skip)]
    pub clean: bool,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            src: "src".into(),
            root: "root.html".into(),
            pages: "src/pages".into(),
            page_ext: vec!["html".into()],
            partials: "src/partials".into(),
            output: "dist".into(),
            temp: ".islet".into(),
            base: "/".into(),
            alias: BTreeMap::new(),
            clean: false,
        }
    }
}

impl BuildSectionConfig {
    /// Root module source path.
    pub fn root_source(&self) -> PathBuf {
        self.src.join(&self.root)
    }

    /// Compiled page modules directory.
    pub fn temp_pages(&self) -> PathBuf {
        self.temp.join("pages")
    }

    /// Compiled root module directory.
    pub fn temp_root(&self) -> PathBuf {
        self.temp.join("root")
    }

    /// Partial hydration metadata directory.
    pub fn temp_partial(&self) -> PathBuf {
        self.temp.join("partial-hydration")
    }

    /// Whether `path` has one of the page module extensions.
    pub fn is_page_module(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.page_ext.iter().any(|e| e == ext))
    }

    /// Normalize all paths relative to root directory.
    pub fn normalize(&mut self, root: &Path) {
        use crate::utils::path::normalize_path;
        self.src = normalize_path(&root.join(&self.src));
        self.pages = normalize_path(&root.join(&self.pages));
        self.partials = normalize_path(&root.join(&self.partials));
        self.output = normalize_path(&root.join(&self.output));
        self.temp = normalize_path(&root.join(&self.temp));
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.page_ext.is_empty() {
            diag.error("build.page_ext", "at least one page extension is required");
        }
        if self.page_ext.iter().any(|ext| ext.starts_with('.')) {
            diag.error_with_hint(
                "build.page_ext",
                "extensions must not start with a dot",
                "write `html` instead of `.html`",
            );
        }
        if self.output == self.temp {
            diag.error("build.temp", "temp directory must differ from build.output");
        }
        if !self.pages.exists() {
            diag.error(
                "build.pages",
                format!("pages directory not found: {}", self.pages.display()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert_eq!(config.build.page_ext, vec!["html"]);
        assert_eq!(config.build.base, "/");
        assert!(config.build.alias.is_empty());
    }

    #[test]
    fn test_alias_and_paths() {
        let config = test_parse_config(
            r#"
[build]
output = "public"
page_ext = ["html", "htm"]

[build.alias]
"~/" = "/src/"
"#,
        );
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert!(config.build.is_page_module(std::path::Path::new("a/b.htm")));
        assert!(!config.build.is_page_module(std::path::Path::new("a/b.data.json")));
        assert_eq!(config.build.alias.get("~/").map(String::as_str), Some("/src/"));
    }
}
