//! The compiler collaborator.
//!
//! The build never transforms sources itself. It hands entry lists and small
//! code-generation IRs to a [`Compiler`] and consumes what comes back:
//!
//! ```text
//! compile()            page/root sources  -> loadable modules in temp/
//! render_virtual()     VirtualEntry       -> { export_id: html }
//! bundle_for_client()  ClientEntry        -> [BundleOutput]
//! ```
//!
//! [`StaticCompiler`] is the built-in implementation for plain markup
//! template modules.

mod local;

pub use local::StaticCompiler;

use anyhow::Result;
use jwalk::WalkDir;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Options for [`Compiler::compile`].
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Directory the entries are relative to.
    pub out_base: PathBuf,
    /// Directory receiving the compiled modules, mirroring `out_base`.
    pub out_dir: PathBuf,
    /// Import aliases, applied in key order.
    pub alias: BTreeMap<String, String>,
}

/// Options for [`Compiler::bundle_for_client`].
#[derive(Debug, Clone)]
pub struct BundleOptions {
    pub out_dir: PathBuf,
    pub minify: bool,
}

/// One emitted client file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOutput {
    pub file_name: String,
    pub contents: String,
}

/// Entry rendering several modules to strings in one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VirtualEntry {
    pub imports: Vec<VirtualImport>,
}

/// `import <binding_id> from <import_path>`, rendered into `<export_id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualImport {
    pub import_path: PathBuf,
    pub binding_id: String,
    pub export_id: String,
}

/// Client-side hydration entry for one hydrate group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HydrateEntry {
    pub name: String,
    pub imports: Vec<HydrateImport>,
    pub targets: Vec<HydrateTarget>,
    pub trigger: HydrateTrigger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HydrateImport {
    pub import_path: PathBuf,
    pub binding_id: String,
}

/// DOM elements to hydrate with `binding_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HydrateTarget {
    pub binding_id: String,
    pub targets_id: String,
    /// Attribute selector, e.g. `[data-partial-hydration="ph-1"]`.
    pub selector: String,
}

/// When a target is hydrated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HydrateTrigger {
    Immediate,
    Visible {
        root: Option<String>,
        root_margin: String,
        thresholds: Vec<f64>,
    },
}

/// Something to bundle for the browser.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEntry {
    /// Named stylesheet/script assets. Output is `<name>.<ext>` per extension.
    Asset { name: String, inputs: Vec<PathBuf> },
    Hydrate(HydrateEntry),
}

/// The module bundler capability.
pub trait Compiler: Send + Sync {
    /// Compile entry modules; returns the output path of each entry in order.
    fn compile(&self, entries: &[PathBuf], options: &CompileOptions) -> Result<Vec<PathBuf>>;

    /// Evaluate a virtual entry, keyed by `export_id`.
    fn render_virtual(&self, entry: &VirtualEntry) -> Result<BTreeMap<String, String>>;

    fn bundle_for_client(
        &self,
        entry: &ClientEntry,
        options: &BundleOptions,
    ) -> Result<Vec<BundleOutput>>;
}

const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Collect all files from a directory recursively, sorted by path.
pub fn collect_all_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let mut files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(|e| e.path())
        .collect();
    files.sort();
    files
}
