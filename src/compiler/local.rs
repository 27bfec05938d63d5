//! Built-in compiler for markup template modules.
//!
//! - `compile` copies modules (and their `.data.json` siblings) into the
//!   temp tree, applying the alias map textually.
//! - `render_virtual` renders each import as a template without props.
//! - `bundle_for_client` concatenates assets; a hydrate entry becomes a
//!   script that runs each partial's `<stem>.client.js` against its targets.

use super::{
    BundleOptions, BundleOutput, ClientEntry, CompileOptions, Compiler, HydrateEntry,
    HydrateTrigger, VirtualEntry,
};
use crate::module::{FsModuleLoader, ModuleLoader, Node, Props};
use crate::utils::path::fs::rebase;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const CLIENT_SCRIPT_EXT: &str = "client.js";

#[derive(Debug, Default, Clone, Copy)]
pub struct StaticCompiler;

impl StaticCompiler {
    fn compile_one(entry: &Path, options: &CompileOptions) -> Result<PathBuf> {
        let dest = rebase(entry, &options.out_base, &options.out_dir);

        let source = fs::read_to_string(entry)
            .with_context(|| format!("failed to read {}", entry.display()))?;
        let compiled = apply_alias(&source, &options.alias);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, compiled).with_context(|| format!("failed to write {}", dest.display()))?;

        let data = FsModuleLoader::data_path(entry);
        if data.is_file() {
            fs::copy(&data, FsModuleLoader::data_path(&dest))
                .with_context(|| format!("failed to copy {}", data.display()))?;
        }
        Ok(dest)
    }

    fn bundle_assets(name: &str, inputs: &[PathBuf], minify: bool) -> Result<Vec<BundleOutput>> {
        let mut by_ext: BTreeMap<&str, String> = BTreeMap::new();
        for input in inputs {
            let ext = input.extension().and_then(|e| e.to_str()).unwrap_or("js");
            let content = fs::read_to_string(input)
                .with_context(|| format!("failed to read asset {}", input.display()))?;
            let buf = by_ext.entry(ext).or_default();
            if !buf.is_empty() {
                buf.push('\n');
            }
            buf.push_str(&content);
        }

        Ok(by_ext
            .into_iter()
            .map(|(ext, contents)| BundleOutput {
                file_name: format!("{name}.{ext}"),
                contents: if minify { minify_lines(&contents) } else { contents },
            })
            .collect())
    }

    fn bundle_hydrate(entry: &HydrateEntry, minify: bool) -> Result<Vec<BundleOutput>> {
        let script = hydrate_script(entry)?;
        Ok(vec![BundleOutput {
            file_name: format!("{}.js", entry.name),
            contents: if minify { minify_lines(&script) } else { script },
        }])
    }
}

impl Compiler for StaticCompiler {
    fn compile(&self, entries: &[PathBuf], options: &CompileOptions) -> Result<Vec<PathBuf>> {
        entries
            .iter()
            .map(|entry| Self::compile_one(entry, options))
            .collect()
    }

    fn render_virtual(&self, entry: &VirtualEntry) -> Result<BTreeMap<String, String>> {
        let props = Props::new();
        entry
            .imports
            .iter()
            .map(|import| {
                let module = FsModuleLoader.load(&import.import_path)?;
                let html = match &module.component {
                    Node::Component(component) => component
                        .render(&props, None)
                        .with_context(|| format!("failed to render {}", import.binding_id))?,
                    Node::Fragment => String::new(),
                };
                Ok((import.export_id.clone(), html))
            })
            .collect()
    }

    fn bundle_for_client(
        &self,
        entry: &ClientEntry,
        options: &BundleOptions,
    ) -> Result<Vec<BundleOutput>> {
        match entry {
            ClientEntry::Asset { name, inputs } => Self::bundle_assets(name, inputs, options.minify),
            ClientEntry::Hydrate(entry) => Self::bundle_hydrate(entry, options.minify),
        }
    }
}

/// Replace every alias key with its target.
fn apply_alias(source: &str, alias: &BTreeMap<String, String>) -> String {
    alias
        .iter()
        .filter(|(from, _)| !from.is_empty())
        .fold(source.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to))
}

fn minify_lines(source: &str) -> String {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Client script of a partial: `<stem>.client.js` next to its source.
fn client_script(import_path: &Path) -> Result<String> {
    let path = import_path.with_extension(CLIENT_SCRIPT_EXT);
    if !path.is_file() {
        return Ok(String::new());
    }
    fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
}

fn hydrate_script(entry: &HydrateEntry) -> Result<String> {
    let mut out = String::from("(() => {\nconst islands = {};\n");
    for import in &entry.imports {
        let body = client_script(&import.import_path)?;
        writeln!(out, "islands[{}] = function (target) {{", js_str(&import.binding_id))?;
        if !body.is_empty() {
            writeln!(out, "{}", body.trim_end())?;
        }
        out.push_str("};\n");
    }
    out.push_str("const hydrate = (id, target) => { const run = islands[id]; if (run) run(target); };\n");

    for target in &entry.targets {
        let id = js_str(&target.binding_id);
        writeln!(out, "// {}", target.binding_id)?;
        writeln!(
            out,
            "const {} = document.querySelectorAll({});",
            target.targets_id,
            js_str(&target.selector)
        )?;
        writeln!(out, "{}.forEach((target) => {{", target.targets_id)?;
        match &entry.trigger {
            HydrateTrigger::Immediate => writeln!(out, "  hydrate({id}, target);")?,
            HydrateTrigger::Visible {
                root,
                root_margin,
                thresholds,
            } => {
                let root = match root {
                    Some(selector) => format!("document.querySelector({})", js_str(selector)),
                    None => "null".to_string(),
                };
                let thresholds = serde_json::to_string(thresholds)?;
                writeln!(out, "  const observer = new IntersectionObserver((entries) => {{")?;
                writeln!(out, "    if (!entries.some((e) => e.isIntersecting)) return;")?;
                writeln!(out, "    observer.unobserve(target);")?;
                writeln!(out, "    hydrate({id}, target);")?;
                writeln!(
                    out,
                    "  }}, {{ root: {root}, rootMargin: {}, threshold: {thresholds} }});",
                    js_str(root_margin)
                )?;
                writeln!(out, "  observer.observe(target);")?;
            }
        }
        out.push_str("});\n");
    }
    out.push_str("})();\n");
    Ok(out)
}

/// Quote a string as a JS literal.
fn js_str(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}
