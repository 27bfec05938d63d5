//! String phase: pre-render every partial once.

use super::PartialModule;
use crate::compiler::{Compiler, VirtualEntry, VirtualImport};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Artifact file name inside the partial temp directory.
pub const STRING_INITIAL: &str = "string-initial.json";

/// Attribute of the placeholder pages emit for a partial.
const PLACEHOLDER_ATTR: &str = "data-partial-hydration";

/// Pre-rendered markup of one partial, keyed by partial id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialString {
    pub id: String,
    pub html: String,
}

/// The persisted `string-initial.json` artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialStrings {
    pub items: Vec<PartialString>,
}

impl PartialStrings {
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("invalid {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Replace every `<div data-partial-hydration="ID"></div>` with the partial markup.
    pub fn replace_placeholders(&self, html: &str) -> String {
        self.items.iter().fold(html.to_string(), |acc, item| {
            let placeholder = format!(r#"<div {PLACEHOLDER_ATTR}="{}"></div>"#, item.id);
            if acc.contains(&placeholder) {
                acc.replace(&placeholder, &item.html)
            } else {
                acc
            }
        })
    }
}

/// One virtual import per partial, in numbering order.
pub fn virtual_entry(modules: &[PartialModule]) -> VirtualEntry {
    VirtualEntry {
        imports: modules
            .iter()
            .map(|module| VirtualImport {
                import_path: module.importer.clone(),
                binding_id: module.ph_id.clone(),
                export_id: module.html_id.clone(),
            })
            .collect(),
    }
}

/// Render every partial and wrap it in its hydration root element.
pub fn build_partial_strings(
    compiler: &dyn Compiler,
    modules: &[PartialModule],
) -> Result<PartialStrings> {
    if modules.is_empty() {
        return Ok(PartialStrings::default());
    }

    let rendered = compiler.render_virtual(&virtual_entry(modules))?;
    let items = modules
        .iter()
        .map(|module| {
            let html = rendered.get(&module.html_id).map_or("", String::as_str);
            PartialString {
                id: module.id.clone(),
                html: wrap(module, html),
            }
        })
        .collect();
    Ok(PartialStrings { items })
}

/// `<EL ATTR="PH_DOM_ID"[ style="STYLE"]>HTML</EL>`
fn wrap(module: &PartialModule, html: &str) -> String {
    let el = &module.root_dom_element;
    let style = if module.root_style_str.is_empty() {
        String::new()
    } else {
        format!(r#" style="{}""#, module.root_style_str)
    };
    format!(
        r#"<{el} {}="{}"{style}>{html}</{el}>"#,
        module.root_attr, module.ph_dom_id
    )
}
