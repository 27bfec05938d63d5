//! Module loading.
//!
//! Compiled modules on disk have this layout:
//!
//! ```text
//! +++
//! title = "Hello"      # optional TOML frontmatter
//! draft = false
//! +++
//! <main>{{ title }}</main>
//! ```
//!
//! A sibling `<stem>.data.json` becomes the module's data getter. An empty
//! body loads as the identity marker ([`Node::Fragment`]).

use super::{PageModule, Props, TemplateComponent, data_getter, Node};
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

const FRONTMATTER_DELIM: &str = "+++";
const DATA_SUFFIX: &str = "data.json";

/// Loads compiled modules and their source text.
pub trait ModuleLoader: Send + Sync {
    /// Load a renderable module.
    fn load(&self, path: &Path) -> Result<PageModule>;

    /// Raw source of a compiled module, used by the partial scan.
    fn source(&self, path: &Path) -> Result<String>;
}

/// Reads compiled modules from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsModuleLoader;

impl FsModuleLoader {
    /// Path of the data file that accompanies `module`.
    pub fn data_path(module: &Path) -> PathBuf {
        module.with_extension(DATA_SUFFIX)
    }
}

impl ModuleLoader for FsModuleLoader {
    fn load(&self, path: &Path) -> Result<PageModule> {
        let source = self.source(path)?;
        let (frontmatter, body) = split_frontmatter(&source)
            .with_context(|| format!("invalid frontmatter in {}", path.display()))?;

        let component = if body.trim().is_empty() {
            Node::Fragment
        } else {
            Node::component(TemplateComponent::new(body))
        };
        let mut module = PageModule::new(component);
        if let Some(frontmatter) = frontmatter {
            module = module.with_frontmatter(frontmatter);
        }

        let data = Self::data_path(path);
        if data.is_file() {
            module = module.with_data(data_getter(move || read_data(data.clone())));
        }
        Ok(module)
    }

    fn source(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("failed to read module {}", path.display()))
    }
}

async fn read_data(path: PathBuf) -> Result<Value> {
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Split `+++` TOML frontmatter from the module body.
fn split_frontmatter(source: &str) -> Result<(Option<Props>, &str)> {
    let Some(rest) = source
        .strip_prefix(FRONTMATTER_DELIM)
        .and_then(|rest| rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")))
    else {
        return Ok((None, source));
    };

    let Some(end) = rest
        .match_indices(FRONTMATTER_DELIM)
        .map(|(i, _)| i)
        .find(|&i| i == 0 || rest[..i].ends_with('\n'))
    else {
        bail!("missing closing `{FRONTMATTER_DELIM}`");
    };

    let table: toml::Table = toml::from_str(&rest[..end])?;
    let Value::Object(frontmatter) = serde_json::to_value(table)? else {
        bail!("frontmatter must be a table");
    };

    let body = &rest[end + FRONTMATTER_DELIM.len()..];
    let body = body
        .strip_prefix('\n')
        .or_else(|| body.strip_prefix("\r\n"))
        .unwrap_or(body);
    Ok((Some(frontmatter), body))
}
