//! In-memory module loader for tests.

use super::{ModuleLoader, PageModule};
use anyhow::{Result, bail};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

/// In-memory modules keyed by path.
#[derive(Default)]
pub struct MemoryLoader {
    modules: RwLock<FxHashMap<PathBuf, (PageModule, String)>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module with the source text the partial scan will see.
    pub fn insert(&self, path: impl Into<PathBuf>, module: PageModule, source: impl Into<String>) {
        self.modules.write().insert(path.into(), (module, source.into()));
    }
}

impl ModuleLoader for MemoryLoader {
    fn load(&self, path: &Path) -> Result<PageModule> {
        match self.modules.read().get(path) {
            Some((module, _)) => Ok(module.clone()),
            None => bail!("module not found: {}", path.display()),
        }
    }

    fn source(&self, path: &Path) -> Result<String> {
        match self.modules.read().get(path) {
            Some((_, source)) => Ok(source.clone()),
            None => bail!("module not found: {}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Node;

    #[test]
    fn test_memory_loader() {
        let loader = MemoryLoader::new();
        loader.insert("/p.html", PageModule::new(Node::Fragment), "PH_1");
        assert_eq!(loader.source(Path::new("/p.html")).unwrap(), "PH_1");
        assert!(loader.load(Path::new("/missing.html")).is_err());
    }
}
