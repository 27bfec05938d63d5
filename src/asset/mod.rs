//! Client assets: bundling and per-page tag injection.

mod tags;

pub use tags::{AssetTagObject, build_assets_tag_array, build_assets_tag_str};

use crate::compiler::{BundleOptions, BundleOutput, ClientEntry, Compiler, collect_all_files};
use crate::config::SiteConfig;
use crate::error::BuildError;
use std::fs;
use std::path::{Path, PathBuf};

const BUNDLE_EXTS: &[&str] = &["css", "js"];

/// Stylesheets and scripts under `build.src` that feed the shared bundle.
///
/// Pages, partials and partial client scripts are excluded.
pub fn collect_bundle_inputs(config: &SiteConfig) -> Vec<PathBuf> {
    let build = &config.build;
    collect_all_files(&build.src)
        .into_iter()
        .filter(|path| !path.starts_with(&build.pages) && !path.starts_with(&build.partials))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| BUNDLE_EXTS.contains(&ext))
        })
        .filter(|path| !path.to_string_lossy().ends_with(".client.js"))
        .collect()
}

/// Client entries for the configured named entries and the shared bundle.
pub fn client_entries(config: &SiteConfig) -> Vec<ClientEntry> {
    let mut entries: Vec<_> = config
        .assets
        .entries
        .iter()
        .map(|entry| ClientEntry::Asset {
            name: entry.name.clone(),
            inputs: vec![entry.input.clone()],
        })
        .collect();

    let inputs = collect_bundle_inputs(config);
    if !inputs.is_empty() {
        entries.push(ClientEntry::Asset {
            name: config.assets.bundle.out_name.clone(),
            inputs,
        });
    }
    entries
}

/// Client files written by one or more entries, and the ones that failed.
#[derive(Debug, Default)]
pub struct EmitReport {
    pub written: Vec<PathBuf>,
    pub errors: Vec<BuildError>,
}

impl EmitReport {
    pub fn absorb(&mut self, other: EmitReport) {
        self.written.extend(other.written);
        self.errors.extend(other.errors);
    }
}

/// Bundle `entry` and write every output file.
///
/// A bundler rejection is a [`BuildError::Compile`]; a file that cannot be
/// written is recorded and skipped.
pub fn emit_client_entry(
    compiler: &dyn Compiler,
    entry: &ClientEntry,
    options: &BundleOptions,
) -> Result<EmitReport, BuildError> {
    let outputs = compiler
        .bundle_for_client(entry, options)
        .map_err(BuildError::Compile)?;
    Ok(write_outputs(&outputs, &options.out_dir))
}

fn write_outputs(outputs: &[BundleOutput], out_dir: &Path) -> EmitReport {
    let mut report = EmitReport::default();
    if let Err(err) = fs::create_dir_all(out_dir) {
        report.errors.push(BuildError::Artifact {
            path: out_dir.to_path_buf(),
            source: anyhow::Error::new(err).context("failed to create the assets directory"),
        });
        return report;
    }

    for output in outputs {
        let path = out_dir.join(&output.file_name);
        match fs::write(&path, &output.contents) {
            Ok(()) => report.written.push(path),
            Err(source) => report.errors.push(BuildError::Write { path, source }),
        }
    }
    report
}
