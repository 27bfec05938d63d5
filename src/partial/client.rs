//! Client phase: one hydration entry per hydrate group.

use super::HydrateGroup;
use crate::asset::{EmitReport, emit_client_entry};
use crate::compiler::{
    BundleOptions, ClientEntry, Compiler, HydrateEntry, HydrateImport, HydrateTarget,
    HydrateTrigger,
};
use crate::config::{EntryPattern, PartialConfig};
use crate::error::BuildError;

/// Hydration IR for one group.
pub fn hydrate_entry(group: &HydrateGroup, config: &PartialConfig) -> HydrateEntry {
    let modules = &group.has_partial_modules;
    let trigger = if config.use_intersection_observer {
        let observer = &config.intersection_observer;
        HydrateTrigger::Visible {
            root: observer.root.clone(),
            root_margin: observer.root_margin.clone(),
            thresholds: observer.thresholds.clone(),
        }
    } else {
        HydrateTrigger::Immediate
    };

    HydrateEntry {
        name: group.name.clone(),
        imports: modules
            .iter()
            .map(|module| HydrateImport {
                import_path: module.importer.clone(),
                binding_id: module.ph_id.clone(),
            })
            .collect(),
        targets: modules
            .iter()
            .map(|module| HydrateTarget {
                binding_id: module.ph_id.clone(),
                targets_id: module.targets_id.clone(),
                selector: module.selector(),
            })
            .collect(),
        trigger,
    }
}

/// Tag rules for hydrate bundles: each group's pages.
pub fn partial_patterns(groups: &[HydrateGroup]) -> Vec<EntryPattern> {
    groups
        .iter()
        .map(|group| EntryPattern::new(&group.name, group.insert_pages.clone()))
        .collect()
}

/// Bundle and write every group.
///
/// The first bundler rejection aborts; unwritable files are collected.
pub fn emit_hydrate_groups(
    compiler: &dyn Compiler,
    groups: &[HydrateGroup],
    config: &PartialConfig,
    options: &BundleOptions,
) -> Result<EmitReport, BuildError> {
    let mut report = EmitReport::default();
    for group in groups {
        let entry = ClientEntry::Hydrate(hydrate_entry(group, config));
        report.absorb(emit_client_entry(compiler, &entry, options)?);
    }
    Ok(report)
}
