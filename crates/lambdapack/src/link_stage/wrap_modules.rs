use lambdapack_common::{IndexModules, Module, ModuleIdx};
use oxc_index::IndexVec;
use rustc_hash::FxHashSet;

use crate::types::LinkingMetadataVec;

use super::LinkStage;

fn has_dynamic_exports_due_to_export_star(
  target: ModuleIdx,
  module_table: &IndexModules,
  metadata: &mut LinkingMetadataVec,
  visited_modules: &mut IndexVec<ModuleIdx, bool>,
) -> bool {
  let Some(module) = module_table[target].as_normal() else {
    return true;
  };
  if metadata[target].wrapped {
    return true;
  }

  if visited_modules[target] {
    return metadata[target].has_dynamic_exports();
  }
  visited_modules[target] = true;

  let dynamic_star_exports = module
    .star_export_records()
    .filter(|rec_id| {
      let Some(importee_id) = module.import_records[*rec_id].resolved_module() else {
        return false;
      };
      target != importee_id
        && has_dynamic_exports_due_to_export_star(importee_id, module_table, metadata, visited_modules)
    })
    .collect::<Vec<_>>();

  let has_dynamic_exports = !dynamic_star_exports.is_empty();
  metadata[target].dynamic_star_exports = dynamic_star_exports;
  has_dynamic_exports
}

impl LinkStage<'_> {
  /// Decides which CommonJS modules get a `__commonJS` wrapper, then finds the modules whose
  /// export names are only known at runtime because of `export * from` a CommonJS or external
  /// module.
  pub(super) fn wrap_modules(&mut self) {
    let entries = self.entry_points.iter().map(|entry| entry.idx).collect::<FxHashSet<_>>();
    let mut loaded_by_other_modules = FxHashSet::default();
    for module in self.module_table.iter().filter_map(Module::as_normal) {
      loaded_by_other_modules.extend(
        module
          .import_records
          .iter()
          .filter_map(|rec| rec.resolved_module())
          .filter(|importee| *importee != module.idx),
      );
    }

    let keep_esm_syntax = self.options.format.keep_esm_import_export_syntax();
    for module in self.module_table.iter().filter_map(Module::as_normal) {
      // A CommonJS entry in the `cjs` format already is what the bundle has to be.
      let is_bare_entry = entries.contains(&module.idx)
        && !loaded_by_other_modules.contains(&module.idx)
        && !keep_esm_syntax;
      if module.is_commonjs() && !is_bare_entry {
        self.metadata[module.idx].wrapped = true;
      }
    }

    let mut visited_modules = oxc_index::index_vec![false; self.module_table.len()];
    for module in self.module_table.iter().filter_map(Module::as_normal) {
      if module.meta.has_star_export() {
        has_dynamic_exports_due_to_export_star(
          module.idx,
          &self.module_table,
          &mut self.metadata,
          &mut visited_modules,
        );
      }
    }
  }
}
