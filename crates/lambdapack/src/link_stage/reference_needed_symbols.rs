use lambdapack_common::{
  ImportKind, ImportRecordIdx, ImportRecordMeta, Module, ModuleType, NormalModule, StmtInfoIdx,
  StmtKind, SymbolRef, side_effects::DeterminedSideEffects,
};
use lambdapack_utils::rayon::{IntoParallelRefIterator, ParallelIterator};

use super::LinkStage;

/// What rendering an import statement or a `require`/`import()` call needs besides the symbols
/// the statement already references.
#[derive(Debug, Default)]
struct StmtPatch {
  declared: Vec<SymbolRef>,
  referenced: Vec<SymbolRef>,
  side_effect: bool,
}

impl StmtPatch {
  fn is_empty(&self) -> bool {
    self.declared.is_empty() && self.referenced.is_empty() && !self.side_effect
  }
}

struct RuntimeHelpers {
  to_esm: SymbolRef,
  to_common_js: SymbolRef,
}

impl LinkStage<'_> {
  pub(super) fn reference_needed_symbols(&mut self) {
    let helpers = RuntimeHelpers {
      to_esm: self.runtime_module.resolve_symbol("__toESM"),
      to_common_js: self.runtime_module.resolve_symbol("__toCommonJS"),
    };
    let runtime_idx = self.runtime_module.idx;

    let patches = self
      .module_table
      .par_iter()
      .filter_map(Module::as_normal)
      .filter(|module| module.idx != runtime_idx)
      .map(|importer| {
        let patches = importer
          .stmt_infos
          .iter_enumerated()
          .filter_map(|(stmt_idx, stmt_info)| {
            let mut patch = StmtPatch::default();
            if let StmtKind::Import(rec_id) | StmtKind::ReExport(rec_id) = stmt_info.kind {
              self.reference_import_statement(importer, rec_id, &helpers, &mut patch);
            }
            for call_site in &stmt_info.call_sites {
              self.reference_call_site(importer, call_site.record_id, &helpers, &mut patch);
            }
            (!patch.is_empty()).then_some((stmt_idx, patch))
          })
          .collect::<Vec<(StmtInfoIdx, StmtPatch)>>();
        (importer.idx, patches)
      })
      .collect::<Vec<_>>();

    for (module_idx, patches) in patches {
      let Some(module) = self.module_table[module_idx].as_normal_mut() else {
        continue;
      };
      for (stmt_idx, patch) in patches {
        for symbol_ref in patch.declared {
          module.stmt_infos.declare_symbol_for_stmt(stmt_idx, symbol_ref);
        }
        let stmt_info = &mut module.stmt_infos[stmt_idx];
        stmt_info.referenced_symbols.extend(patch.referenced);
        if patch.side_effect {
          stmt_info.side_effect = true;
          if matches!(module.ecma_view.side_effects, DeterminedSideEffects::Analyzed(false)) {
            module.ecma_view.side_effects = DeterminedSideEffects::Analyzed(true);
          }
        }
      }
    }
  }

  /// `import`/`export ... from` an external or CommonJS module turns into a `require` that binds
  /// the namespace of the import record.
  fn reference_import_statement(
    &self,
    importer: &NormalModule,
    rec_id: ImportRecordIdx,
    helpers: &RuntimeHelpers,
    patch: &mut StmtPatch,
  ) {
    let rec = &importer.import_records[rec_id];
    let Some(importee_idx) = rec.resolved_module() else {
      return;
    };

    if rec.is_export_star() {
      if self.metadata[importer.idx].dynamic_star_exports.contains(&rec_id) {
        // Copied onto the namespace object at runtime.
        patch.side_effect = true;
        patch.referenced.push(importer.namespace_object_ref);
      }
      return;
    }

    let is_plain_import = rec.meta.contains(ImportRecordMeta::IS_PLAIN_IMPORT);
    match &self.module_table[importee_idx] {
      Module::External(_) => {
        patch.side_effect = true;
        if !is_plain_import {
          patch.declared.push(rec.namespace_ref);
          let needs_interop = rec
            .meta
            .intersects(ImportRecordMeta::CONTAINS_IMPORT_DEFAULT | ImportRecordMeta::CONTAINS_IMPORT_STAR);
          if needs_interop && !self.options.format.keep_esm_import_export_syntax() {
            patch.referenced.push(helpers.to_esm);
          }
        }
      }
      Module::Normal(importee) if self.metadata[importee_idx].wrapped => {
        patch.side_effect = true;
        patch.referenced.push(importee.wrapper_ref);
        if !is_plain_import {
          patch.declared.push(rec.namespace_ref);
          patch.referenced.push(helpers.to_esm);
        }
      }
      Module::Normal(_) => {}
    }
  }

  fn reference_call_site(
    &self,
    importer: &NormalModule,
    rec_id: ImportRecordIdx,
    helpers: &RuntimeHelpers,
    patch: &mut StmtPatch,
  ) {
    let rec = &importer.import_records[rec_id];
    let Some(Module::Normal(importee)) = rec.resolved_module().map(|idx| &self.module_table[idx])
    else {
      // `require("fs")` and `import("fs")` of externals stay as written.
      return;
    };
    let wrapped = self.metadata[importee.idx].wrapped;

    match rec.kind {
      ImportKind::Require if wrapped => patch.referenced.push(importee.wrapper_ref),
      ImportKind::Require if importee.module_type == ModuleType::Json => {
        patch.referenced.push(importee.default_export_ref);
      }
      ImportKind::Require => {
        patch.referenced.extend([importee.namespace_object_ref, helpers.to_common_js]);
      }
      ImportKind::DynamicImport if wrapped => {
        patch.referenced.extend([importee.wrapper_ref, helpers.to_esm]);
      }
      ImportKind::DynamicImport => patch.referenced.push(importee.namespace_object_ref),
      ImportKind::Import => {}
    }
  }
}
