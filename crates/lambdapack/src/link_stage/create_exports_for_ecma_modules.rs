use arcstr::ArcStr;
use lambdapack_common::{Module, SymbolRef};
use lambdapack_utils::{
  ecmascript::legitimize_identifier_name,
  indexmap::FxIndexMap,
  rayon::{IntoParallelRefIterator, ParallelIterator},
};

use super::LinkStage;

impl LinkStage<'_> {
  /// The namespace statement of a module builds `foo_exports` from its resolved exports:
  /// ```js
  /// var foo_exports = {};
  /// __export(foo_exports, {
  ///   handler: () => handler
  /// });
  /// ```
  /// Including it pulls in every exported declaration.
  pub(super) fn create_exports_for_ecma_modules(&mut self) {
    let export_fn = self.runtime_module.resolve_symbol("__export");
    let re_export_fn = self.runtime_module.resolve_symbol("__reExport");
    let to_esm_fn = self.runtime_module.resolve_symbol("__toESM");
    let runtime_idx = self.runtime_module.idx;

    let namespace_references = self
      .module_table
      .par_iter()
      .filter_map(Module::as_normal)
      .filter(|module| module.idx != runtime_idx)
      .map(|module| {
        let meta = &self.metadata[module.idx];
        let mut referenced = meta.resolved_exports.values().copied().collect::<Vec<_>>();
        if !referenced.is_empty() {
          referenced.push(export_fn);
        }
        for rec_id in &meta.dynamic_star_exports {
          referenced.push(re_export_fn);
          let importee =
            module.import_records[*rec_id].resolved_module().map(|idx| &self.module_table[idx]);
          match importee {
            Some(Module::Normal(importee)) if self.metadata[importee.idx].wrapped => {
              referenced.extend([importee.wrapper_ref, to_esm_fn]);
            }
            Some(Module::Normal(importee)) => referenced.push(importee.namespace_object_ref),
            Some(Module::External(_)) | None => {}
          }
        }
        (module.idx, referenced)
      })
      .collect::<Vec<_>>();

    for (module_idx, referenced) in namespace_references {
      if let Some(module) = self.module_table[module_idx].as_normal_mut() {
        module.stmt_infos.namespace_stmt_mut().referenced_symbols.extend(referenced);
      }
    }

    self.create_entry_exports();
  }

  /// What the bundle of each entry hands to its caller:
  /// - `cjs`: `module.exports = __toCommonJS(ping_exports)` for ESM, `module.exports = require_ping()`
  ///   for a wrapped CommonJS entry.
  /// - `esm`: an `export { .. }` clause, or `export default require_ping()`.
  fn create_entry_exports(&mut self) {
    let to_common_js_fn = self.runtime_module.resolve_symbol("__toCommonJS");
    let keep_esm_syntax = self.options.format.keep_esm_import_export_syntax();

    for entry in &self.entry_points {
      let Module::Normal(module) = &self.module_table[entry.idx] else {
        continue;
      };
      let meta = &self.metadata[entry.idx];

      let mut referenced: Vec<SymbolRef> = vec![];
      let mut aliased: Vec<ArcStr> = vec![];
      if meta.wrapped {
        referenced.push(module.wrapper_ref);
      } else if module.is_commonjs() {
        // Rendered as is, `module.exports` is already in place.
      } else if keep_esm_syntax {
        for (name, symbol) in &meta.resolved_exports {
          referenced.push(*symbol);
          let canonical = self.symbols.canonical_ref_for(*symbol);
          if self.symbols.get(canonical).namespace_alias.is_some() {
            aliased.push(name.clone());
          }
        }
      } else {
        referenced.extend([module.namespace_object_ref, to_common_js_fn]);
      }

      let export_alias_bindings = aliased
        .into_iter()
        .map(|name| {
          let binding = self.symbols.create_facade_root_symbol_ref(
            entry.idx,
            legitimize_identifier_name(&name).as_ref().into(),
          );
          (name, binding)
        })
        .collect::<FxIndexMap<_, _>>();

      let meta = &mut self.metadata[entry.idx];
      meta.referenced_symbols_by_entry_point_chunk = referenced;
      meta.export_alias_bindings = export_alias_bindings;
      tracing::trace!(entry = %entry.name, exports = meta.resolved_exports.len(), "entry exports created");
    }
  }
}
