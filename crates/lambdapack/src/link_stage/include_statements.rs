use lambdapack_common::{
  Chunk, EcmaViewMeta, EntryPoint, ImportKind, ImportRecordIdx, IndexModules, Module, ModuleIdx,
  ModuleInclusion, NormalModule, StmtInfoIdx, StmtInfos, StmtKind, SymbolRef, SymbolRefDb,
  side_effects::DeterminedSideEffects,
};
use oxc_index::IndexVec;

use crate::types::LinkingMetadataVec;

use super::LinkStage;

struct Context<'a> {
  module_table: &'a IndexModules,
  symbols: &'a SymbolRefDb,
  metadata: &'a LinkingMetadataVec,
  inclusion: &'a mut IndexVec<ModuleIdx, ModuleInclusion>,
  is_module_included_vec: &'a mut IndexVec<ModuleIdx, bool>,
  tree_shaking: bool,
  runtime_id: ModuleIdx,
}

/// if no export is used, and the module has no side effects, the module should not be included
fn include_module(ctx: &mut Context, module: &NormalModule) {
  if ctx.is_module_included_vec[module.idx] {
    return;
  }
  ctx.is_module_included_vec[module.idx] = true;

  if module.idx == ctx.runtime_id {
    // runtime module has no side effects and it's statements should be included
    // by other modules's references.
    return;
  }

  let is_wrapped = ctx.metadata[module.idx].wrapped;
  ctx.inclusion[module.idx].wrapped = is_wrapped;

  // CommonJS modules can't be shaken, anything may end up on `module.exports`.
  let keep_everything = !ctx.tree_shaking
    || module.is_commonjs()
    || matches!(module.side_effects, DeterminedSideEffects::NoTreeshake);

  // Skip the first statement, which is the namespace object. It should be included only if it is
  // used no matter tree shaking is enabled or not.
  module.stmt_infos.iter_enumerated().skip(1).for_each(|(stmt_info_id, stmt_info)| {
    if keep_everything || stmt_info.side_effect {
      include_statement(ctx, module, stmt_info_id);
    }
  });

  // Include imported modules for its side effects
  module
    .import_records
    .iter()
    .filter(|rec| matches!(rec.kind, ImportKind::Import))
    .filter_map(|rec| rec.resolved_module())
    .for_each(|dependency_idx| match &ctx.module_table[dependency_idx] {
      Module::Normal(importee) => {
        if !ctx.tree_shaking || importee.side_effects.has_side_effects() {
          include_module(ctx, importee);
        }
      }
      Module::External(_) => {}
    });
}

fn include_symbol(ctx: &mut Context, symbol_ref: SymbolRef) {
  let mut canonical_ref = ctx.symbols.canonical_ref_for(symbol_ref);
  let canonical_ref_symbol = ctx.symbols.get(canonical_ref);
  if let Some(namespace_alias) = &canonical_ref_symbol.namespace_alias {
    canonical_ref = namespace_alias.namespace_ref;
  }

  let mut include_symbol_impl = |symbol_ref: SymbolRef| {
    if let Module::Normal(module) = &ctx.module_table[symbol_ref.owner] {
      include_module(ctx, module);
      if symbol_ref == module.import_meta_ref {
        ctx.inclusion[module.idx].import_meta = true;
      }
      module.stmt_infos.declared_stmts_by_symbol(&symbol_ref).iter().copied().for_each(
        |stmt_info_id| {
          include_statement(ctx, module, stmt_info_id);
        },
      );
    }
  };

  // `symbol_ref` is symbol itself in current module
  include_symbol_impl(symbol_ref);
  // Skip if symbol_ref is the same as canonical_ref.
  if symbol_ref != canonical_ref {
    // `canonical_ref` is the symbol that imports from the other module.
    include_symbol_impl(canonical_ref);
  }
}

fn include_statement(ctx: &mut Context, module: &NormalModule, stmt_info_id: StmtInfoIdx) {
  let inclusion = &mut ctx.inclusion[module.idx];
  let Some(is_included) = inclusion.stmts.get_mut(stmt_info_id.index()) else {
    return;
  };

  if *is_included {
    return;
  }

  // include the statement itself
  *is_included = true;

  let stmt_info = &module.stmt_infos[stmt_info_id];
  if stmt_info.kind == StmtKind::Namespace {
    inclusion.namespace = true;
  }

  stmt_info.referenced_symbols.iter().for_each(|symbol_ref| {
    include_symbol(ctx, *symbol_ref);
  });
}

impl LinkStage<'_> {
  /// Tree shakes the module graph from one entry and collects what is left into its chunk.
  pub(super) fn include_statements(
    &self,
    entry: &EntryPoint,
    sorted_modules: &[ModuleIdx],
  ) -> Chunk {
    let mut inclusion = self
      .module_table
      .iter()
      .map(|module| ModuleInclusion {
        stmts: module
          .as_normal()
          .map_or_else(Vec::new, |module| vec![false; module.stmt_infos.len()]),
        ..ModuleInclusion::default()
      })
      .collect::<IndexVec<ModuleIdx, _>>();
    let mut is_module_included_vec = oxc_index::index_vec![false; self.module_table.len()];

    let context = &mut Context {
      module_table: &self.module_table,
      symbols: &self.symbols,
      metadata: &self.metadata,
      inclusion: &mut inclusion,
      is_module_included_vec: &mut is_module_included_vec,
      tree_shaking: self.options.tree_shaking,
      runtime_id: self.runtime_module.idx,
    };

    if let Module::Normal(module) = &self.module_table[entry.idx] {
      let meta = &self.metadata[entry.idx];
      meta.referenced_symbols_by_entry_point_chunk.iter().for_each(|symbol_ref| {
        include_symbol(context, *symbol_ref);
      });
      include_module(context, module);
    }

    let mut chunk = Chunk::new(entry.idx, entry.name.clone());
    chunk.modules = sorted_modules
      .iter()
      .copied()
      .filter(|idx| inclusion.get(*idx).is_some_and(ModuleInclusion::is_included))
      .collect();
    chunk.needs_create_require = self.options.format.keep_esm_import_export_syntax()
      && chunk.modules.iter().any(|idx| self.module_needs_require(*idx, &inclusion[*idx]));
    chunk.inclusion = inclusion;
    chunk
  }

  /// Whether any `require` survives in what is kept of the module.
  fn module_needs_require(&self, idx: ModuleIdx, inclusion: &ModuleInclusion) -> bool {
    let Some(module) = self.module_table[idx].as_normal() else {
      return false;
    };
    if module.meta.contains(EcmaViewMeta::USES_FREE_REQUIRE) {
      return true;
    }
    let is_external = |rec_id: ImportRecordIdx| {
      module.import_records[rec_id]
        .resolved_module()
        .is_some_and(|importee| self.module_table[importee].is_external())
    };

    let dynamic_external_star = inclusion.is_stmt_included(StmtInfos::NAMESPACE_STMT_IDX)
      && self.metadata[idx].dynamic_star_exports.iter().any(|rec_id| is_external(*rec_id));

    dynamic_external_star
      || module.stmt_infos.iter_enumerated().any(|(stmt_idx, stmt_info)| {
        inclusion.is_stmt_included(stmt_idx)
          && stmt_info.call_sites.iter().any(|call_site| {
            let rec = &module.import_records[call_site.record_id];
            matches!(rec.kind, ImportKind::Require) && is_external(call_site.record_id)
          })
      })
  }
}
