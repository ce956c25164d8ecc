use arcstr::ArcStr;
use lambdapack_common::{Chunk, ModuleIdx, OutputFormat, SymbolRef};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{link_stage::LinkStageOutput, utils::renamer::Renamer};

/// Imported as `__createRequire` by `esm` chunks that still call `require`.
pub const CREATE_REQUIRE_BINDING: &str = "__createRequire";

pub fn deconflict_chunk_symbols(
  chunk: &mut Chunk,
  link_output: &LinkStageOutput,
  format: OutputFormat,
) {
  let modules = chunk
    .modules
    .iter()
    .filter_map(|idx| link_output.module_table[*idx].as_normal())
    .collect::<Vec<_>>();

  let wrapped_modules = modules
    .iter()
    .filter(|module| chunk.inclusion[module.idx].wrapped)
    .map(|module| module.idx)
    .collect::<FxHashSet<_>>();

  let referenced_in = collect_referencing_modules(chunk, link_output);
  let mut renamer = Renamer::new(&link_output.symbols, format, wrapped_modules);
  let add = |renamer: &mut Renamer, symbol_ref: SymbolRef| {
    let canonical_ref = link_output.symbols.canonical_ref_for(symbol_ref);
    let modules = referenced_in.get(&canonical_ref).map_or(&[][..], Vec::as_slice);
    renamer.add_symbol_in_root_scope(symbol_ref, modules);
  };

  // Global names should be reserved.
  modules.iter().flat_map(|module| module.global_names.iter()).for_each(|name| {
    renamer.reserve(ArcStr::clone(name));
  });
  if chunk.needs_create_require {
    renamer.reserve(CREATE_REQUIRE_BINDING.into());
  }

  let entry_meta = &link_output.metadata[chunk.entry_module];
  entry_meta.referenced_symbols_by_entry_point_chunk.iter().for_each(|symbol_ref| {
    add(&mut renamer, *symbol_ref);
  });
  entry_meta.export_alias_bindings.values().for_each(|symbol_ref| {
    add(&mut renamer, *symbol_ref);
  });

  // Starts with the entry module, so its names are the ones that survive.
  for module in modules.iter().rev() {
    let inclusion = &chunk.inclusion[module.idx];
    if inclusion.wrapped {
      // Everything else lives inside the wrapper's function scope.
      add(&mut renamer, module.wrapper_ref);
      continue;
    }
    if inclusion.namespace {
      add(&mut renamer, module.namespace_object_ref);
    }
    if inclusion.import_meta && !format.keep_esm_import_export_syntax() {
      add(&mut renamer, module.import_meta_ref);
    }
    module
      .stmt_infos
      .iter_enumerated()
      .filter(|(stmt_idx, _)| inclusion.is_stmt_included(*stmt_idx))
      .flat_map(|(_, stmt_info)| stmt_info.declared_symbols.iter().copied())
      .for_each(|symbol_ref| add(&mut renamer, symbol_ref));
  }

  chunk.canonical_names = renamer.into_canonical_names();
  tracing::debug!(chunk = %chunk.name, symbols = chunk.canonical_names.len(), "deconflicted");
}

/// Maps each canonical symbol to the modules whose rendered code mentions it. A property access
/// like `import_pkg.foo` mentions the namespace.
fn collect_referencing_modules(
  chunk: &Chunk,
  link_output: &LinkStageOutput,
) -> FxHashMap<SymbolRef, Vec<ModuleIdx>> {
  let symbols = &link_output.symbols;
  let mut referenced_in = FxHashMap::<SymbolRef, Vec<ModuleIdx>>::default();
  let mut record = |symbol_ref: SymbolRef, module: ModuleIdx| {
    let modules = referenced_in.entry(symbol_ref).or_default();
    if !modules.contains(&module) {
      modules.push(module);
    }
  };

  for module in chunk.modules.iter().filter_map(|idx| link_output.module_table[*idx].as_normal()) {
    let inclusion = &chunk.inclusion[module.idx];
    for (_, stmt_info) in
      module.stmt_infos.iter_enumerated().filter(|(stmt_idx, _)| inclusion.is_stmt_included(*stmt_idx))
    {
      for symbol_ref in &stmt_info.referenced_symbols {
        let canonical_ref = symbols.canonical_ref_for(*symbol_ref);
        record(canonical_ref, module.idx);
        if let Some(alias) = &symbols.get(canonical_ref).namespace_alias {
          record(symbols.canonical_ref_for(alias.namespace_ref), module.idx);
        }
      }
    }
  }
  referenced_in
}
