use lambdapack_common::Module;
use lambdapack_error::{Diagnostic, DiagnosticKind};
use lambdapack_sourcemap::SourceJoiner;
use lambdapack_utils::{
  concat_string,
  ecmascript::{is_validate_identifier_name, property_access_str, quote_string},
};

use crate::{
  generate_stage::module_finalizer::RenderedModule,
  types::generator::GenerateContext,
  utils::chunk::deconflict_chunk_symbols::CREATE_REQUIRE_BINDING,
};

use super::append_module;

pub fn render_esm<'a>(ctx: &mut GenerateContext<'_>, modules: &'a [RenderedModule]) -> SourceJoiner<'a> {
  let mut source_joiner = SourceJoiner::new(ctx.options.sourcemap.is_some());

  if ctx.chunk.needs_create_require {
    source_joiner.append_source(concat_string!(
      "import { createRequire as ",
      CREATE_REQUIRE_BINDING,
      " } from \"node:module\";\nvar require = ",
      CREATE_REQUIRE_BINDING,
      "(import.meta.url);"
    ));
  }

  let hoisted_imports =
    modules.iter().flat_map(|module| module.hoisted_imports.iter().map(String::as_str)).collect::<Vec<_>>();
  if !hoisted_imports.is_empty() {
    source_joiner.append_source(hoisted_imports.join("\n"));
  }

  modules.iter().for_each(|module| append_module(&mut source_joiner, module));

  if let Some(exports) = render_chunk_exports(ctx) {
    source_joiner.append_source(exports);
  }
  warn_unexportable_star_exports(ctx);

  source_joiner
}

fn render_chunk_exports(ctx: &GenerateContext<'_>) -> Option<String> {
  let entry = ctx.entry_module()?;
  let meta = &ctx.link_output.metadata[entry.idx];
  if meta.wrapped {
    return Some(concat_string!(
      "export default ",
      ctx.finalized_string_pattern_for_symbol_ref(entry.wrapper_ref),
      "();"
    ));
  }

  let symbols = &ctx.link_output.symbols;
  let mut code = String::new();
  for (name, binding) in &meta.export_alias_bindings {
    let Some(symbol_ref) = meta.resolved_exports.get(name) else {
      continue;
    };
    let canonical_ref = symbols.canonical_ref_for(*symbol_ref);
    if let Some(alias) = &symbols.get(canonical_ref).namespace_alias {
      code.push_str(&concat_string!(
        "var ",
        ctx.finalized_string_pattern_for_symbol_ref(*binding),
        " = ",
        property_access_str(
          ctx.finalized_string_pattern_for_symbol_ref(alias.namespace_ref),
          &alias.property_name
        ),
        ";\n"
      ));
    }
  }

  let specifiers = meta
    .resolved_exports
    .iter()
    .map(|(name, symbol_ref)| {
      let local = meta.export_alias_bindings.get(name).copied().unwrap_or(*symbol_ref);
      let local = ctx.finalized_string_pattern_for_symbol_ref(local);
      if local == name.as_str() {
        local.to_string()
      } else if is_validate_identifier_name(name) {
        concat_string!(local, " as ", name)
      } else {
        concat_string!(local, " as ", quote_string(name))
      }
    })
    .collect::<Vec<_>>();
  if specifiers.is_empty() {
    return (!code.is_empty()).then(|| code.trim_end().to_string());
  }
  code.push_str(&concat_string!("export { ", specifiers.join(", "), " };"));
  Some(code)
}

/// Names behind `export * from "./legacy.cjs"` exist only at runtime, an ESM bundle can't list them
/// in its `export { .. }` clause.
fn warn_unexportable_star_exports(ctx: &mut GenerateContext<'_>) {
  let Some(entry) = ctx.entry_module() else {
    return;
  };
  let warnings = ctx.link_output.metadata[entry.idx]
    .dynamic_star_exports
    .iter()
    .filter_map(|rec_id| {
      let rec = &entry.import_records[*rec_id];
      let offset = rec.related_stmt_info_idx.map_or(0, |stmt_idx| entry.stmt_infos[stmt_idx].span.start);
      match &ctx.link_output.module_table[rec.resolved_module()?] {
        Module::Normal(importee) => Some(
          Diagnostic::new(
            DiagnosticKind::UnsupportedSyntax,
            format!(
              "Names re-exported with \"export * from\" \"{}\" are only known at runtime and are missing from the exports of the \"esm\" output",
              importee.stable_id
            ),
          )
          .at(&entry.stable_id, &entry.source, offset)
          .into(),
        ),
        Module::External(_) => None,
      }
    })
    .collect::<Vec<anyhow::Error>>();
  ctx.warnings.extend(warnings);
}
