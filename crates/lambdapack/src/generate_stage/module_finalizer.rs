use std::{path::Path, sync::Arc};

use lambdapack_common::{
  EnumEdit, EnumMemberValue, ImportKind, ImportRecordIdx, ImportRecordMeta, Module, ModuleIdx,
  ModuleInclusion, ModuleType, NormalModule, OccurrenceKind, SourceEdit, StmtInfo, StmtInfoIdx,
  StmtInfos, StmtKind,
};
use lambdapack_sourcemap::SourceMapSource;
use lambdapack_utils::{
  concat_string,
  ecmascript::{property_access_str, property_key_str, quote_string},
  path_ext::PathExt,
};
use string_wizard::{MagicString, SourceMapOptions};

use crate::types::generator::GenerateContext;

pub struct RenderedModule {
  pub module_idx: ModuleIdx,
  /// `var foo_exports = {}; __export(foo_exports, { .. });`, placed by the chunk format.
  pub namespace: Option<String>,
  pub source: Option<SourceMapSource>,
  /// `esm` format only, `import * as ns from "pkg";` lifted to the top of the chunk.
  pub hoisted_imports: Vec<String>,
}

/// Renders the included part of one module: tree-shaken statements removed, import statements
/// turned into `require` calls, top level names replaced by their deconflicted form and
/// TypeScript syntax stripped.
pub fn render_module(ctx: &GenerateContext<'_>, module: &NormalModule) -> RenderedModule {
  let inclusion = &ctx.chunk.inclusion[module.idx];
  let namespace = inclusion.namespace.then(|| render_namespace(ctx, module));

  if module.module_type == ModuleType::Json {
    // The single data statement follows the namespace statement.
    let source = inclusion.is_stmt_included(StmtInfoIdx::from_usize(1)).then(|| {
      let name = ctx.finalized_string_pattern_for_symbol_ref(module.default_export_ref);
      SourceMapSource::new(concat_string!("var ", name, " = ", module.source.trim(), ";"), None)
    });
    return RenderedModule { module_idx: module.idx, namespace, source, hoisted_imports: vec![] };
  }

  let mut finalizer = ModuleFinalizer {
    ctx,
    module,
    inclusion,
    magic_string: MagicString::new(module.source.as_str()),
    hoisted_imports: vec![],
  };
  finalizer.render_body();
  if !ctx.options.format.keep_esm_import_export_syntax() && inclusion.import_meta {
    let name = ctx.finalized_string_pattern_for_symbol_ref(module.import_meta_ref);
    finalizer.magic_string.prepend(concat_string!("var ", name, " = {};\n"));
  }
  if inclusion.wrapped {
    finalizer.wrap_in_common_js();
  }

  let ModuleFinalizer { magic_string, hoisted_imports, .. } = finalizer;
  let mut code = magic_string.to_string();
  code.truncate(code.trim_end().len());
  let source = (!code.trim_start().is_empty()).then(|| {
    let sourcemap = (ctx.options.sourcemap.is_some() && !module.is_virtual()).then(|| {
      magic_string.source_map(SourceMapOptions {
        include_content: true,
        source: Arc::from(sourcemap_source_path(ctx, module)),
        ..Default::default()
      })
    });
    SourceMapSource::new(code, sourcemap)
  });

  RenderedModule { module_idx: module.idx, namespace, source, hoisted_imports }
}

/// The module path as seen from the directory the bundle is written to.
fn sourcemap_source_path(ctx: &GenerateContext<'_>, module: &NormalModule) -> String {
  let output_file = ctx.options.dir.join(ctx.preliminary_filename);
  let output_dir = output_file.parent().unwrap_or(&ctx.options.dir);
  Path::new(&*module.id).relative_slash(output_dir)
}

fn render_namespace(ctx: &GenerateContext<'_>, module: &NormalModule) -> String {
  let namespace_name = ctx.finalized_string_pattern_for_symbol_ref(module.namespace_object_ref);
  let resolved_exports = &ctx.link_output.metadata[module.idx].resolved_exports;
  let mut code = concat_string!("var ", namespace_name, " = {};");
  if resolved_exports.is_empty() {
    return code;
  }

  let symbols = &ctx.link_output.symbols;
  let getters = resolved_exports
    .iter()
    .map(|(exported, symbol_ref)| {
      let canonical_ref = symbols.canonical_ref_for(*symbol_ref);
      let value = match &symbols.get(canonical_ref).namespace_alias {
        Some(alias) => property_access_str(
          ctx.finalized_string_pattern_for_symbol_ref(alias.namespace_ref),
          &alias.property_name,
        ),
        None => ctx.finalized_string_pattern_for_symbol_ref(canonical_ref).to_string(),
      };
      concat_string!("  ", property_key_str(exported), ": () => ", value)
    })
    .collect::<Vec<_>>();

  code.push('\n');
  code.push_str(&concat_string!(
    ctx.finalized_runtime_helper("__export"),
    "(",
    namespace_name,
    ", {\n",
    getters.join(",\n"),
    "\n});"
  ));
  code
}

struct ModuleFinalizer<'a, 'ctx> {
  ctx: &'a GenerateContext<'ctx>,
  module: &'a NormalModule,
  inclusion: &'a ModuleInclusion,
  magic_string: MagicString<'a>,
  hoisted_imports: Vec<String>,
}

impl ModuleFinalizer<'_, '_> {
  fn render_body(&mut self) {
    let module = self.module;
    if let Some(hashbang) = module.hashbang {
      self.remove(hashbang.start, hashbang.end);
    }
    // The bundle brings its own `"use strict"`. CommonJS code keeps its prologue, which still
    // starts the wrapper's function body.
    if !module.is_commonjs() {
      for directive in &module.directives {
        self.remove(directive.start, directive.end);
      }
    }

    let mut prev_end =
      module.hashbang.iter().chain(module.directives.iter()).map(|span| span.end).max().unwrap_or(0);
    for (stmt_idx, stmt_info) in module.stmt_infos.iter_enumerated() {
      if stmt_idx == StmtInfos::NAMESPACE_STMT_IDX {
        continue;
      }
      let span = stmt_info.span;
      if self.inclusion.is_stmt_included(stmt_idx) && stmt_info.kind != StmtKind::Erased {
        self.render_stmt(stmt_info);
      } else {
        // Leading comments of a dropped statement go with it.
        self.remove(prev_end, span.end);
      }
      prev_end = span.end;
    }
  }

  fn render_stmt(&mut self, stmt_info: &StmtInfo) {
    let (ctx, module) = (self.ctx, self.module);
    let span = stmt_info.span;
    match stmt_info.kind {
      StmtKind::Import(rec_id) | StmtKind::ReExport(rec_id) => {
        let replacement = self.render_import_stmt(rec_id);
        match replacement {
          Some(code) => self.update(span.start, span.end, code),
          None => self.remove(span.start, span.end),
        }
        return;
      }
      StmtKind::ExportDecl { decl_start } => self.remove(span.start, decl_start),
      StmtKind::ExportDefaultExpr { expr_start } => {
        let name = ctx.finalized_string_pattern_for_symbol_ref(module.default_export_ref);
        self.update(span.start, expr_start, concat_string!("var ", name, " = "));
        if !module.source[..span.end as usize].ends_with(';') {
          self.magic_string.append_left(span.end as usize, ";");
        }
      }
      StmtKind::ExportDefaultDecl { decl_start, name_insert_at } => {
        self.remove(span.start, decl_start);
        if let Some(insert_at) = name_insert_at {
          let name = ctx.finalized_string_pattern_for_symbol_ref(module.default_export_ref);
          self.magic_string.append_left(insert_at as usize, concat_string!(" ", name));
        }
      }
      StmtKind::Normal | StmtKind::Namespace | StmtKind::Erased | StmtKind::JsonData => {}
    }

    self.render_occurrences(stmt_info);
    self.render_call_sites(stmt_info);
    self.render_edits(stmt_info);
  }

  /// `None` removes the statement.
  fn render_import_stmt(&mut self, rec_id: ImportRecordIdx) -> Option<String> {
    let (ctx, module) = (self.ctx, self.module);
    let rec = &module.import_records[rec_id];
    let importee_idx = rec.resolved_module()?;
    let importee = &ctx.link_output.module_table[importee_idx];

    if rec.is_export_star() {
      return self.render_dynamic_star_export(rec_id, importee);
    }

    let is_plain_import = rec.meta.contains(ImportRecordMeta::IS_PLAIN_IMPORT);
    let namespace_name = || ctx.finalized_string_pattern_for_symbol_ref(rec.namespace_ref);
    match importee {
      Module::External(external) => {
        let specifier = quote_string(&external.name);
        if ctx.options.format.keep_esm_import_export_syntax() {
          let import = if is_plain_import {
            concat_string!("import ", specifier, ";")
          } else {
            concat_string!("import * as ", namespace_name(), " from ", specifier, ";")
          };
          self.hoisted_imports.push(import);
          return None;
        }

        let require = concat_string!("require(", specifier, ")");
        if is_plain_import {
          return Some(concat_string!(require, ";"));
        }
        let needs_interop = rec
          .meta
          .intersects(ImportRecordMeta::CONTAINS_IMPORT_DEFAULT | ImportRecordMeta::CONTAINS_IMPORT_STAR);
        let value = if needs_interop {
          concat_string!(ctx.finalized_runtime_helper("__toESM"), "(", require, ")")
        } else {
          require
        };
        Some(concat_string!("var ", namespace_name(), " = ", value, ";"))
      }
      Module::Normal(importee) if ctx.is_wrapped(importee) => {
        let call =
          concat_string!(ctx.finalized_string_pattern_for_symbol_ref(importee.wrapper_ref), "()");
        if is_plain_import {
          return Some(concat_string!(call, ";"));
        }
        Some(concat_string!(
          "var ",
          namespace_name(),
          " = ",
          ctx.finalized_runtime_helper("__toESM"),
          "(",
          call,
          ");"
        ))
      }
      // Bound statically, the importee is already part of the bundle.
      Module::Normal(_) => None,
    }
  }

  /// `export * from` a module whose names are only known at runtime copies them onto the
  /// namespace object.
  fn render_dynamic_star_export(&mut self, rec_id: ImportRecordIdx, importee: &Module) -> Option<String> {
    let ctx = self.ctx;
    let module = self.module;
    if !ctx.link_output.metadata[module.idx].dynamic_star_exports.contains(&rec_id) {
      return None;
    }

    let is_entry = module.idx == ctx.chunk.entry_module;
    let is_esm_format = ctx.options.format.keep_esm_import_export_syntax();
    let target = match importee {
      Module::External(external) => {
        if is_entry && is_esm_format {
          self.hoisted_imports.push(concat_string!("export * from ", quote_string(&external.name), ";"));
        }
        concat_string!("require(", quote_string(&external.name), ")")
      }
      Module::Normal(importee) if ctx.is_wrapped(importee) => concat_string!(
        ctx.finalized_runtime_helper("__toESM"),
        "(",
        ctx.finalized_string_pattern_for_symbol_ref(importee.wrapper_ref),
        "())"
      ),
      Module::Normal(importee) => {
        ctx.finalized_string_pattern_for_symbol_ref(importee.namespace_object_ref).to_string()
      }
    };

    let namespace_name = ctx.finalized_string_pattern_for_symbol_ref(module.namespace_object_ref);
    // `module.exports` of a `cjs` entry was filled before this line runs.
    let second_target = if is_entry && !is_esm_format { ", module.exports" } else { "" };
    Some(concat_string!(
      ctx.finalized_runtime_helper("__reExport"),
      "(",
      namespace_name,
      ", ",
      target,
      second_target,
      ");"
    ))
  }

  fn render_occurrences(&mut self, stmt_info: &StmtInfo) {
    let (ctx, module) = (self.ctx, self.module);
    let symbols = &ctx.link_output.symbols;
    let source = module.source.as_str();

    for occurrence in &stmt_info.occurrences {
      let span = occurrence.span;
      let original = &source[span.start as usize..span.end as usize];

      if occurrence.kind == OccurrenceKind::ImportMeta {
        if !ctx.options.format.keep_esm_import_export_syntax() {
          let name = ctx.finalized_string_pattern_for_symbol_ref(occurrence.symbol);
          self.update(span.start, span.end, name.to_string());
        }
        continue;
      }

      let canonical_ref = symbols.canonical_ref_for(occurrence.symbol);
      let replacement = if let Some(alias) = &symbols.get(canonical_ref).namespace_alias {
        let access = property_access_str(
          ctx.finalized_string_pattern_for_symbol_ref(alias.namespace_ref),
          &alias.property_name,
        );
        match occurrence.kind {
          // Keeps `this` undefined, as it is for a call of an imported binding.
          OccurrenceKind::Callee => concat_string!("(0, ", access, ")"),
          OccurrenceKind::ShorthandProperty => concat_string!(original, ": ", access),
          _ => access,
        }
      } else {
        let name = ctx.finalized_string_pattern_for_symbol_ref(canonical_ref);
        if name == original {
          continue;
        }
        match occurrence.kind {
          OccurrenceKind::ShorthandProperty => concat_string!(original, ": ", name),
          _ => name.to_string(),
        }
      };
      self.update(span.start, span.end, replacement);
    }
  }

  fn render_call_sites(&mut self, stmt_info: &StmtInfo) {
    let (ctx, module) = (self.ctx, self.module);
    for call_site in &stmt_info.call_sites {
      let rec = &module.import_records[call_site.record_id];
      // `require` and `import()` of externals stay as written.
      let Some(importee) =
        rec.resolved_module().and_then(|idx| ctx.link_output.module_table[idx].as_normal())
      else {
        continue;
      };

      let is_wrapped = ctx.is_wrapped(importee);
      let wrapper_call =
        || concat_string!(ctx.finalized_string_pattern_for_symbol_ref(importee.wrapper_ref), "()");
      let namespace_name = || ctx.finalized_string_pattern_for_symbol_ref(importee.namespace_object_ref);
      let replacement = match rec.kind {
        ImportKind::Require if is_wrapped => wrapper_call(),
        ImportKind::Require if importee.module_type == ModuleType::Json => {
          ctx.finalized_string_pattern_for_symbol_ref(importee.default_export_ref).to_string()
        }
        ImportKind::Require => {
          concat_string!(ctx.finalized_runtime_helper("__toCommonJS"), "(", namespace_name(), ")")
        }
        ImportKind::DynamicImport if is_wrapped => concat_string!(
          "Promise.resolve().then(() => ",
          ctx.finalized_runtime_helper("__toESM"),
          "(",
          wrapper_call(),
          "))"
        ),
        ImportKind::DynamicImport => {
          concat_string!("Promise.resolve().then(() => ", namespace_name(), ")")
        }
        ImportKind::Import => continue,
      };
      self.update(call_site.span.start, call_site.span.end, replacement);
    }
  }

  fn render_edits(&mut self, stmt_info: &StmtInfo) {
    let mut edits = stmt_info.edits.iter().collect::<Vec<_>>();
    edits.sort_by_key(|edit| edit.start());
    for edit in edits {
      match edit {
        SourceEdit::Remove(span) => self.remove(span.start, span.end),
        SourceEdit::Replace(span, text) => self.update(span.start, span.end, text.to_string()),
        SourceEdit::Insert(at, text) => {
          self.magic_string.append_left(*at as usize, text.to_string());
        }
        SourceEdit::Enum(edit) => self.render_enum(edit),
      }
    }
  }

  /// ```js
  /// var Color = /* @__PURE__ */ ((Color) => {
  ///   Color[Color["Red"] = 0] = "Red";
  ///   Color["Hex"] = "#fff";
  ///   return Color;
  /// })(Color || {});
  /// ```
  /// Initializers stay where they are, only the text between them is replaced.
  fn render_enum(&mut self, edit: &EnumEdit) {
    let ctx = self.ctx;
    let inner = edit.name.as_str();
    let outer = match edit.symbol {
      Some(symbol_ref) => ctx.finalized_string_pattern_for_symbol_ref(symbol_ref),
      None => inner,
    };

    let mut pending = concat_string!("var ", outer, " = /* @__PURE__ */ ((", inner, ") => {\n");
    let mut gap_start = edit.span.start;
    for member in &edit.members {
      let key = quote_string(&member.name);
      match member.value {
        EnumMemberValue::Auto(value) => {
          let value = format_enum_value(value);
          pending.push_str(&concat_string!(
            "  ", inner, "[", inner, "[", key, "] = ", value, "] = ", key, ";\n"
          ));
        }
        EnumMemberValue::Initializer { span, is_string } => {
          if is_string {
            pending.push_str(&concat_string!("  ", inner, "[", key, "] = "));
          } else {
            pending.push_str(&concat_string!("  ", inner, "[", inner, "[", key, "] = "));
          }
          self.update(gap_start, span.start, std::mem::take(&mut pending));
          gap_start = span.end;
          if is_string {
            pending.push_str(";\n");
          } else {
            pending.push_str(&concat_string!("] = ", key, ";\n"));
          }
        }
      }
    }
    pending.push_str(&concat_string!("  return ", inner, ";\n})(", outer, " || {});"));
    self.update(gap_start, edit.span.end, pending);
  }

  fn wrap_in_common_js(&mut self) {
    let (ctx, module) = (self.ctx, self.module);
    let wrapper_name = ctx.finalized_string_pattern_for_symbol_ref(module.wrapper_ref);
    self.magic_string.prepend(concat_string!(
      "var ",
      wrapper_name,
      " = ",
      ctx.finalized_runtime_helper("__commonJS"),
      "({\n  ",
      quote_string(&module.stable_id),
      "(exports, module) {\n"
    ));
    self.magic_string.append("\n  }\n});");
  }

  fn remove(&mut self, start: u32, end: u32) {
    if start < end {
      self.magic_string.remove(start as usize, end as usize);
    }
  }

  fn update(&mut self, start: u32, end: u32, content: String) {
    if start < end {
      self.magic_string.update(start as usize, end as usize, content);
    } else {
      self.magic_string.append_left(start as usize, content);
    }
  }
}

/// Enum values are doubles, integral ones print without a fraction.
#[allow(clippy::cast_possible_truncation)]
fn format_enum_value(value: f64) -> String {
  if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
    return itoa::Buffer::new().format(value as i64).to_string();
  }
  value.to_string()
}

#[cfg(test)]
mod tests {
  use super::format_enum_value;

  #[test]
  fn enum_values_print_like_javascript_numbers() {
    assert_eq!(format_enum_value(0.0), "0");
    assert_eq!(format_enum_value(-3.0), "-3");
    assert_eq!(format_enum_value(16.0), "16");
    assert_eq!(format_enum_value(0.5), "0.5");
  }
}
