use arcstr::ArcStr;
use lambdapack_common::{
  side_effects::DeterminedSideEffects, EcmaView, EcmaViewMeta, ExportsKind, LocalExport, StmtInfo,
  StmtInfos, StmtKind, SymbolRefDbForModule,
};
use lambdapack_error::{BuildResult, Diagnostic, DiagnosticKind, Location};
use lambdapack_utils::indexmap::FxIndexMap;
use oxc::span::Span;
use oxc_index::IndexVec;
use rustc_hash::FxHashSet;

use super::{CreateEcmaViewReturn, CreateModuleContext};
use crate::scan_stage::ast_scanner::create_module_facades;

/// A JSON file becomes a module with a single `default` export holding the parsed value. Named
/// imports read properties off it.
pub fn create_json_view(ctx: &CreateModuleContext<'_>, source: String) -> BuildResult<CreateEcmaViewReturn> {
  if let Err(err) = serde_json::from_str::<serde_json::Value>(&source) {
    let line_text = source.lines().nth(err.line().saturating_sub(1)).unwrap_or_default();
    Err(Diagnostic::new(DiagnosticKind::ParseError, format!("Invalid JSON: {err}")).with_location(
      Location {
        path: ctx.stable_id.to_string(),
        line: err.line(),
        column: err.column(),
        line_text: line_text.to_string(),
      },
    ))?;
  }

  let mut symbols = SymbolRefDbForModule::new(ctx.module_idx);
  let [namespace_object_ref, default_export_ref, wrapper_ref, import_meta_ref] =
    create_module_facades(&mut symbols, ctx.repr_name);

  let mut stmt_infos = StmtInfos::new();
  stmt_infos.add_stmt_info(StmtInfo {
    kind: StmtKind::Namespace,
    declared_symbols: vec![namespace_object_ref],
    ..StmtInfo::default()
  });
  let data_span = Span::new(0, u32::try_from(source.len()).unwrap_or(u32::MAX));
  stmt_infos.add_stmt_info(StmtInfo {
    span: data_span,
    kind: StmtKind::JsonData,
    declared_symbols: vec![default_export_ref],
    ..StmtInfo::default()
  });

  let mut named_exports = FxIndexMap::default();
  named_exports
    .insert(ArcStr::from("default"), LocalExport { span: data_span, referenced: default_export_ref });

  let side_effects = if ctx.tree_shaking {
    DeterminedSideEffects::Analyzed(false)
  } else {
    DeterminedSideEffects::NoTreeshake
  };

  let ecma_view = EcmaView {
    source: source.into(),
    namespace_object_ref,
    default_export_ref,
    wrapper_ref,
    import_meta_ref,
    named_imports: FxIndexMap::default(),
    named_exports,
    stmt_infos,
    import_records: IndexVec::default(),
    exports_kind: ExportsKind::Esm,
    top_level_await: None,
    import_meta: None,
    hashbang: None,
    directives: Vec::new(),
    global_names: FxHashSet::default(),
    side_effects,
    meta: EcmaViewMeta::empty(),
  };

  Ok(CreateEcmaViewReturn {
    ecma_view,
    symbols,
    raw_import_records: IndexVec::default(),
    warnings: Vec::new(),
  })
}

#[cfg(test)]
mod tests {
  use lambdapack_common::{ModuleIdx, ModuleType};

  use super::*;

  fn ctx() -> CreateModuleContext<'static> {
    CreateModuleContext {
      module_idx: ModuleIdx::from_usize(1),
      stable_id: "src/data/users.json",
      repr_name: "users",
      module_type: ModuleType::Json,
      tree_shaking: true,
    }
  }

  #[test]
  fn exports_the_document_as_default() {
    let ret = create_json_view(&ctx(), r#"{ "admins": ["ada"] }"#.to_string()).unwrap();
    assert_eq!(ret.ecma_view.named_exports.keys().map(ArcStr::as_str).collect::<Vec<_>>(), vec!["default"]);
    assert_eq!(ret.ecma_view.stmt_infos.len(), 2);
    assert!(!ret.ecma_view.side_effects.has_side_effects());
  }

  #[test]
  fn reports_invalid_json_with_a_location() {
    let err = create_json_view(&ctx(), "{\n  \"a\": ,\n}".to_string()).err().unwrap();
    let message = err.to_string();
    assert!(message.contains("[PARSE_ERROR] Invalid JSON"), "{message}");
    assert!(message.contains("src/data/users.json:2:"), "{message}");
  }
}
