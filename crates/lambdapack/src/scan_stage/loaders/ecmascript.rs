use std::path::Path;

use arcstr::ArcStr;
use lambdapack_common::{
  side_effects::DeterminedSideEffects, EcmaView, EcmaViewMeta, ExportsKind, ModuleType,
};
use lambdapack_ecmascript::EcmaCompiler;
use lambdapack_error::BuildResult;
use oxc::{semantic::SemanticBuilder, span::SourceType};
use oxc_index::IndexVec;

use super::{CreateEcmaViewReturn, CreateModuleContext};
use crate::scan_stage::ast_scanner::{AstScanResult, AstScanner};

/// `.cjs` files are scripts, everything else is parsed with the module goal.
pub fn source_type_for(path: &Path, module_type: ModuleType) -> SourceType {
  match module_type {
    ModuleType::Ts | ModuleType::Tsx => SourceType::ts(),
    _ if path.extension().is_some_and(|ext| ext == "cjs") => SourceType::cjs(),
    _ => SourceType::mjs(),
  }
}

pub fn create_ecma_view(
  ctx: &CreateModuleContext<'_>,
  source: ArcStr,
  source_type: SourceType,
) -> BuildResult<CreateEcmaViewReturn> {
  let ast = EcmaCompiler::parse(ctx.stable_id, source, source_type)?;
  let program = ast.program();

  let semantic_ret = SemanticBuilder::new().with_check_syntax_error(true).build(program);
  let warnings = semantic_ret
    .errors
    .iter()
    .map(|error| EcmaCompiler::to_diagnostic(ctx.stable_id, ast.source(), error).into())
    .collect::<Vec<anyhow::Error>>();
  let (symbols, scopes) = semantic_ret.semantic.into_symbol_table_and_scope_tree();

  let scanner = AstScanner::new(
    ctx.module_idx,
    &symbols,
    &scopes,
    ctx.repr_name,
    ctx.module_type,
    ctx.stable_id,
    ast.source(),
  );
  let AstScanResult {
    symbols: local_symbols,
    namespace_object_ref,
    default_export_ref,
    wrapper_ref,
    import_meta_ref,
    named_imports,
    named_exports,
    stmt_infos,
    import_records,
    top_level_await,
    import_meta,
    hashbang,
    directives,
    global_names,
    meta,
    errors,
  } = scanner.scan(program);

  if !errors.is_empty() {
    return Err(errors.into());
  }

  let exports_kind = if meta.contains(EcmaViewMeta::HAS_ESM_SYNTAX) {
    ExportsKind::Esm
  } else if meta.contains(EcmaViewMeta::USES_COMMONJS_EXPORTS) {
    ExportsKind::CommonJs
  } else {
    ExportsKind::None
  };

  let side_effects = if ctx.tree_shaking {
    DeterminedSideEffects::Analyzed(stmt_infos.iter().any(|stmt_info| stmt_info.side_effect))
  } else {
    DeterminedSideEffects::NoTreeshake
  };

  let ecma_view = EcmaView {
    source: ast.source().clone(),
    namespace_object_ref,
    default_export_ref,
    wrapper_ref,
    import_meta_ref,
    named_imports,
    named_exports,
    stmt_infos,
    import_records: IndexVec::default(),
    exports_kind,
    top_level_await,
    import_meta,
    hashbang,
    directives,
    global_names,
    side_effects,
    meta,
  };

  Ok(CreateEcmaViewReturn { ecma_view, symbols: local_symbols, raw_import_records: import_records, warnings })
}
