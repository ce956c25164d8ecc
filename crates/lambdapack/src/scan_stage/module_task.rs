use std::{path::Path, sync::Arc};

use arcstr::ArcStr;
use lambdapack_common::{
  ImportRecordIdx, ModuleId, ModuleIdx, ModuleLoaderMsg, ModuleType, NormalModule,
  NormalModuleTaskResult, RawImportRecord, ResolvedId,
};
use lambdapack_error::{BuildResult, Location};
use lambdapack_utils::{ecmascript::legitimize_identifier_name, path_ext::PathExt};
use oxc::span::Span;
use oxc_index::IndexVec;

use super::{
  loaders::{
    ecmascript::{create_ecma_view, source_type_for},
    json::create_json_view,
    CreateEcmaViewReturn, CreateModuleContext,
  },
  task_context::TaskContext,
};
use crate::utils::{
  load_source::load_source,
  resolve_id::{resolve_id, ImportSite},
};

/// The import that first reached a module, reported when the module can't be loaded.
pub struct ModuleTaskOwner {
  source: ArcStr,
  importer_id: ArcStr,
  importee_span: Span,
}

impl ModuleTaskOwner {
  pub fn new(source: ArcStr, importer_id: ArcStr, importee_span: Span) -> Self {
    ModuleTaskOwner { source, importer_id, importee_span }
  }

  fn location(&self) -> Location {
    Location::from_offset(self.importer_id.as_str(), &self.source, self.importee_span.start)
  }
}

pub struct ModuleTask {
  ctx: Arc<TaskContext>,
  idx: ModuleIdx,
  owner: Option<ModuleTaskOwner>,
  resolved_id: ResolvedId,
  is_user_defined_entry: bool,
}

impl ModuleTask {
  pub fn new(
    ctx: Arc<TaskContext>,
    idx: ModuleIdx,
    owner: Option<ModuleTaskOwner>,
    resolved_id: ResolvedId,
    is_user_defined_entry: bool,
  ) -> Self {
    Self { ctx, idx, owner, resolved_id, is_user_defined_entry }
  }

  pub async fn run(self) {
    let msg = match self.run_inner() {
      Ok(result) => ModuleLoaderMsg::NormalModuleDone(result),
      Err(errs) => ModuleLoaderMsg::BuildErrors(errs.into_vec()),
    };
    // The loader keeps the receiver alive until every spawned task has reported.
    let _ = self.ctx.tx.send(msg).await;
  }

  fn run_inner(&self) -> BuildResult<NormalModuleTaskResult> {
    let id = ModuleId::new(self.resolved_id.id.clone());
    let stable_id = id.stabilize(&self.ctx.options.cwd);
    let path = Path::new(self.resolved_id.id.as_str());

    let (source, module_type) = load_source(&self.ctx.fs, path, &stable_id).map_err(|err| {
      match &self.owner {
        Some(owner) => {
          err.context(format!("Could not load {stable_id} (imported by {})", owner.location()))
        }
        None => err,
      }
    })?;
    tracing::debug!(module = %stable_id, ?module_type, "loaded");

    let repr_name = legitimize_identifier_name(&path.representative_file_name()).into_owned();
    let ctx = CreateModuleContext {
      module_idx: self.idx,
      stable_id: &stable_id,
      repr_name: &repr_name,
      module_type,
      tree_shaking: self.ctx.options.tree_shaking,
    };

    let CreateEcmaViewReturn { ecma_view, symbols, raw_import_records, warnings } =
      match module_type {
        ModuleType::Json => create_json_view(&ctx, source)?,
        _ => create_ecma_view(&ctx, source.into(), source_type_for(path, module_type))?,
      };

    let resolved_deps =
      self.resolve_dependencies(&raw_import_records, path, &stable_id, &ecma_view.source)?;

    let module = NormalModule {
      idx: self.idx,
      is_user_defined_entry: self.is_user_defined_entry,
      id,
      stable_id,
      repr_name,
      module_type,
      ecma_view,
    };

    Ok(NormalModuleTaskResult {
      module: module.into(),
      symbols,
      resolved_deps,
      raw_import_records,
      warnings,
    })
  }

  /// Type-only imports are never resolved. Every failed resolution is reported, not just the first.
  fn resolve_dependencies(
    &self,
    dependencies: &IndexVec<ImportRecordIdx, RawImportRecord>,
    importer: &Path,
    stable_id: &str,
    source: &str,
  ) -> BuildResult<IndexVec<ImportRecordIdx, Option<ResolvedId>>> {
    let mut errors = vec![];
    let resolved = dependencies
      .iter()
      .map(|rec| {
        if rec.is_type_elided() {
          return None;
        }
        let site = ImportSite { importer, stable_id, source, offset: rec.span().start };
        match resolve_id(&self.ctx.resolver, &rec.specifier, rec.kind, &site) {
          Ok(resolved_id) => Some(resolved_id),
          Err(err) => {
            errors.push(err);
            None
          }
        }
      })
      .collect::<IndexVec<ImportRecordIdx, _>>();

    if !errors.is_empty() {
      Err(errors)?;
    }
    Ok(resolved)
  }
}
