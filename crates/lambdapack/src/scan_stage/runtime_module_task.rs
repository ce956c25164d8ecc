use std::path::Path;

use lambdapack_common::{
  side_effects::DeterminedSideEffects, ExportsKind, ModuleId, ModuleIdx, ModuleLoaderMsg,
  ModuleType, NormalModule, RuntimeModuleBrief, RuntimeModuleTaskResult, RUNTIME_MODULE_ID,
};
use lambdapack_error::BuildResult;
use oxc::span::SourceType;
use tokio::sync::mpsc::Sender;

use super::loaders::{ecmascript::create_ecma_view, CreateEcmaViewReturn, CreateModuleContext};

pub struct RuntimeModuleTask {
  idx: ModuleIdx,
  tx: Sender<ModuleLoaderMsg>,
  cwd: Box<Path>,
}

impl RuntimeModuleTask {
  pub fn new(idx: ModuleIdx, tx: Sender<ModuleLoaderMsg>, cwd: &Path) -> Self {
    Self { idx, tx, cwd: cwd.into() }
  }

  pub fn run(self) {
    let msg = match self.run_inner() {
      Ok(result) => ModuleLoaderMsg::RuntimeModuleDone(result),
      Err(errs) => ModuleLoaderMsg::BuildErrors(errs.into_vec()),
    };
    let _ = self.tx.try_send(msg);
  }

  fn run_inner(&self) -> BuildResult<RuntimeModuleTaskResult> {
    let source = arcstr::literal!(include_str!("../runtime/index.js"));
    let id = ModuleId::new(RUNTIME_MODULE_ID);
    let stable_id = id.stabilize(&self.cwd);

    let ctx = CreateModuleContext {
      module_idx: self.idx,
      stable_id: &stable_id,
      repr_name: "runtime",
      module_type: ModuleType::Js,
      tree_shaking: true,
    };
    let CreateEcmaViewReturn { mut ecma_view, symbols, .. } =
      create_ecma_view(&ctx, source, SourceType::mjs())?;

    // Helpers are pulled in one by one through the symbols that use them.
    ecma_view.exports_kind = ExportsKind::Esm;
    ecma_view.side_effects = DeterminedSideEffects::Analyzed(false);

    let runtime = RuntimeModuleBrief::new(self.idx, &symbols);
    let module = NormalModule {
      idx: self.idx,
      is_user_defined_entry: false,
      id,
      stable_id,
      repr_name: "runtime".to_string(),
      module_type: ModuleType::Js,
      ecma_view,
    };

    Ok(RuntimeModuleTaskResult { module, local_symbol_ref_db: symbols, runtime })
  }
}
