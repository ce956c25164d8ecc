use std::{collections::hash_map::Entry, path::Path, sync::Arc};

use arcstr::ArcStr;
use lambdapack_common::{
  EntryPoint, ExternalModule, IndexModules, Module, ModuleIdx, ModuleLoaderMsg,
  NormalModuleTaskResult, ResolvedId, RuntimeModuleBrief, RuntimeModuleTaskResult, SymbolRefDb,
  SymbolRefDbForModule, RUNTIME_MODULE_ID,
};
use lambdapack_error::BuildResult;
use lambdapack_fs::OsFileSystem;
use oxc_index::IndexVec;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc::Receiver;

use super::{
  module_task::{ModuleTask, ModuleTaskOwner},
  runtime_module_task::RuntimeModuleTask,
  task_context::TaskContext,
};
use crate::types::{SharedOptions, SharedResolver};

pub struct IntermediateNormalModules {
  pub modules: IndexVec<ModuleIdx, Option<Module>>,
  pub symbols: IndexVec<ModuleIdx, Option<SymbolRefDbForModule>>,
}

impl IntermediateNormalModules {
  pub fn new() -> Self {
    Self { modules: IndexVec::new(), symbols: IndexVec::new() }
  }

  pub fn alloc_module_idx(&mut self) -> ModuleIdx {
    self.symbols.push(None);
    self.modules.push(None)
  }
}

pub struct ModuleLoader {
  rx: Receiver<ModuleLoaderMsg>,
  remaining: u32,
  shared_context: Arc<TaskContext>,
  runtime_idx: ModuleIdx,
  inm: IntermediateNormalModules,
  visited: FxHashMap<ArcStr, ModuleIdx>,
}

#[derive(Debug)]
pub struct ModuleLoaderOutput {
  // Stored all modules
  pub module_table: IndexModules,
  pub symbols: SymbolRefDb,
  pub entry_points: Vec<EntryPoint>,
  pub runtime_module: RuntimeModuleBrief,
  pub warnings: Vec<anyhow::Error>,
}

impl ModuleLoader {
  pub fn new(fs: OsFileSystem, options: SharedOptions, resolver: SharedResolver) -> Self {
    // 1024 should be enough for most cases
    // over 1024 pending tasks are insane
    let (tx, rx) = tokio::sync::mpsc::channel(1024);

    let mut inm = IntermediateNormalModules::new();
    let runtime_idx = inm.alloc_module_idx();
    let visited = FxHashMap::from_iter([(RUNTIME_MODULE_ID.into(), runtime_idx)]);

    let task = RuntimeModuleTask::new(runtime_idx, tx.clone(), &options.cwd);
    let shared_context = Arc::new(TaskContext { fs, resolver, options, tx });

    // task is sync, but execution time is too short at the moment
    // so we are using spawn instead of spawn_blocking here to avoid an additional blocking thread creation within tokio
    tokio::spawn(async { task.run() });

    Self { rx, remaining: 1, shared_context, runtime_idx, inm, visited }
  }

  pub async fn fetch_all_modules(
    mut self,
    user_defined_entries: Vec<(Option<ArcStr>, ResolvedId)>,
  ) -> BuildResult<ModuleLoaderOutput> {
    let entries_count = user_defined_entries.len() + /* runtime */ 1;
    self.inm.modules.reserve(entries_count);
    self.inm.symbols.reserve(entries_count);

    let entry_points = user_defined_entries
      .into_iter()
      .map(|(name, info)| {
        let name = name.unwrap_or_else(|| entry_name_of(&info.id));
        let idx = self.try_spawn_new_task(info, None, true);
        EntryPoint { idx, name }
      })
      .collect::<Vec<_>>();

    let mut errors: Vec<anyhow::Error> = vec![];
    let mut warnings: Vec<anyhow::Error> = vec![];
    let mut runtime_module: Option<RuntimeModuleBrief> = None;

    while self.remaining > 0 {
      let Some(msg) = self.rx.recv().await else {
        break;
      };

      match msg {
        ModuleLoaderMsg::NormalModuleDone(task_result) => {
          let NormalModuleTaskResult {
            mut module,
            symbols,
            resolved_deps,
            raw_import_records,
            warnings: task_result_warnings,
          } = task_result;
          warnings.extend(task_result_warnings);

          let importer_id = ArcStr::from(module.stable_id());
          let source = module.as_normal().map(|normal| normal.source.clone()).unwrap_or_default();

          let mut import_records = IndexVec::with_capacity(raw_import_records.len());
          for (raw_rec, info) in raw_import_records.into_iter().zip(resolved_deps) {
            let resolved = info.map(|info| {
              let owner = ModuleTaskOwner::new(source.clone(), importer_id.clone(), raw_rec.span());
              self.try_spawn_new_task(info, Some(owner), false)
            });
            import_records.push(raw_rec.into_resolved(resolved));
          }

          let module_idx = module.idx();
          if let Some(normal) = module.as_normal_mut() {
            normal.import_records = import_records;
          }
          self.inm.symbols[module_idx] = Some(symbols);
          self.inm.modules[module_idx] = Some(module);
          self.remaining -= 1;
        }
        ModuleLoaderMsg::RuntimeModuleDone(task_result) => {
          let RuntimeModuleTaskResult { module, local_symbol_ref_db, runtime } = task_result;
          runtime_module = Some(runtime);
          self.inm.symbols[self.runtime_idx] = Some(local_symbol_ref_db);
          self.inm.modules[self.runtime_idx] = Some(module.into());
          self.remaining -= 1;
        }
        ModuleLoaderMsg::BuildErrors(e) => {
          errors.extend(e);
          self.remaining -= 1;
        }
      }
    }

    if !errors.is_empty() {
      Err(errors)?;
    }

    let module_table = self
      .inm
      .modules
      .into_iter()
      .map(|module| module.ok_or_else(|| anyhow::anyhow!("Module tasks didn't complete as expected")))
      .collect::<anyhow::Result<IndexModules>>()?;
    let symbols = self
      .inm
      .symbols
      .into_iter()
      .map(|db| db.ok_or_else(|| anyhow::anyhow!("Module symbols are missing after scanning")))
      .collect::<anyhow::Result<IndexVec<ModuleIdx, _>>>()?;
    let runtime_module = runtime_module
      .ok_or_else(|| anyhow::anyhow!("Failed to find runtime module. This should not happen"))?;

    tracing::debug!(modules = module_table.len(), entries = entry_points.len(), "module graph loaded");

    Ok(ModuleLoaderOutput {
      module_table,
      symbols: SymbolRefDb::new(symbols),
      entry_points,
      runtime_module,
      warnings,
    })
  }

  fn try_spawn_new_task(
    &mut self,
    resolved_id: ResolvedId,
    owner: Option<ModuleTaskOwner>,
    is_user_defined_entry: bool,
  ) -> ModuleIdx {
    match self.visited.entry(resolved_id.id.clone()) {
      Entry::Occupied(visited) => *visited.get(),
      Entry::Vacant(not_visited) => {
        let idx = self.inm.alloc_module_idx();

        if resolved_id.is_external {
          self.inm.symbols[idx] = Some(SymbolRefDbForModule::new(idx));
          self.inm.modules[idx] = Some(ExternalModule::new(idx, resolved_id.id).into());
        } else {
          self.remaining += 1;

          let task = ModuleTask::new(
            Arc::clone(&self.shared_context),
            idx,
            owner,
            resolved_id,
            is_user_defined_entry,
          );

          tokio::spawn(task.run());
        }

        *not_visited.insert(idx)
      }
    }
  }
}

/// `[name]` of an entry, the file name without its extension.
fn entry_name_of(id: &str) -> ArcStr {
  let path = Path::new(id);
  path.file_stem().map_or_else(|| ArcStr::from(id), |stem| stem.to_string_lossy().as_ref().into())
}

#[test]
fn entry_name_drops_the_extension() {
  assert_eq!(entry_name_of("/app/src/handlers/ping.ts").as_str(), "ping");
  assert_eq!(entry_name_of("/app/src/handlers/index.ts").as_str(), "index");
}
