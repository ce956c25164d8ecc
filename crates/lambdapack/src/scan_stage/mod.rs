pub mod ast_scanner;
pub mod loaders;
pub mod module_loader;

mod module_task;
mod runtime_module_task;
mod task_context;

use arcstr::ArcStr;
use lambdapack_error::{BuildResult, Diagnostic, DiagnosticKind};
use lambdapack_fs::OsFileSystem;
use module_loader::{ModuleLoader, ModuleLoaderOutput};

use crate::types::{SharedOptions, SharedResolver};

pub type ScanStageOutput = ModuleLoaderOutput;

pub struct ScanStage {
  fs: OsFileSystem,
  options: SharedOptions,
  resolver: SharedResolver,
}

impl ScanStage {
  pub fn new(fs: OsFileSystem, options: SharedOptions, resolver: SharedResolver) -> Self {
    Self { fs, options, resolver }
  }

  pub async fn scan(&self) -> BuildResult<ScanStageOutput> {
    let mut user_defined_entries = Vec::with_capacity(self.options.input.len());
    for input_item in &self.options.input {
      // Entries are bundled even when their package would be external.
      let resolved_id = self.resolver.resolve_entry(&input_item.import).map_err(|err| {
        Diagnostic::new(
          DiagnosticKind::UnresolvedImport,
          format!("Could not resolve entry \"{}\": {err}", input_item.import),
        )
      })?;
      user_defined_entries.push((input_item.name.as_deref().map(ArcStr::from), resolved_id));
    }

    let module_loader =
      ModuleLoader::new(self.fs, SharedOptions::clone(&self.options), SharedResolver::clone(&self.resolver));
    module_loader.fetch_all_modules(user_defined_entries).await
  }
}
