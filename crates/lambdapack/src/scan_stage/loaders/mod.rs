pub mod ecmascript;
pub mod json;

use lambdapack_common::{EcmaView, ImportRecordIdx, ModuleIdx, ModuleType, RawImportRecord, SymbolRefDbForModule};
use oxc_index::IndexVec;

pub struct CreateModuleContext<'a> {
  pub module_idx: ModuleIdx,
  pub stable_id: &'a str,
  /// Base of the facade names, e.g. `user` for `src/services/user.ts`.
  pub repr_name: &'a str,
  pub module_type: ModuleType,
  pub tree_shaking: bool,
}

pub struct CreateEcmaViewReturn {
  pub ecma_view: EcmaView,
  pub symbols: SymbolRefDbForModule,
  pub raw_import_records: IndexVec<ImportRecordIdx, RawImportRecord>,
  pub warnings: Vec<anyhow::Error>,
}
