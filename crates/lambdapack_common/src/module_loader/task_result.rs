use oxc_index::IndexVec;

use crate::{ImportRecordIdx, Module, RawImportRecord, ResolvedId, SymbolRefDbForModule};

pub struct NormalModuleTaskResult {
  pub module: Module,
  pub symbols: SymbolRefDbForModule,
  /// `None` for type-only imports, which are never resolved.
  pub resolved_deps: IndexVec<ImportRecordIdx, Option<ResolvedId>>,
  pub raw_import_records: IndexVec<ImportRecordIdx, RawImportRecord>,
  pub warnings: Vec<anyhow::Error>,
}
