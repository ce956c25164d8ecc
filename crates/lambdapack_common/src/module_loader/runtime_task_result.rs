use crate::{NormalModule, SymbolRefDbForModule};

use super::runtime_module_brief::RuntimeModuleBrief;

pub struct RuntimeModuleTaskResult {
  pub module: NormalModule,
  pub local_symbol_ref_db: SymbolRefDbForModule,
  pub runtime: RuntimeModuleBrief,
}
