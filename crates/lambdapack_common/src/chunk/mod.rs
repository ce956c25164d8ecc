use arcstr::ArcStr;
use oxc_index::IndexVec;
use rustc_hash::FxHashMap;

use crate::{ModuleIdx, StmtInfoIdx, SymbolRef};

/// What tree shaking kept of one module for one entry.
#[derive(Debug, Default, Clone)]
pub struct ModuleInclusion {
  pub stmts: Vec<bool>,
  /// The namespace object `foo_exports` is materialized.
  pub namespace: bool,
  /// The module is emitted as a `__commonJS` wrapper.
  pub wrapped: bool,
  /// `var import_meta = {};` is emitted.
  pub import_meta: bool,
}

impl ModuleInclusion {
  pub fn is_stmt_included(&self, idx: StmtInfoIdx) -> bool {
    self.stmts.get(idx.index()).copied().unwrap_or(false)
  }

  pub fn is_included(&self) -> bool {
    self.wrapped || self.namespace || self.import_meta || self.stmts.iter().any(|included| *included)
  }
}

/// One output bundle. Every entry gets its own chunk, no code is shared between them.
#[derive(Debug, Default)]
pub struct Chunk {
  pub entry_module: ModuleIdx,
  /// The value of `[name]`.
  pub name: ArcStr,
  /// Included modules in execution order, the runtime first.
  pub modules: Vec<ModuleIdx>,
  pub inclusion: IndexVec<ModuleIdx, ModuleInclusion>,
  pub canonical_names: FxHashMap<SymbolRef, ArcStr>,
  /// The `esm` format needs `createRequire` when any `require` survives.
  pub needs_create_require: bool,
}

impl Chunk {
  pub fn new(entry_module: ModuleIdx, name: ArcStr) -> Self {
    Self { entry_module, name, ..Self::default() }
  }
}
