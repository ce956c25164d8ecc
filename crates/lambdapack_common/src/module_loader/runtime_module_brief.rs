use arcstr::ArcStr;
use rustc_hash::FxHashMap;

use crate::{ModuleIdx, SymbolRef, SymbolRefDbForModule};

pub static RUNTIME_MODULE_ID: &str = "\0lambdapack/runtime.js";

#[derive(Debug)]
pub struct RuntimeModuleBrief {
  pub idx: ModuleIdx,
  name_to_symbol: FxHashMap<ArcStr, SymbolRef>,
}

impl RuntimeModuleBrief {
  pub fn new(idx: ModuleIdx, symbols: &SymbolRefDbForModule) -> Self {
    let name_to_symbol = symbols
      .symbols()
      .map(|symbol_ref| (ArcStr::from(symbols.symbol_name(symbol_ref.symbol)), symbol_ref))
      .collect();

    Self { idx, name_to_symbol }
  }

  /// Helpers are compiled into the binary, a missing name is a bug in the runtime source.
  pub fn resolve_symbol(&self, name: &str) -> SymbolRef {
    self.name_to_symbol[name]
  }
}
