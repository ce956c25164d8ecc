use crate::{ModuleIdx, SymbolIdx, SymbolRefDb};

/// `SymbolRef` is used to represent a top level symbol in a module when there are multiple modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolRef {
  pub owner: ModuleIdx,
  pub symbol: SymbolIdx,
}

impl From<(ModuleIdx, SymbolIdx)> for SymbolRef {
  fn from(value: (ModuleIdx, SymbolIdx)) -> Self {
    Self { owner: value.0, symbol: value.1 }
  }
}

impl SymbolRef {
  pub fn name<'db>(&self, db: &'db SymbolRefDb) -> &'db str {
    &db.get(*self).name
  }

  pub fn is_facade(&self, db: &SymbolRefDb) -> bool {
    db.get(*self).is_facade
  }

  #[must_use]
  pub fn canonical_ref(&self, db: &SymbolRefDb) -> Self {
    db.canonical_ref_for(*self)
  }
}
