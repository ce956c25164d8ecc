use arcstr::ArcStr;
use oxc_index::IndexVec;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{ModuleIdx, SymbolIdx, SymbolRef};

use super::namespace_alias::NamespaceAlias;

#[derive(Debug, Clone)]
pub struct SymbolRefData {
  pub name: ArcStr,
  /// If `namespace_alias` is not `None`, then this symbol must be rewritten to a property access.
  pub namespace_alias: Option<NamespaceAlias>,
  /// The symbol that this symbol is linked to.
  pub link: Option<SymbolRef>,
  /// The symbol doesn't exist in the source, e.g. `foo_exports` or `require_foo`.
  pub is_facade: bool,
}

/// Top level symbols of one module. Nested bindings are not tracked individually, only their
/// names, so top level renames never get captured by an inner scope.
#[derive(Debug)]
pub struct SymbolRefDbForModule {
  pub owner: ModuleIdx,
  symbols: IndexVec<SymbolIdx, SymbolRefData>,
  pub nested_names: FxHashSet<ArcStr>,
}

impl SymbolRefDbForModule {
  pub fn new(owner: ModuleIdx) -> Self {
    Self { owner, symbols: IndexVec::default(), nested_names: FxHashSet::default() }
  }

  pub fn create_symbol_ref(&mut self, name: ArcStr) -> SymbolRef {
    let symbol = self.symbols.push(SymbolRefData {
      name,
      namespace_alias: None,
      link: None,
      is_facade: false,
    });
    SymbolRef::from((self.owner, symbol))
  }

  // The `facade` means the symbol is actually not exist in the AST.
  pub fn create_facade_root_symbol_ref(&mut self, name: ArcStr) -> SymbolRef {
    let symbol_ref = self.create_symbol_ref(name);
    self.symbols[symbol_ref.symbol].is_facade = true;
    symbol_ref
  }

  pub fn symbol_name(&self, symbol: SymbolIdx) -> &str {
    &self.symbols[symbol].name
  }

  pub fn symbols(&self) -> impl Iterator<Item = SymbolRef> + '_ {
    self.symbols.indices().map(|symbol| SymbolRef::from((self.owner, symbol)))
  }
}

// Information about symbols for all modules
#[derive(Debug, Default)]
pub struct SymbolRefDb {
  inner: IndexVec<ModuleIdx, SymbolRefDbForModule>,
}

impl SymbolRefDb {
  /// `inner[idx].owner` must be `idx`.
  pub fn new(inner: IndexVec<ModuleIdx, SymbolRefDbForModule>) -> Self {
    debug_assert!(inner.iter_enumerated().all(|(idx, db)| db.owner == idx));
    Self { inner }
  }

  pub fn local_db(&self, owner: ModuleIdx) -> &SymbolRefDbForModule {
    &self.inner[owner]
  }

  pub fn create_facade_root_symbol_ref(&mut self, owner: ModuleIdx, name: ArcStr) -> SymbolRef {
    self.inner[owner].create_facade_root_symbol_ref(name)
  }

  /// Make `base` point to `target`
  pub fn link(&mut self, base: SymbolRef, target: SymbolRef) {
    let base_root = self.find_mut(base);
    let target_root = self.find_mut(target);
    if base_root == target_root {
      // already linked
      return;
    }
    self.get_mut(base_root).link = Some(target_root);
  }

  pub fn canonical_name_for<'a>(
    &'a self,
    refer: SymbolRef,
    canonical_names: &'a FxHashMap<SymbolRef, ArcStr>,
  ) -> &'a str {
    let canonical_ref = self.canonical_ref_for(refer);
    canonical_names.get(&canonical_ref).map_or_else(move || canonical_ref.name(self), ArcStr::as_str)
  }

  pub fn get(&self, refer: SymbolRef) -> &SymbolRefData {
    &self.inner[refer.owner].symbols[refer.symbol]
  }

  pub fn get_mut(&mut self, refer: SymbolRef) -> &mut SymbolRefData {
    &mut self.inner[refer.owner].symbols[refer.symbol]
  }

  /// <https://en.wikipedia.org/wiki/Disjoint-set_data_structure>
  /// See Path halving
  pub fn find_mut(&mut self, target: SymbolRef) -> SymbolRef {
    let mut canonical = target;
    while let Some(parent) = self.get(canonical).link {
      if let Some(grandparent) = self.get(parent).link {
        self.get_mut(canonical).link = Some(grandparent);
      }
      canonical = parent;
    }

    canonical
  }

  // Used for the situation where rust require `&self`
  pub fn canonical_ref_for(&self, target: SymbolRef) -> SymbolRef {
    let mut canonical = target;
    while let Some(founded) = self.get(canonical).link {
      debug_assert!(founded != target);
      canonical = founded;
    }
    canonical
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn db_with_two_modules() -> (SymbolRefDb, SymbolRef, SymbolRef, SymbolRef) {
    let mut a = SymbolRefDbForModule::new(ModuleIdx::from_raw(0));
    let mut b = SymbolRefDbForModule::new(ModuleIdx::from_raw(1));
    let a_foo = a.create_symbol_ref("foo".into());
    let b_bar = b.create_symbol_ref("bar".into());
    let b_baz = b.create_facade_root_symbol_ref("baz".into());
    (SymbolRefDb::new(IndexVec::from_vec(vec![a, b])), a_foo, b_bar, b_baz)
  }

  #[test]
  fn links_follow_to_the_root() {
    let (mut db, foo, bar, baz) = db_with_two_modules();
    db.link(foo, bar);
    db.link(bar, baz);
    assert_eq!(db.canonical_ref_for(foo), baz);
    assert_eq!(foo.canonical_ref(&db), baz);
    assert!(baz.is_facade(&db));
    assert!(!bar.is_facade(&db));
  }

  #[test]
  fn linking_twice_is_a_no_op() {
    let (mut db, foo, bar, _) = db_with_two_modules();
    db.link(foo, bar);
    db.link(foo, bar);
    db.link(bar, foo);
    assert_eq!(db.canonical_ref_for(foo), bar);
    assert_eq!(db.canonical_ref_for(bar), bar);
  }

  #[test]
  fn lookups_keep_every_member_of_a_chain_linked() {
    let (mut db, foo, bar, baz) = db_with_two_modules();
    db.link(foo, bar);
    db.link(bar, baz);
    assert_eq!(db.find_mut(foo), baz);
    assert_eq!(db.find_mut(foo), baz);
    assert_eq!(db.find_mut(bar), baz);
    assert_eq!(db.canonical_ref_for(foo), baz);
    assert_eq!(db.canonical_ref_for(bar), baz);
    assert_eq!(db.get(baz).link, None);
  }

  #[test]
  fn canonical_name_falls_back_to_the_root_name() {
    let (mut db, foo, bar, _) = db_with_two_modules();
    db.link(foo, bar);
    let mut names = FxHashMap::default();
    assert_eq!(db.canonical_name_for(foo, &names), "bar");
    names.insert(bar, ArcStr::from("bar$1"));
    assert_eq!(db.canonical_name_for(foo, &names), "bar$1");
  }
}
