use std::collections::hash_map::Entry;

use arcstr::ArcStr;
use lambdapack_common::{ModuleIdx, OutputFormat, SymbolRef, SymbolRefDb};
use lambdapack_utils::concat_string;
use oxc::syntax::keyword::{GLOBAL_OBJECTS, RESERVED_KEYWORDS};
use rustc_hash::{FxHashMap, FxHashSet};

/// Assigns every top level symbol of a bundle a name that is unique across all of its modules.
#[derive(Debug)]
pub struct Renamer<'name> {
  // Maps base names to the last suffix tried (e.g., `a` -> 1 means `a$1` was handed out).
  used_canonical_names: FxHashMap<ArcStr, u32>,

  canonical_names: FxHashMap<SymbolRef, ArcStr>,

  symbol_db: &'name SymbolRefDb,

  /// Names bound inside a module's functions and blocks. A top level symbol referenced from that
  /// module can't take one of them, the inner binding would capture it.
  module_used_names: FxHashMap<ModuleIdx, FxHashSet<ArcStr>>,

  /// Modules rendered inside a `__commonJS` wrapper, whose own top level is a nested scope.
  wrapped_modules: FxHashSet<ModuleIdx>,
}

impl<'name> Renamer<'name> {
  pub fn new(
    symbol_db: &'name SymbolRefDb,
    format: OutputFormat,
    wrapped_modules: FxHashSet<ModuleIdx>,
  ) -> Self {
    let manual_reserved = match format {
      OutputFormat::Cjs => vec!["module", "require", "__filename", "__dirname", "exports"],
      OutputFormat::Esm => vec!["require"],
    };

    let used_canonical_names = manual_reserved
      .into_iter()
      .chain(["Object", "Promise"])
      .chain(RESERVED_KEYWORDS.iter().copied())
      .chain(GLOBAL_OBJECTS.iter().copied())
      .map(|s| (ArcStr::from(s), 0))
      .collect();

    Self {
      used_canonical_names,
      canonical_names: FxHashMap::default(),
      symbol_db,
      module_used_names: FxHashMap::default(),
      wrapped_modules,
    }
  }

  /// Globals such as `console` or `process` must keep referring to the global.
  pub fn reserve(&mut self, name: ArcStr) {
    self.used_canonical_names.entry(name).or_insert(0);
  }

  pub fn add_symbol_in_root_scope(&mut self, symbol_ref: SymbolRef, referenced_in: &[ModuleIdx]) {
    let canonical_ref = symbol_ref.canonical_ref(self.symbol_db);
    if self.canonical_names.contains_key(&canonical_ref) {
      return;
    }
    let original_name = ArcStr::from(canonical_ref.name(self.symbol_db));

    let mut count = match self.used_canonical_names.entry(original_name.clone()) {
      Entry::Occupied(o) => *o.get() + 1,
      Entry::Vacant(v) => *v.insert(0),
    };

    loop {
      let candidate_name = if count == 0 {
        original_name.clone()
      } else {
        Self::generate_candidate_name(&original_name, count)
      };

      let is_taken = count > 0 && self.used_canonical_names.contains_key(&candidate_name);
      // The owner already compiles with its original name, inner shadowing included.
      let is_captured = (count > 0)
        .then_some(canonical_ref.owner)
        .into_iter()
        .chain(referenced_in.iter().copied().filter(|module| *module != canonical_ref.owner))
        .any(|module| self.module_used_names(module).contains(&candidate_name));

      if !is_taken && !is_captured {
        self.used_canonical_names.insert(original_name.clone(), count);
        self.used_canonical_names.entry(candidate_name.clone()).or_insert(0);
        tracing::trace!(from = %original_name, to = %candidate_name, "renamed");
        self.canonical_names.insert(canonical_ref, candidate_name);
        return;
      }

      count += 1;
    }
  }

  fn module_used_names(&mut self, module: ModuleIdx) -> &FxHashSet<ArcStr> {
    let symbol_db = self.symbol_db;
    let is_wrapped = self.wrapped_modules.contains(&module);
    self.module_used_names.entry(module).or_insert_with(|| {
      let local_db = symbol_db.local_db(module);
      let mut names = local_db.nested_names.clone();
      if is_wrapped {
        names.extend(
          local_db
            .symbols()
            .filter(|symbol_ref| !symbol_ref.is_facade(symbol_db))
            .map(|symbol_ref| ArcStr::from(symbol_ref.name(symbol_db))),
        );
      }
      names
    })
  }

  fn generate_candidate_name(original_name: &str, count: u32) -> ArcStr {
    concat_string!(original_name, "$", itoa::Buffer::new().format(count)).into()
  }

  pub fn into_canonical_names(self) -> FxHashMap<SymbolRef, ArcStr> {
    self.canonical_names
  }
}

#[cfg(test)]
mod tests {
  use lambdapack_common::SymbolRefDbForModule;
  use oxc_index::IndexVec;

  use super::*;

  #[test]
  fn suffixes_colliding_names() {
    let mut a = SymbolRefDbForModule::new(ModuleIdx::from_raw(0));
    let mut b = SymbolRefDbForModule::new(ModuleIdx::from_raw(1));
    let a_user = a.create_symbol_ref("user".into());
    let b_user = b.create_symbol_ref("user".into());
    let b_object = b.create_symbol_ref("Object".into());
    // `user$1` is bound inside a function of module b.
    b.nested_names.insert("user$1".into());
    let db = SymbolRefDb::new(IndexVec::from_vec(vec![a, b]));

    let mut renamer = Renamer::new(&db, OutputFormat::Cjs, FxHashSet::default());
    renamer.add_symbol_in_root_scope(a_user, &[]);
    renamer.add_symbol_in_root_scope(b_user, &[]);
    renamer.add_symbol_in_root_scope(b_object, &[]);
    let names = renamer.into_canonical_names();

    assert_eq!(names[&a_user], "user");
    assert_eq!(names[&b_user], "user$2");
    assert_eq!(names[&b_object], "Object$1");
  }

  #[test]
  fn reserved_globals_are_avoided() {
    let mut a = SymbolRefDbForModule::new(ModuleIdx::from_raw(0));
    let module_ref = a.create_symbol_ref("module".into());
    let console_ref = a.create_symbol_ref("console".into());
    let db = SymbolRefDb::new(IndexVec::from_vec(vec![a]));

    let mut renamer = Renamer::new(&db, OutputFormat::Cjs, FxHashSet::default());
    renamer.reserve("console".into());
    renamer.add_symbol_in_root_scope(module_ref, &[]);
    renamer.add_symbol_in_root_scope(console_ref, &[]);
    let names = renamer.into_canonical_names();

    assert_eq!(names[&module_ref], "module$1");
    assert_eq!(names[&console_ref], "console$1");
  }
}
