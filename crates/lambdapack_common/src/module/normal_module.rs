use std::ops::{Deref, DerefMut};

use arcstr::ArcStr;
use rustc_hash::FxHashSet;

use crate::ecmascript::ecma_view::EcmaView;
use crate::{ExportsKind, IndexModules, ModuleId, ModuleIdx, ModuleType};

#[derive(Debug)]
pub struct NormalModule {
  pub idx: ModuleIdx,
  pub is_user_defined_entry: bool,
  pub id: ModuleId,
  /// `stable_id` is calculated based on `id` to be stable across machine and os.
  pub stable_id: String,
  /// Legitimized file name used to derive `foo_exports`, `require_foo` and friends.
  pub repr_name: String,
  pub module_type: ModuleType,
  pub ecma_view: EcmaView,
}

impl NormalModule {
  // The runtime module and module which path starts with `\0` shouldn't generate sourcemap.
  pub fn is_virtual(&self) -> bool {
    self.id.starts_with('\0')
  }

  pub fn is_commonjs(&self) -> bool {
    matches!(self.ecma_view.exports_kind, ExportsKind::CommonJs)
  }

  pub fn star_export_module_ids(&self) -> impl Iterator<Item = ModuleIdx> + '_ {
    self
      .ecma_view
      .star_export_records()
      .filter_map(|rec_id| self.ecma_view.import_records[rec_id].resolved_module())
  }

  // https://tc39.es/ecma262/#sec-getexportednames
  pub fn get_exported_names<'modules>(
    &'modules self,
    export_star_set: &mut FxHashSet<ModuleIdx>,
    modules: &'modules IndexModules,
    include_default: bool,
    ret: &mut Vec<&'modules ArcStr>,
  ) {
    if !export_star_set.insert(self.idx) {
      return;
    }

    for name in self.ecma_view.named_exports.keys() {
      if (include_default || name.as_str() != "default") && !ret.contains(&name) {
        ret.push(name);
      }
    }

    self
      .star_export_module_ids()
      .filter_map(|id| modules[id].as_normal())
      .for_each(|module| module.get_exported_names(export_star_set, modules, false, ret));
  }
}

impl Deref for NormalModule {
  type Target = EcmaView;

  fn deref(&self) -> &Self::Target {
    &self.ecma_view
  }
}

impl DerefMut for NormalModule {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.ecma_view
  }
}
