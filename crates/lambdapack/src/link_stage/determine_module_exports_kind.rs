use lambdapack_common::{ExportsKind, ImportKind, Module};
use rustc_hash::FxHashSet;

use super::LinkStage;

impl LinkStage<'_> {
  /// A module without `import`/`export` and without `module`/`exports` takes the kind of the
  /// first thing that loads it: `require` makes it CommonJS, anything else makes it ESM.
  pub(super) fn determine_module_exports_kind(&mut self) {
    let mut required = FxHashSet::default();
    for module in self.module_table.iter().filter_map(Module::as_normal) {
      for rec in &module.import_records {
        let Some(importee) = rec.resolved_module() else {
          continue;
        };
        if matches!(rec.kind, ImportKind::Require) && self.module_table[importee].is_normal() {
          required.insert(importee);
        }
      }
    }

    for module in self.module_table.iter_mut().filter_map(Module::as_normal_mut) {
      if matches!(module.exports_kind, ExportsKind::None) {
        module.exports_kind =
          if required.contains(&module.idx) { ExportsKind::CommonJs } else { ExportsKind::Esm };
      }
    }
  }
}
