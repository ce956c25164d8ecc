use lambdapack_common::{ImportKind, Module, ModuleIdx, side_effects::DeterminedSideEffects};
use oxc_index::IndexVec;

use super::LinkStage;

#[derive(Debug, Clone, Copy)]
enum SideEffectCache {
  None,
  Visited,
  Cache(DeterminedSideEffects),
}

impl LinkStage<'_> {
  /// A module whose own statements are pure still has side effects when something it imports
  /// does, `import "./setup"` must keep the polyfills `setup` imports.
  pub(super) fn determine_side_effects(&mut self) {
    let mut cache = oxc_index::index_vec![SideEffectCache::None; self.module_table.len()];
    let side_effects = self
      .module_table
      .iter()
      .map(|module| self.determine_side_effects_for_module(module.idx(), &mut cache))
      .collect::<Vec<_>>();

    self.module_table.iter_mut().zip(side_effects).for_each(|(module, side_effects)| {
      if let Module::Normal(module) = module {
        module.ecma_view.side_effects = side_effects;
      }
    });
  }

  fn determine_side_effects_for_module(
    &self,
    idx: ModuleIdx,
    cache: &mut IndexVec<ModuleIdx, SideEffectCache>,
  ) -> DeterminedSideEffects {
    let module = &self.module_table[idx];
    match cache[idx] {
      SideEffectCache::None => cache[idx] = SideEffectCache::Visited,
      // Inside a cycle, the module's own answer is the best there is.
      SideEffectCache::Visited => return module.side_effects(),
      SideEffectCache::Cache(side_effects) => return side_effects,
    }

    let side_effects = match (module, module.side_effects()) {
      (_, DeterminedSideEffects::NoTreeshake | DeterminedSideEffects::Analyzed(true))
      | (Module::External(_), _) => module.side_effects(),
      (Module::Normal(module), DeterminedSideEffects::Analyzed(false)) => {
        DeterminedSideEffects::Analyzed(
          module
            .import_records
            .iter()
            .filter(|rec| matches!(rec.kind, ImportKind::Import))
            .filter_map(|rec| rec.resolved_module())
            .any(|importee| self.determine_side_effects_for_module(importee, cache).has_side_effects()),
        )
      }
    };

    cache[idx] = SideEffectCache::Cache(side_effects);
    side_effects
  }
}
