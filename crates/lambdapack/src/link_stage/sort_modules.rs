use std::iter;

use lambdapack_common::ModuleIdx;
use lambdapack_utils::indexmap::FxIndexSet;
use rustc_hash::{FxHashMap, FxHashSet};

use super::LinkStage;

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
enum Status {
  ToBeExecuted(ModuleIdx),
  WaitForExit(ModuleIdx),
}

impl LinkStage<'_> {
  /// Modules reachable from `entry` in execution order. `require` and `import()` targets are
  /// evaluated eagerly, so every kind of import record is followed.
  pub(super) fn sort_modules(
    &self,
    entry: ModuleIdx,
    circular_dependencies: &mut FxIndexSet<Box<[ModuleIdx]>>,
  ) -> Vec<ModuleIdx> {
    // The runtime module should always be the first module to be executed
    let mut execution_stack = vec![
      Status::ToBeExecuted(entry),
      Status::ToBeExecuted(self.runtime_module.idx),
    ];

    let mut executed_ids = FxHashSet::default();
    let mut stack_indexes_of_executing_id = FxHashMap::default();
    let mut sorted_modules = vec![];

    while let Some(status) = execution_stack.pop() {
      match status {
        Status::ToBeExecuted(id) => {
          if executed_ids.contains(&id) {
            // Try to check if there is a circular dependency
            if let Some(index) = stack_indexes_of_executing_id.get(&id).copied() {
              let cycle = execution_stack[index..]
                .iter()
                .filter_map(|action| match action {
                  // Only modules with `Status::WaitForExit` are on the execution chain
                  Status::ToBeExecuted(_) => None,
                  Status::WaitForExit(id) => Some(*id),
                })
                .chain(iter::once(id))
                .collect::<Box<[_]>>();
              circular_dependencies.insert(cycle);
            }
          } else {
            executed_ids.insert(id);
            execution_stack.push(Status::WaitForExit(id));
            stack_indexes_of_executing_id.insert(id, execution_stack.len() - 1);

            if let Some(module) = self.module_table[id].as_normal() {
              execution_stack.extend(
                module
                  .import_records
                  .iter()
                  .filter_map(|rec| rec.resolved_module())
                  .filter(|importee| self.module_table[*importee].is_normal())
                  .rev()
                  .map(Status::ToBeExecuted),
              );
            }
          }
        }
        Status::WaitForExit(id) => {
          sorted_modules.push(id);
          stack_indexes_of_executing_id.remove(&id);
        }
      }
    }

    sorted_modules
  }
}
