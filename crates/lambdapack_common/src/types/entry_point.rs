use arcstr::ArcStr;

use crate::ModuleIdx;

#[derive(Debug, Clone)]
pub struct EntryPoint {
  pub idx: ModuleIdx,
  /// The value of `[name]`, the file stem unless the input item names it.
  pub name: ArcStr,
}
