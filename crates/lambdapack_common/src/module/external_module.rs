use arcstr::ArcStr;

use crate::ModuleIdx;
use crate::side_effects::DeterminedSideEffects;

/// A bare specifier left as a runtime `require`/`import`, e.g. `node:crypto` or `@aws-sdk/client-s3`.
#[derive(Debug)]
pub struct ExternalModule {
  pub idx: ModuleIdx,
  pub name: ArcStr,
  pub side_effects: DeterminedSideEffects,
}

impl ExternalModule {
  pub fn new(idx: ModuleIdx, name: ArcStr) -> Self {
    Self { idx, name, side_effects: DeterminedSideEffects::NoTreeshake }
  }
}
