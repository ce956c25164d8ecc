use std::path::Path;

use arcstr::ArcStr;

use super::module_id::ModuleId;

#[derive(Debug, Clone)]
pub struct ResolvedId {
  /// Absolute path, or the bare specifier when `is_external` is set.
  pub id: ArcStr,
  pub is_external: bool,
}

impl ResolvedId {
  pub fn debug_id(&self, cwd: impl AsRef<Path>) -> String {
    ModuleId::new(self.id.clone()).stabilize(cwd.as_ref())
  }
}
