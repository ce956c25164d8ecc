use std::path::Path;

use arcstr::ArcStr;
use sugar_path::SugarPath;

/// `ModuleId` is the unique string identifier for each module, the absolute path for files on
/// disk and the bare specifier for externals.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct ModuleId(ArcStr);

impl ModuleId {
  pub fn new(value: impl Into<ArcStr>) -> Self {
    Self(value.into())
  }

  /// A cwd-relative slash path, stable across machines. Used in comments, diagnostics, and as the
  /// key of `__commonJS` wrappers.
  pub fn stabilize(&self, cwd: &Path) -> String {
    if self.0.starts_with('\0') {
      return self.0.trim_start_matches('\0').to_string();
    }
    if self.as_path().is_absolute() {
      self.relative(cwd).as_path().to_slash_lossy().into_owned()
    } else {
      self.to_string()
    }
  }

  pub fn inner(&self) -> &ArcStr {
    &self.0
  }
}

impl std::ops::Deref for ModuleId {
  type Target = str;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl AsRef<str> for ModuleId {
  fn as_ref(&self) -> &str {
    self
  }
}

impl From<ArcStr> for ModuleId {
  fn from(value: ArcStr) -> Self {
    Self::new(value)
  }
}

#[test]
fn test_stabilize() {
  let cwd = Path::new("/work/app");
  assert_eq!(ModuleId::new("/work/app/src/handlers/ping.ts").stabilize(cwd), "src/handlers/ping.ts");
  assert_eq!(ModuleId::new("/work/shared/util.ts").stabilize(cwd), "../shared/util.ts");
  assert_eq!(ModuleId::new("\0lambdapack/runtime.js").stabilize(cwd), "lambdapack/runtime.js");
  assert_eq!(ModuleId::new("node:fs").stabilize(cwd), "node:fs");
}
