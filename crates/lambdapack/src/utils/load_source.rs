use std::path::Path;

use lambdapack_common::ModuleType;
use lambdapack_error::{Diagnostic, DiagnosticKind};
use lambdapack_fs::FileSystem;

/// Reads a module from disk and decides how it is parsed from its extension.
pub fn load_source(
  fs: &dyn FileSystem,
  path: &Path,
  stable_id: &str,
) -> anyhow::Result<(String, ModuleType)> {
  let Some(module_type) = ModuleType::from_path(path) else {
    return Err(
      Diagnostic::new(
        DiagnosticKind::UnsupportedSyntax,
        format!("No loader is configured for \"{stable_id}\""),
      )
      .into(),
    );
  };

  if module_type.is_jsx() {
    return Err(
      Diagnostic::new(
        DiagnosticKind::UnsupportedSyntax,
        format!("JSX is not supported, \"{stable_id}\" can't be bundled"),
      )
      .into(),
    );
  }

  Ok((fs.read_to_string(path)?, module_type))
}

#[cfg(test)]
mod tests {
  use lambdapack_fs::OsFileSystem;

  use super::*;

  #[test]
  fn rejects_jsx_and_unknown_extensions() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["view.tsx", "notes.txt"] {
      let path = dir.path().join(name);
      std::fs::write(&path, "").unwrap();
      assert!(load_source(&OsFileSystem, &path, name).is_err(), "{name}");
    }
  }

  #[test]
  fn loads_typescript() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ping.ts");
    std::fs::write(&path, "export const a = 1;").unwrap();
    let (source, module_type) = load_source(&OsFileSystem, &path, "ping.ts").unwrap();
    assert_eq!(source, "export const a = 1;");
    assert_eq!(module_type, ModuleType::Ts);
  }
}
