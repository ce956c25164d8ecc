use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleType {
  Js,
  Jsx,
  Ts,
  Tsx,
  Json,
}

impl ModuleType {
  /// ref: https://github.com/evanw/esbuild/blob/9c13ae1f06dfa909eb4a53882e3b7e4216a503fe/internal/bundler/bundler.go#L1161-L1183
  pub fn from_path(path: &Path) -> Option<Self> {
    let ext = path.extension()?.to_str()?;
    match ext {
      "js" | "mjs" | "cjs" => Some(Self::Js),
      "jsx" => Some(Self::Jsx),
      "ts" | "mts" | "cts" => Some(Self::Ts),
      "tsx" => Some(Self::Tsx),
      "json" => Some(Self::Json),
      _ => None,
    }
  }

  pub fn is_typescript(self) -> bool {
    matches!(self, Self::Ts | Self::Tsx)
  }

  pub fn is_jsx(self) -> bool {
    matches!(self, Self::Jsx | Self::Tsx)
  }
}

#[test]
fn test_from_path() {
  assert_eq!(ModuleType::from_path(Path::new("src/handlers/ping.ts")), Some(ModuleType::Ts));
  assert_eq!(ModuleType::from_path(Path::new("lib/index.cjs")), Some(ModuleType::Js));
  assert_eq!(ModuleType::from_path(Path::new("data/users.json")), Some(ModuleType::Json));
  assert_eq!(ModuleType::from_path(Path::new("README")), None);
}
