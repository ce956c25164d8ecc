use std::path::Path;

use anyhow::Context;
use dashmap::DashMap;
use lambdapack_common::Platform;
use lambdapack_utils::node_builtins::is_builtin_module;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use serde::{Deserialize, de::IgnoredAny};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
  #[serde(default)]
  dependencies: FxHashMap<String, IgnoredAny>,
  #[serde(default)]
  dev_dependencies: FxHashMap<String, IgnoredAny>,
  #[serde(default)]
  peer_dependencies: FxHashMap<String, IgnoredAny>,
  #[serde(default)]
  optional_dependencies: FxHashMap<String, IgnoredAny>,
}

/// Decides which bare specifiers stay as runtime `require` calls: Node built-ins, packages the
/// project declares in `package.json`, and anything matching a user pattern.
#[derive(Debug)]
pub struct ExternalPolicy {
  platform: Platform,
  packages: FxHashSet<String>,
  patterns: Vec<String>,
  decisions: DashMap<String, bool, FxBuildHasher>,
}

impl ExternalPolicy {
  pub fn new(platform: Platform, packages: FxHashSet<String>, patterns: Vec<String>) -> Self {
    Self { platform, packages, patterns, decisions: DashMap::default() }
  }

  /// Reads the dependency tables of `<cwd>/package.json`. A missing file declares nothing.
  pub fn from_package_json(
    cwd: &Path,
    platform: Platform,
    patterns: Vec<String>,
  ) -> anyhow::Result<Self> {
    let path = cwd.join("package.json");
    let packages = match std::fs::read_to_string(&path) {
      Ok(content) => {
        let package_json: PackageJson = serde_json::from_str(&content)
          .with_context(|| format!("Failed to parse {}", path.display()))?;
        let PackageJson { dependencies, dev_dependencies, peer_dependencies, optional_dependencies } =
          package_json;
        [dependencies, dev_dependencies, peer_dependencies, optional_dependencies]
          .into_iter()
          .flat_map(FxHashMap::into_keys)
          .collect()
      }
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => FxHashSet::default(),
      Err(err) => return Err(err).with_context(|| format!("Failed to read {}", path.display())),
    };
    tracing::debug!(count = packages.len(), "external packages from package.json");
    Ok(Self::new(platform, packages, patterns))
  }

  pub fn is_external(&self, specifier: &str) -> bool {
    if !is_bare_specifier(specifier) {
      return false;
    }
    if let Some(decision) = self.decisions.get(specifier) {
      return *decision;
    }
    let decision = self.decide(specifier);
    self.decisions.insert(specifier.to_string(), decision);
    decision
  }

  fn decide(&self, specifier: &str) -> bool {
    if matches!(self.platform, Platform::Node) && is_builtin_module(specifier) {
      return true;
    }
    let package_name = package_name_of(specifier);
    if self.packages.contains(package_name) {
      return true;
    }
    self.patterns.iter().any(|pattern| {
      fast_glob::glob_match(pattern, specifier) || fast_glob::glob_match(pattern, package_name)
    })
  }
}

fn is_bare_specifier(specifier: &str) -> bool {
  !(specifier.starts_with('.') || specifier.starts_with('/') || Path::new(specifier).is_absolute())
}

/// `@scope/pkg/sub/path` -> `@scope/pkg`, `pkg/sub` -> `pkg`.
pub fn package_name_of(specifier: &str) -> &str {
  let mut separators = specifier.match_indices('/').map(|(idx, _)| idx);
  let end = if specifier.starts_with('@') {
    separators.nth(1)
  } else {
    separators.next()
  };
  end.map_or(specifier, |end| &specifier[..end])
}

#[cfg(test)]
mod tests {
  use super::*;

  fn policy() -> ExternalPolicy {
    ExternalPolicy::new(
      Platform::Node,
      ["zod".to_string(), "@middy/core".to_string()].into_iter().collect(),
      vec!["@aws-sdk/*".to_string()],
    )
  }

  #[test]
  fn package_names() {
    assert_eq!(package_name_of("zod"), "zod");
    assert_eq!(package_name_of("zod/lib/types"), "zod");
    assert_eq!(package_name_of("@middy/core"), "@middy/core");
    assert_eq!(package_name_of("@middy/core/util"), "@middy/core");
  }

  #[test]
  fn builtins_and_declared_packages_are_external() {
    let policy = policy();
    assert!(policy.is_external("fs"));
    assert!(policy.is_external("node:crypto"));
    assert!(policy.is_external("zod"));
    assert!(policy.is_external("@middy/core/util"));
    assert!(policy.is_external("@aws-sdk/client-dynamodb"));
    assert!(policy.is_external("@aws-sdk/lib-dynamodb"));
  }

  #[test]
  fn relative_and_undeclared_specifiers_are_bundled() {
    let policy = policy();
    assert!(!policy.is_external("./util"));
    assert!(!policy.is_external("../shared/db"));
    assert!(!policy.is_external("@services/user"));
    assert!(!policy.is_external("left-pad"));
  }

  #[test]
  fn reads_dependency_tables() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
      dir.path().join("package.json"),
      r#"{ "name": "app", "dependencies": { "uuid": "^9.0.0" }, "devDependencies": { "typescript": "5" } }"#,
    )
    .unwrap();
    let policy = ExternalPolicy::from_package_json(dir.path(), Platform::Node, vec![]).unwrap();
    assert!(policy.is_external("uuid"));
    assert!(policy.is_external("typescript/lib/tsserverlibrary"));
    assert!(!policy.is_external("lodash"));
  }

  #[test]
  fn missing_package_json_declares_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let policy = ExternalPolicy::from_package_json(dir.path(), Platform::Node, vec![]).unwrap();
    assert!(!policy.is_external("uuid"));
    assert!(policy.is_external("path"));
  }

  #[test]
  fn neutral_platform_bundles_builtins() {
    let policy = ExternalPolicy::new(Platform::Neutral, FxHashSet::default(), vec![]);
    assert!(!policy.is_external("fs"));
  }
}
