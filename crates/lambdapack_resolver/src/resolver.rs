use std::path::{Path, PathBuf};

use arcstr::ArcStr;
use itertools::Itertools;
use sugar_path::SugarPath;

use oxc_resolver::{
  ResolveError, ResolveOptions as OxcResolverOptions, Resolver as OxcResolver, TsconfigOptions,
  TsconfigReferences,
};

use lambdapack_common::{ImportKind, NormalizedBundlerOptions, Platform, ResolvedId};

use crate::ExternalPolicy;

#[derive(Debug)]
pub struct Resolver {
  cwd: PathBuf,
  import_resolver: OxcResolver,
  require_resolver: OxcResolver,
  external: ExternalPolicy,
}

impl Resolver {
  pub fn new(options: &NormalizedBundlerOptions) -> anyhow::Result<Self> {
    let cwd = options.cwd.clone();
    let external =
      ExternalPolicy::from_package_json(&cwd, options.platform, options.external.clone())?;
    Ok(Self::with_external(options, external))
  }

  pub fn with_external(options: &NormalizedBundlerOptions, external: ExternalPolicy) -> Self {
    let cwd = options.cwd.clone();
    let mut default_conditions = vec!["default".to_string()];
    if matches!(options.platform, Platform::Node) {
      default_conditions.push("node".to_string());
    }
    default_conditions.extend(options.resolve.condition_names.iter().cloned());

    let conditions_for = |kind: &str| -> Vec<String> {
      std::iter::once(kind.to_string()).chain(default_conditions.iter().cloned()).unique().collect()
    };

    let main_fields = match options.platform {
      Platform::Node => vec!["main".to_string(), "module".to_string()],
      Platform::Neutral => vec![],
    };

    // Without an explicit tsconfig, pick up the project one so `paths` aliases work.
    let tsconfig = options
      .resolve
      .tsconfig_filename
      .clone()
      .or_else(|| Some(cwd.join("tsconfig.json")).filter(|path| path.is_file()))
      .map(|config_file| TsconfigOptions { config_file, references: TsconfigReferences::Auto });

    let import_options = OxcResolverOptions {
      main_fields,
      tsconfig,
      condition_names: conditions_for(ImportKind::Import.condition()),
      extensions: [".ts", ".mts", ".cts", ".js", ".mjs", ".cjs", ".json"]
        .into_iter()
        .map(String::from)
        .collect(),
      // `import './util.js'` refers to `util.ts` in TypeScript sources.
      extension_alias: vec![
        (".js".to_string(), vec![".ts".to_string(), ".js".to_string()]),
        (".mjs".to_string(), vec![".mts".to_string(), ".mjs".to_string()]),
        (".cjs".to_string(), vec![".cts".to_string(), ".cjs".to_string()]),
      ],
      ..Default::default()
    };

    let require_options = OxcResolverOptions {
      condition_names: conditions_for(ImportKind::Require.condition()),
      ..import_options.clone()
    };

    let import_resolver = OxcResolver::new(import_options);
    let require_resolver = import_resolver.clone_with_options(require_options);

    Self { cwd, import_resolver, require_resolver, external }
  }

  pub fn cwd(&self) -> &PathBuf {
    &self.cwd
  }

  /// Entries are always bundled, so the external policy is skipped for them.
  pub fn resolve_entry(&self, specifier: &str) -> Result<ResolvedId, ResolveError> {
    let path = self.cwd.join(specifier).normalize();
    let resolution = self.import_resolver.resolve(&self.cwd, &path.to_string_lossy())?;
    Ok(ResolvedId { id: path_to_id(resolution.path()), is_external: false })
  }

  pub fn resolve(
    &self,
    importer: Option<&Path>,
    specifier: &str,
    kind: ImportKind,
  ) -> Result<ResolvedId, ResolveError> {
    if self.external.is_external(specifier) {
      return Ok(ResolvedId { id: specifier.into(), is_external: true });
    }

    let resolver = match kind {
      ImportKind::Require => &self.require_resolver,
      ImportKind::Import | ImportKind::DynamicImport => &self.import_resolver,
    };

    let dir = importer
      .and_then(|importer| importer.parent())
      .filter(|inner| inner.components().next().is_some())
      .unwrap_or(self.cwd.as_path());

    let resolution = resolver.resolve(dir, specifier)?;
    tracing::trace!(specifier, resolved = %resolution.path().display(), "resolved");
    Ok(ResolvedId { id: path_to_id(resolution.path()), is_external: false })
  }
}

fn path_to_id(path: &Path) -> ArcStr {
  path.to_string_lossy().as_ref().into()
}

#[cfg(test)]
mod tests {
  use std::fs;

  use lambdapack_common::{
    FilenameTemplate, NormalizedResolveOptions, OutputFormat, SourceMapType, Target,
  };
  use pretty_assertions::assert_eq;

  use super::*;

  fn options(cwd: &Path) -> NormalizedBundlerOptions {
    NormalizedBundlerOptions {
      input: vec![],
      cwd: cwd.to_path_buf(),
      platform: Platform::Node,
      target: Target::Node(20),
      external: vec!["@aws-sdk/*".to_string()],
      tree_shaking: true,
      dir: cwd.join("dist"),
      outbase: None,
      entry_filenames: FilenameTemplate::new("[dir]/[name]/index".to_string()),
      format: OutputFormat::Cjs,
      minify: false,
      sourcemap: Some(SourceMapType::File),
      resolve: NormalizedResolveOptions { tsconfig_filename: None, condition_names: vec![] },
    }
  }

  fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src/handlers")).unwrap();
    fs::create_dir_all(root.join("src/services")).unwrap();
    fs::write(root.join("src/handlers/ping.ts"), "export const handler = 1;").unwrap();
    fs::write(root.join("src/services/user.ts"), "export const user = 1;").unwrap();
    fs::write(
      root.join("tsconfig.json"),
      r#"{ "compilerOptions": { "baseUrl": ".", "paths": { "@services/*": ["src/services/*"] } } }"#,
    )
    .unwrap();
    fs::write(root.join("package.json"), r#"{ "dependencies": { "zod": "3" } }"#).unwrap();
    dir
  }

  #[test]
  fn resolves_relative_ts_with_js_extension() {
    let dir = project();
    let resolver = Resolver::new(&options(dir.path())).unwrap();
    let importer = dir.path().join("src/handlers/ping.ts");
    let resolved =
      resolver.resolve(Some(&importer), "../services/user.js", ImportKind::Import).unwrap();
    assert!(!resolved.is_external);
    assert_eq!(resolved.debug_id(dir.path()), "src/services/user.ts");
  }

  #[test]
  fn resolves_tsconfig_paths() {
    let dir = project();
    let resolver = Resolver::new(&options(dir.path())).unwrap();
    let importer = dir.path().join("src/handlers/ping.ts");
    let resolved = resolver.resolve(Some(&importer), "@services/user", ImportKind::Import).unwrap();
    assert_eq!(resolved.debug_id(dir.path()), "src/services/user.ts");
  }

  #[test]
  fn externals_skip_resolution() {
    let dir = project();
    let resolver = Resolver::new(&options(dir.path())).unwrap();
    for specifier in ["zod", "node:fs", "crypto", "@aws-sdk/client-s3"] {
      let resolved = resolver.resolve(None, specifier, ImportKind::Require).unwrap();
      assert!(resolved.is_external, "{specifier} should be external");
      assert_eq!(resolved.id.as_str(), specifier);
    }
  }

  #[test]
  fn unknown_module_is_an_error() {
    let dir = project();
    let resolver = Resolver::new(&options(dir.path())).unwrap();
    let importer = dir.path().join("src/handlers/ping.ts");
    assert!(resolver.resolve(Some(&importer), "./missing", ImportKind::Import).is_err());
  }

  #[test]
  fn resolves_entries_relative_to_cwd() {
    let dir = project();
    let resolver = Resolver::new(&options(dir.path())).unwrap();
    let resolved = resolver.resolve_entry("src/handlers/ping.ts").unwrap();
    assert_eq!(resolved.debug_id(dir.path()), "src/handlers/ping.ts");
  }
}
