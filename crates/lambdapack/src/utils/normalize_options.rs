use std::path::PathBuf;

use lambdapack_common::{
  BundlerOptions, FilenameTemplate, NormalizedBundlerOptions, NormalizedResolveOptions,
  OutputFormat, Target,
};
use lambdapack_error::{BuildResult, Diagnostic, DiagnosticKind};
use sugar_path::SugarPath;

pub fn normalize_options(raw_options: BundlerOptions) -> BuildResult<NormalizedBundlerOptions> {
  let cwd = match raw_options.cwd {
    Some(cwd) if cwd.is_absolute() => cwd,
    Some(cwd) => std::env::current_dir()?.join(cwd),
    None => std::env::current_dir()?,
  }
  .normalize();

  let input = raw_options.input.unwrap_or_default();
  if input.is_empty() {
    Err(Diagnostic::new(DiagnosticKind::NoEntries, "No entry points were provided"))?;
  }

  let minify = raw_options.minify.unwrap_or(false);
  let sourcemap = raw_options.sourcemap;
  if minify && sourcemap.is_some() {
    // Minification reprints the bundle, the maps of the original modules would point nowhere.
    Err(Diagnostic::new(
      DiagnosticKind::InvalidOption,
      "`minify` and `sourcemap` can't be enabled at the same time",
    ))?;
  }

  let target = raw_options.target.unwrap_or_default();
  if let Target::Node(major) = target {
    if major < Target::MIN_NODE_MAJOR {
      Err(Diagnostic::new(
        DiagnosticKind::InvalidOption,
        format!("Target node{major} is not supported, the minimum is node{}", Target::MIN_NODE_MAJOR),
      ))?;
    }
  }

  let raw_resolve = raw_options.resolve.unwrap_or_default();
  let resolve = NormalizedResolveOptions {
    tsconfig_filename: raw_resolve.tsconfig_filename.map(|path| cwd.join(path).normalize()),
    condition_names: raw_resolve.condition_names.unwrap_or_default(),
  };

  let dir = cwd.join(raw_options.dir.unwrap_or_else(|| "dist".to_string())).normalize();
  let outbase = raw_options.outbase.map(|outbase| cwd.join(outbase).normalize());

  let normalized = NormalizedBundlerOptions {
    input,
    platform: raw_options.platform.unwrap_or_default(),
    target,
    external: raw_options.external.unwrap_or_default(),
    tree_shaking: raw_options.tree_shaking.unwrap_or(true),
    dir,
    outbase,
    entry_filenames: FilenameTemplate::new(
      raw_options.entry_filenames.unwrap_or_else(|| "[dir]/[name]".to_string()),
    ),
    format: raw_options.format.unwrap_or(OutputFormat::Cjs),
    minify,
    sourcemap,
    resolve,
    cwd,
  };

  tracing::debug!(
    format = %normalized.format,
    minify = normalized.minify,
    sourcemap = normalized.sourcemap.is_some(),
    entries = normalized.input.len(),
    "normalized options"
  );

  Ok(normalized)
}

/// Where an entry's `[dir]` is measured from.
pub fn outbase_for(options: &NormalizedBundlerOptions, entries: &[PathBuf]) -> Option<PathBuf> {
  options.outbase.clone().or_else(|| {
    lambdapack_utils::path_ext::lowest_common_ancestor(entries.iter().map(PathBuf::as_path))
  })
}

#[cfg(test)]
mod tests {
  use lambdapack_common::{BuildMode, InputItem, SourceMapType};
  use pretty_assertions::assert_eq;

  use super::*;

  fn options(mode: BuildMode) -> BundlerOptions {
    BundlerOptions {
      input: Some(vec![InputItem::from("src/handlers/ping.ts")]),
      cwd: Some(PathBuf::from("/work/app")),
      ..BundlerOptions::for_mode(mode)
    }
  }

  #[test]
  fn resolves_directories_against_cwd() {
    let normalized = normalize_options(options(BuildMode::Development)).unwrap();
    assert_eq!(normalized.dir, PathBuf::from("/work/app/dist"));
    assert_eq!(normalized.outbase, Some(PathBuf::from("/work/app/src")));
    assert_eq!(normalized.entry_filenames.template(), "[dir]/[name]/index");
    assert_eq!(normalized.sourcemap, Some(SourceMapType::File));
    assert!(!normalized.minify);
  }

  #[test]
  fn rejects_missing_entries() {
    let err = normalize_options(BundlerOptions { input: Some(vec![]), ..options(BuildMode::Production) })
      .unwrap_err();
    assert!(err.to_string().contains("NO_ENTRIES"), "{err}");
  }

  #[test]
  fn rejects_minified_sourcemaps() {
    let raw = BundlerOptions { sourcemap: Some(SourceMapType::Inline), ..options(BuildMode::Production) };
    let err = normalize_options(raw).unwrap_err();
    assert!(err.to_string().contains("INVALID_OPTION"), "{err}");
  }

  #[test]
  fn rejects_outdated_node_targets() {
    let raw = BundlerOptions { target: Some(Target::Node(14)), ..options(BuildMode::Development) };
    assert!(normalize_options(raw).is_err());
  }

  #[test]
  fn defaults_outbase_to_common_ancestor() {
    let raw = BundlerOptions { outbase: None, ..options(BuildMode::Development) };
    let normalized = normalize_options(raw).unwrap();
    let entries =
      vec![PathBuf::from("/work/app/src/handlers/a.ts"), PathBuf::from("/work/app/src/jobs/b.ts")];
    assert_eq!(outbase_for(&normalized, &entries), Some(PathBuf::from("/work/app/src")));
  }
}
