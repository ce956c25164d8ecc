use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use lambdapack::{BuildMode, BundlerOptions, OutputFormat, Platform, ResolveOptions, SourceMapType, Target};
use serde::Deserialize;

use crate::args::Commands;

pub const CONFIG_FILE_NAME: &str = "lambdapack.toml";
pub const DEFAULT_ENTRIES: &str = "src/handlers/*.ts";

/// `lambdapack.toml`. Every key is optional, flags on the command line win.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
  pub entries: Option<String>,
  pub outdir: Option<String>,
  pub outbase: Option<String>,
  pub entry_names: Option<String>,
  pub platform: Option<String>,
  pub target: Option<String>,
  pub format: Option<String>,
  pub minify: Option<bool>,
  pub sourcemap: Option<SourceMapSetting>,
  pub tree_shaking: Option<bool>,
  pub external: Option<Vec<String>>,
  pub tsconfig: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SourceMapSetting {
  Enabled(bool),
  Kind(String),
}

impl SourceMapSetting {
  fn parse(value: &str) -> anyhow::Result<Self> {
    match value {
      "true" => Ok(Self::Enabled(true)),
      "false" => Ok(Self::Enabled(false)),
      kind => Ok(Self::Kind(kind.to_string())),
    }
  }

  fn into_sourcemap(self) -> anyhow::Result<Option<SourceMapType>> {
    match self {
      Self::Enabled(enabled) => Ok(enabled.then_some(SourceMapType::File)),
      Self::Kind(kind) => kind.parse::<SourceMapType>().map(Some).map_err(anyhow::Error::msg),
    }
  }
}

impl FileConfig {
  /// An explicit `--config` must exist, the default file is optional.
  pub fn load(cwd: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
    let path = match explicit {
      Some(path) => cwd.join(path),
      None => {
        let path = cwd.join(CONFIG_FILE_NAME);
        if !path.is_file() {
          return Ok(Self::default());
        }
        path
      }
    };
    let content =
      std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config = toml::from_str::<Self>(&content)
      .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
  }
}

/// The resolved invocation: what to bundle and how.
#[derive(Debug)]
pub struct BuildPlan {
  pub cwd: PathBuf,
  pub mode: BuildMode,
  pub entries: String,
  pub options: BundlerOptions,
}

/// Layers the Lambda profile of `mode`, then the file, then the flags.
pub fn resolve_plan(args: Commands, cwd: PathBuf, file: FileConfig) -> anyhow::Result<BuildPlan> {
  let mode = BuildMode::from_env_value(args.node_env.as_deref());
  let mut options = BundlerOptions::for_mode(mode);

  let sourcemap_chosen = file.sourcemap.is_some() || args.enhance.sourcemap.is_some();

  // --- lambdapack.toml
  if file.entries.as_deref().is_some_and(|entries| entries.trim().is_empty()) {
    bail!("`entries` in {CONFIG_FILE_NAME} is empty");
  }
  let entries_from_file = file.entries;
  merge(&mut options.dir, file.outdir);
  merge(&mut options.outbase, file.outbase);
  merge(&mut options.entry_filenames, file.entry_names);
  if let Some(platform) = file.platform {
    options.platform = Some(platform.parse::<Platform>().map_err(anyhow::Error::msg)?);
  }
  if let Some(target) = file.target {
    options.target = Some(target.parse::<Target>().map_err(anyhow::Error::msg)?);
  }
  if let Some(format) = file.format {
    options.format = Some(format.parse::<OutputFormat>().map_err(anyhow::Error::msg)?);
  }
  merge(&mut options.minify, file.minify);
  if let Some(sourcemap) = file.sourcemap {
    options.sourcemap = sourcemap.into_sourcemap()?;
  }
  merge(&mut options.tree_shaking, file.tree_shaking);
  merge(&mut options.external, file.external);
  if let Some(tsconfig) = file.tsconfig {
    options.resolve = Some(ResolveOptions { tsconfig_filename: Some(tsconfig), ..ResolveOptions::default() });
  }

  // --- command line
  let Commands { entries, input, output, enhance, .. } = args;
  merge(&mut options.dir, output.outdir);
  merge(&mut options.outbase, output.outbase);
  merge(&mut options.entry_filenames, output.entry_names);
  merge(&mut options.format, output.format.map(Into::into));
  merge(&mut options.platform, input.platform.map(Into::into));
  merge(&mut options.target, enhance.target);
  merge(&mut options.minify, enhance.minify);
  if let Some(sourcemap) = enhance.sourcemap {
    options.sourcemap = SourceMapSetting::parse(&sourcemap)?.into_sourcemap()?;
  }
  merge(&mut options.tree_shaking, enhance.tree_shaking);
  merge(&mut options.external, input.external);
  if let Some(tsconfig) = input.tsconfig {
    options.resolve = Some(ResolveOptions { tsconfig_filename: Some(tsconfig), ..ResolveOptions::default() });
  }

  // Asking for one of the two implies giving up the other.
  if options.minify == Some(true) && !sourcemap_chosen {
    options.sourcemap = None;
  }

  options.cwd = Some(cwd.clone());
  let entries = entries.or(entries_from_file).unwrap_or_else(|| DEFAULT_ENTRIES.to_string());
  Ok(BuildPlan { cwd, mode, entries, options })
}

fn merge<T>(slot: &mut Option<T>, value: Option<T>) {
  if value.is_some() {
    *slot = value;
  }
}

#[cfg(test)]
mod tests {
  use clap::Parser;
  use pretty_assertions::assert_eq;

  use super::*;

  fn plan(argv: &[&str], file: FileConfig) -> BuildPlan {
    let args = Commands::try_parse_from(std::iter::once("lambdapack").chain(argv.iter().copied())).unwrap();
    resolve_plan(args, PathBuf::from("/app"), file).unwrap()
  }

  #[test]
  fn production_minifies_without_sourcemaps() {
    let plan = plan(&["--node-env", "production"], FileConfig::default());
    assert_eq!(plan.mode, BuildMode::Production);
    assert_eq!(plan.options.minify, Some(true));
    assert_eq!(plan.options.sourcemap, None);
    assert_eq!(plan.entries, DEFAULT_ENTRIES);
  }

  #[test]
  fn anything_else_is_development() {
    let plan = plan(&["--node-env", "staging"], FileConfig::default());
    assert_eq!(plan.mode, BuildMode::Development);
    assert_eq!(plan.options.minify, Some(false));
    assert_eq!(plan.options.sourcemap, Some(SourceMapType::File));
    assert_eq!(plan.options.entry_filenames.as_deref(), Some("[dir]/[name]/index"));
  }

  #[test]
  fn flags_win_over_the_file() {
    let file = toml::from_str::<FileConfig>(
      r#"
        entries = "functions/*.ts"
        outdir = "build"
        sourcemap = "inline"
        external = ["pg-native"]
      "#,
    )
    .unwrap();
    let plan = plan(&["--node-env", "development", "--outdir", "out", "src/jobs/*.ts"], file);
    assert_eq!(plan.entries, "src/jobs/*.ts");
    assert_eq!(plan.options.dir.as_deref(), Some("out"));
    assert_eq!(plan.options.sourcemap, Some(SourceMapType::Inline));
    assert_eq!(plan.options.external, Some(vec!["pg-native".to_string()]));
  }

  #[test]
  fn unknown_keys_are_rejected() {
    assert!(toml::from_str::<FileConfig>("minfy = true").is_err());
  }

  #[test]
  fn missing_default_config_is_fine() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(FileConfig::load(dir.path(), None).unwrap(), FileConfig::default());
    assert!(FileConfig::load(dir.path(), Some(Path::new("nope.toml"))).is_err());
  }
}
