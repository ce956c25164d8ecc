use std::path::PathBuf;

use crate::{FilenameTemplate, InputItem, OutputFormat, Platform, SourceMapType, Target};

#[derive(Debug, Clone)]
pub struct NormalizedResolveOptions {
  pub tsconfig_filename: Option<PathBuf>,
  pub condition_names: Vec<String>,
}

#[allow(clippy::struct_excessive_bools)] // Using raw booleans is more clear in this case
#[derive(Debug)]
pub struct NormalizedBundlerOptions {
  // --- Input
  pub input: Vec<InputItem>,
  pub cwd: PathBuf,
  pub platform: Platform,
  pub target: Target,
  pub external: Vec<String>,
  pub tree_shaking: bool,

  // --- Output
  pub dir: PathBuf,
  /// `None` means the lowest common ancestor of all entries.
  pub outbase: Option<PathBuf>,
  pub entry_filenames: FilenameTemplate,
  pub format: OutputFormat,
  pub minify: bool,
  pub sourcemap: Option<SourceMapType>,

  // --- Resolve
  pub resolve: NormalizedResolveOptions,
}
