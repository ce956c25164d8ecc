pub mod build_mode;
pub mod filename_template;
pub mod input_item;
pub mod module_type;
pub mod normalized_bundler_options;
pub mod output_format;
pub mod platform;
pub mod resolve_options;
pub mod sourcemap_type;
pub mod target;

use std::path::PathBuf;

use crate::{BuildMode, InputItem, OutputFormat, Platform, ResolveOptions, SourceMapType, Target};

#[derive(Default, Debug, Clone)]
pub struct BundlerOptions {
  // --- Input
  pub input: Option<Vec<InputItem>>,
  pub cwd: Option<PathBuf>,
  pub platform: Option<Platform>,
  pub target: Option<Target>,
  /// Glob patterns of bare specifiers that stay as `require` calls.
  pub external: Option<Vec<String>>,
  pub tree_shaking: Option<bool>,

  // --- Output
  pub dir: Option<String>,
  /// Directory that `[dir]` in `entry_filenames` is relative to.
  pub outbase: Option<String>,
  pub entry_filenames: Option<String>,
  pub format: Option<OutputFormat>,
  pub minify: Option<bool>,
  /// `None` disables sourcemaps.
  pub sourcemap: Option<SourceMapType>,

  // --- Resolve
  pub resolve: Option<ResolveOptions>,
}

impl BundlerOptions {
  /// The fixed Lambda profile. Production minifies without sourcemaps, everything else keeps the
  /// code readable and writes `.map` files next to it.
  pub fn for_mode(mode: BuildMode) -> Self {
    Self {
      platform: Some(Platform::Node),
      target: Some(Target::Node(20)),
      external: Some(vec!["@aws-sdk/*".to_string()]),
      tree_shaking: Some(true),
      dir: Some("dist".to_string()),
      outbase: Some("src".to_string()),
      entry_filenames: Some("[dir]/[name]/index".to_string()),
      format: Some(OutputFormat::Cjs),
      minify: Some(mode.minify()),
      sourcemap: mode.sourcemap().then_some(SourceMapType::File),
      ..Self::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn production_profile_minifies_without_sourcemaps() {
    let options = BundlerOptions::for_mode(BuildMode::Production);
    assert_eq!(options.minify, Some(true));
    assert_eq!(options.sourcemap, None);
    assert_eq!(options.format, Some(OutputFormat::Cjs));
    assert_eq!(options.entry_filenames.as_deref(), Some("[dir]/[name]/index"));
  }

  #[test]
  fn development_profile_keeps_sourcemaps() {
    let options = BundlerOptions::for_mode(BuildMode::Development);
    assert_eq!(options.minify, Some(false));
    assert_eq!(options.sourcemap, Some(SourceMapType::File));
    assert_eq!(options.target, Some(Target::Node(20)));
    assert_eq!(options.outbase.as_deref(), Some("src"));
  }
}
