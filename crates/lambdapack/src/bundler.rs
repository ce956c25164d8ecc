use std::sync::Arc;

use anyhow::Context;
use lambdapack_common::{BundlerOptions, NormalizedBundlerOptions, SourceMapType};
use lambdapack_error::BuildResult;
use lambdapack_fs::{FileSystem, OsFileSystem};
use lambdapack_resolver::Resolver;
use lambdapack_utils::concat_string;

use crate::{
  generate_stage::GenerateStage,
  link_stage::LinkStage,
  scan_stage::ScanStage,
  types::{SharedOptions, SharedResolver, bundle_output::BundleOutput},
  utils::normalize_options::normalize_options,
};

pub struct Bundler {
  pub(crate) fs: OsFileSystem,
  pub(crate) options: SharedOptions,
  pub(crate) resolver: SharedResolver,
}

impl Bundler {
  pub fn new(options: BundlerOptions) -> BuildResult<Self> {
    let options = normalize_options(options)?;
    let resolver = Resolver::new(&options)?;
    Ok(Self { fs: OsFileSystem, options: Arc::new(options), resolver: Arc::new(resolver) })
  }

  pub fn options(&self) -> &NormalizedBundlerOptions {
    &self.options
  }

  /// Bundles every entry without touching the output directory.
  pub async fn build(&self) -> BuildResult<BundleOutput> {
    self.bundle().await
  }

  /// Bundles every entry, then writes the assets. A failing entry fails the whole build before
  /// anything is written.
  pub async fn write(&self) -> BuildResult<BundleOutput> {
    let output = self.bundle().await?;
    self.write_assets(&output)?;
    Ok(output)
  }

  async fn bundle(&self) -> BuildResult<BundleOutput> {
    let scan_stage_output =
      ScanStage::new(self.fs, SharedOptions::clone(&self.options), SharedResolver::clone(&self.resolver))
        .scan()
        .await?;
    tracing::info!(modules = scan_stage_output.module_table.len(), "scan finished");

    let mut link_stage_output = LinkStage::new(scan_stage_output, &self.options).link()?;
    tracing::info!(entries = link_stage_output.entry_points.len(), "link finished");

    let output = GenerateStage::new(&mut link_stage_output, &self.options).generate()?;
    tracing::info!(assets = output.assets.len(), warnings = output.warnings.len(), "generate finished");
    Ok(output)
  }

  fn write_assets(&self, output: &BundleOutput) -> BuildResult<()> {
    let dir = &self.options.dir;
    for asset in &output.assets {
      let path = dir.join(&asset.filename);
      if let Some(parent) = path.parent() {
        self
          .fs
          .create_dir_all(parent)
          .with_context(|| format!("Failed to create directory {}", parent.display()))?;
      }
      self
        .fs
        .write(&path, asset.content_as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
      tracing::info!(path = %path.display(), bytes = asset.content.len(), "written");
    }

    // A map left over from a development build would describe code that no longer exists.
    if self.options.sourcemap != Some(SourceMapType::File) {
      for chunk in output.chunks() {
        let stale_map = dir.join(concat_string!(chunk.filename, ".map"));
        self
          .fs
          .remove_file(&stale_map)
          .with_context(|| format!("Failed to remove {}", stale_map.display()))?;
      }
    }
    Ok(())
  }
}
