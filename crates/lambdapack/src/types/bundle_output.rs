use lambdapack_common::OutputAsset;

#[derive(Debug, Default)]
pub struct BundleOutput {
  /// One chunk per entry, followed by its sourcemap when one is written to a file.
  pub assets: Vec<OutputAsset>,
  pub warnings: Vec<anyhow::Error>,
}

impl BundleOutput {
  pub fn chunks(&self) -> impl Iterator<Item = &lambdapack_common::OutputAsset> {
    self.assets.iter().filter(|asset| asset.is_chunk())
  }
}
