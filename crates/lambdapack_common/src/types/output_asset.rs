#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputAssetKind {
  Chunk,
  SourceMap,
}

#[derive(Debug, Clone)]
pub struct OutputAsset {
  /// Relative to the output directory, slash separated.
  pub filename: String,
  pub content: String,
  pub kind: OutputAssetKind,
  /// Stable id of the entry module this asset was generated for.
  pub entry: String,
}

impl OutputAsset {
  pub fn filename(&self) -> &str {
    &self.filename
  }

  pub fn content_as_bytes(&self) -> &[u8] {
    self.content.as_bytes()
  }

  pub fn is_chunk(&self) -> bool {
    matches!(self.kind, OutputAssetKind::Chunk)
  }
}
