use std::str::FromStr;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SourceMapType {
  /// A sibling `.map` file referenced by a `sourceMappingURL` comment.
  #[default]
  File,
  /// A base64 data URL in the `sourceMappingURL` comment.
  Inline,
}

impl FromStr for SourceMapType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "file" => Ok(Self::File),
      "inline" => Ok(Self::Inline),
      _ => Err(format!("Invalid sourcemap type \"{s}\", expected \"file\" or \"inline\".")),
    }
  }
}
