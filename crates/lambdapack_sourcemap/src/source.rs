use oxc_sourcemap::SourceMap;

use crate::lines_count;

pub trait Source {
  fn content(&self) -> &str;

  fn sourcemap(&self) -> Option<&SourceMap> {
    None
  }

  fn lines_count(&self) -> u32 {
    lines_count(self.content())
  }
}

impl Source for str {
  fn content(&self) -> &str {
    self
  }
}

impl Source for String {
  fn content(&self) -> &str {
    self
  }
}

/// Generated code together with the map back to the file it came from.
#[derive(Debug)]
pub struct SourceMapSource {
  content: String,
  sourcemap: Option<SourceMap>,
}

impl SourceMapSource {
  pub fn new(content: String, sourcemap: Option<SourceMap>) -> Self {
    Self { content, sourcemap }
  }
}

impl Source for SourceMapSource {
  fn content(&self) -> &str {
    &self.content
  }

  fn sourcemap(&self) -> Option<&SourceMap> {
    self.sourcemap.as_ref()
  }
}

impl<T: Source + ?Sized> Source for &T {
  fn content(&self) -> &str {
    (**self).content()
  }

  fn sourcemap(&self) -> Option<&SourceMap> {
    (**self).sourcemap()
  }

  fn lines_count(&self) -> u32 {
    (**self).lines_count()
  }
}
