use oxc_sourcemap::{ConcatSourceMapBuilder, SourceMap};

use crate::source::Source;

/// Joins sources with `\n`, merging the sourcemaps of those that carry one.
#[derive(Default)]
pub struct SourceJoiner<'source> {
  inner: Vec<Box<dyn Source + Send + 'source>>,
  prepend_source: Vec<Box<dyn Source + Send + 'source>>,
  enable_sourcemap: bool,
}

impl<'source> SourceJoiner<'source> {
  pub fn new(enable_sourcemap: bool) -> Self {
    Self { enable_sourcemap, ..Self::default() }
  }

  pub fn append_source<T: Source + Send + 'source>(&mut self, source: T) {
    self.inner.push(Box::new(source));
  }

  pub fn prepend_source<T: Source + Send + 'source>(&mut self, source: T) {
    self.prepend_source.push(Box::new(source));
  }

  pub fn is_empty(&self) -> bool {
    self.inner.is_empty() && self.prepend_source.is_empty()
  }

  pub fn join(&self) -> (String, Option<SourceMap>) {
    let sources = self.prepend_source.iter().chain(self.inner.iter());
    let sources_len = self.prepend_source.len() + self.inner.len();

    let size_hint = sources.clone().map(|source| source.content().len()).sum::<usize>()
      + sources_len.saturating_sub(1);
    let mut ret_source = String::with_capacity(size_hint);
    let mut sourcemap_builder = self.enable_sourcemap.then(ConcatSourceMapBuilder::default);
    let mut line_offset = 0;

    for (index, source) in sources.enumerate() {
      if let (Some(builder), Some(sourcemap)) = (sourcemap_builder.as_mut(), source.sourcemap()) {
        builder.add_sourcemap(sourcemap, line_offset);
      }
      ret_source.push_str(source.content());
      if index < sources_len - 1 {
        ret_source.push('\n');
        line_offset += source.lines_count() + 1;
      }
    }

    (ret_source, sourcemap_builder.map(ConcatSourceMapBuilder::into_sourcemap))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn joins_with_newlines_in_order() {
    let mut joiner = SourceJoiner::default();
    joiner.append_source("b");
    joiner.append_source(String::from("c\n"));
    joiner.prepend_source("a");
    let (code, map) = joiner.join();
    assert_eq!(code, "a\nb\nc\n");
    assert!(map.is_none());
  }

  #[test]
  fn empty_joiner_produces_empty_output() {
    let joiner = SourceJoiner::new(true);
    assert!(joiner.is_empty());
    let (code, map) = joiner.join();
    assert_eq!(code, "");
    assert!(map.is_some());
  }
}
