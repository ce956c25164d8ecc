mod lines_count;
mod source;
mod source_joiner;

pub use oxc_sourcemap::{ConcatSourceMapBuilder, SourceMap};

pub use crate::{
  lines_count::lines_count,
  source::{Source, SourceMapSource},
  source_joiner::SourceJoiner,
};
