use lambdapack_common::{Chunk, ChunkIdx, NormalModule, NormalizedBundlerOptions, SymbolRef};

use crate::link_stage::LinkStageOutput;

pub struct GenerateContext<'a> {
  pub chunk_idx: ChunkIdx,
  pub chunk: &'a Chunk,
  pub options: &'a NormalizedBundlerOptions,
  pub link_output: &'a LinkStageOutput,
  /// Output filename relative to `options.dir`, `[hash]` still unfilled.
  pub preliminary_filename: &'a str,
  pub warnings: Vec<anyhow::Error>,
}

impl GenerateContext<'_> {
  pub fn finalized_string_pattern_for_symbol_ref(&self, symbol_ref: SymbolRef) -> &str {
    self.link_output.symbols.canonical_name_for(symbol_ref, &self.chunk.canonical_names)
  }

  pub fn finalized_runtime_helper(&self, name: &str) -> &str {
    self.finalized_string_pattern_for_symbol_ref(self.link_output.runtime_module.resolve_symbol(name))
  }

  pub fn entry_module(&self) -> Option<&NormalModule> {
    self.link_output.module_table[self.chunk.entry_module].as_normal()
  }

  pub fn renderable_ecma_modules(&self) -> impl Iterator<Item = &NormalModule> {
    self.chunk.modules.iter().filter_map(|idx| self.link_output.module_table[*idx].as_normal())
  }

  pub fn is_wrapped(&self, module: &NormalModule) -> bool {
    self.link_output.metadata[module.idx].wrapped
  }
}

/// A chunk joined into one piece of code, before minification and naming are final.
pub struct RenderedChunk {
  /// Stable id of the entry module.
  pub entry: String,
  pub preliminary_filename: String,
  pub code: String,
  pub map: Option<lambdapack_sourcemap::SourceMap>,
  /// Appended after minification.
  pub footer: Option<String>,
}
