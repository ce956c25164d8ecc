use lambdapack_common::{Chunk, ChunkIdx, OutputFormat};
use lambdapack_error::BuildResult;
use lambdapack_utils::rayon::{IntoParallelIterator, ParallelIterator};
use oxc_index::IndexVec;

use crate::{
  graph::ChunkGraph,
  types::{
    bundle_output::BundleOutput,
    generator::{GenerateContext, RenderedChunk},
  },
  utils::chunk::finalize_chunks::finalize_chunks,
};

use super::{
  GenerateStage,
  formats::{
    cjs::{CjsChunk, render_cjs},
    esm::render_esm,
  },
  module_finalizer::render_module,
};

impl GenerateStage<'_> {
  pub fn render_chunk_to_assets(
    &self,
    chunk_graph: &ChunkGraph,
    preliminary_filenames: &IndexVec<ChunkIdx, String>,
  ) -> BuildResult<BundleOutput> {
    let (rendered_chunks, warnings): (Vec<_>, Vec<_>) = chunk_graph
      .chunk_table
      .iter_enumerated()
      .collect::<Vec<_>>()
      .into_par_iter()
      .map(|(chunk_idx, chunk)| self.render_chunk(chunk_idx, chunk, &preliminary_filenames[chunk_idx]))
      .unzip();

    let assets = finalize_chunks(self.options, rendered_chunks)?;
    Ok(BundleOutput { assets, warnings: warnings.into_iter().flatten().collect() })
  }

  fn render_chunk(
    &self,
    chunk_idx: ChunkIdx,
    chunk: &Chunk,
    preliminary_filename: &str,
  ) -> (RenderedChunk, Vec<anyhow::Error>) {
    let mut ctx = GenerateContext {
      chunk_idx,
      chunk,
      options: self.options,
      link_output: &*self.link_output,
      preliminary_filename,
      warnings: vec![],
    };
    let modules =
      ctx.renderable_ecma_modules().map(|module| render_module(&ctx, module)).collect::<Vec<_>>();

    let (code, map, footer) = match ctx.options.format {
      OutputFormat::Cjs => {
        let CjsChunk { source_joiner, footer } = render_cjs(&ctx, &modules);
        let (code, map) = source_joiner.join();
        (code, map, footer)
      }
      OutputFormat::Esm => {
        let (code, map) = render_esm(&mut ctx, &modules).join();
        (code, map, None)
      }
    };

    let entry = self.link_output.module_table[chunk.entry_module].stable_id().to_string();
    tracing::debug!(%entry, filename = preliminary_filename, bytes = code.len(), "chunk rendered");

    let rendered = RenderedChunk {
      entry,
      preliminary_filename: preliminary_filename.to_string(),
      code,
      map,
      footer,
    };
    (rendered, ctx.warnings)
  }
}
