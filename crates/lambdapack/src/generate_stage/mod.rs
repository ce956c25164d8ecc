mod chunk_filename;
mod formats;
mod module_finalizer;
mod render_chunk_to_assets;

pub use chunk_filename::generate_entry_filename;

use lambdapack_error::BuildResult;
use lambdapack_utils::rayon::{IntoParallelRefMutIterator, ParallelIterator};

use crate::{
  link_stage::LinkStageOutput,
  types::{SharedOptions, bundle_output::BundleOutput},
  utils::chunk::deconflict_chunk_symbols::deconflict_chunk_symbols,
};

pub struct GenerateStage<'a> {
  link_output: &'a mut LinkStageOutput,
  options: &'a SharedOptions,
}

impl<'a> GenerateStage<'a> {
  pub fn new(link_output: &'a mut LinkStageOutput, options: &'a SharedOptions) -> Self {
    Self { link_output, options }
  }

  pub fn generate(&mut self) -> BuildResult<BundleOutput> {
    let preliminary_filenames = self.generate_preliminary_filenames();

    let mut chunk_graph = std::mem::take(&mut self.link_output.chunk_graph);
    let link_output: &LinkStageOutput = self.link_output;
    let format = self.options.format;
    chunk_graph.chunk_table.par_iter_mut().for_each(|chunk| {
      deconflict_chunk_symbols(chunk, link_output, format);
    });

    let output = self.render_chunk_to_assets(&chunk_graph, &preliminary_filenames);
    self.link_output.chunk_graph = chunk_graph;

    let mut output = output?;
    let mut warnings = std::mem::take(&mut self.link_output.warnings);
    warnings.append(&mut output.warnings);
    output.warnings = warnings;
    Ok(output)
  }
}
