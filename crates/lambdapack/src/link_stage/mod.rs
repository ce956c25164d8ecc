mod bind_imports_and_exports;
mod create_exports_for_ecma_modules;
mod determine_side_effects;
mod determine_module_exports_kind;
mod include_statements;
mod reference_needed_symbols;
mod sort_modules;
mod wrap_modules;

use lambdapack_common::{
  EntryPoint, IndexModules, Module, ModuleIdx, OutputFormat, RuntimeModuleBrief, SymbolRefDb,
};
use lambdapack_error::{BuildResult, Diagnostic, DiagnosticKind};
use lambdapack_utils::indexmap::FxIndexSet;
use oxc_index::IndexVec;

use crate::{
  graph::ChunkGraph,
  types::{SharedOptions, linking_metadata::LinkingMetadata, LinkingMetadataVec},
};

use super::scan_stage::ScanStageOutput;

#[derive(Debug)]
pub struct LinkStageOutput {
  pub module_table: IndexModules,
  pub entry_points: Vec<EntryPoint>,
  pub metadata: LinkingMetadataVec,
  pub symbols: SymbolRefDb,
  pub runtime_module: RuntimeModuleBrief,
  pub chunk_graph: ChunkGraph,
  pub warnings: Vec<anyhow::Error>,
}

#[derive(Debug)]
pub struct LinkStage<'a> {
  pub module_table: IndexModules,
  pub entry_points: Vec<EntryPoint>,
  pub symbols: SymbolRefDb,
  pub runtime_module: RuntimeModuleBrief,
  pub metadata: LinkingMetadataVec,
  pub warnings: Vec<anyhow::Error>,
  pub errors: Vec<anyhow::Error>,
  pub options: &'a SharedOptions,
}

impl<'a> LinkStage<'a> {
  pub fn new(scan_stage_output: ScanStageOutput, options: &'a SharedOptions) -> Self {
    let ScanStageOutput { module_table, symbols, entry_points, runtime_module, warnings } =
      scan_stage_output;

    let metadata = module_table
      .iter()
      .map(|_| LinkingMetadata::default())
      .collect::<IndexVec<ModuleIdx, _>>();

    Self {
      module_table,
      entry_points,
      symbols,
      runtime_module,
      metadata,
      warnings,
      errors: vec![],
      options,
    }
  }

  pub fn link(mut self) -> BuildResult<LinkStageOutput> {
    self.determine_module_exports_kind();
    self.wrap_modules();
    self.check_module_syntax();
    self.bind_imports_and_exports();
    self.create_exports_for_ecma_modules();
    self.reference_needed_symbols();
    self.determine_side_effects();

    if !self.errors.is_empty() {
      Err(std::mem::take(&mut self.errors))?;
    }

    let chunk_graph = self.generate_chunks();

    Ok(LinkStageOutput {
      module_table: self.module_table,
      entry_points: self.entry_points,
      metadata: self.metadata,
      symbols: self.symbols,
      runtime_module: self.runtime_module,
      chunk_graph,
      warnings: self.warnings,
    })
  }

  /// One chunk per entry. Modules shared by several entries are duplicated into each.
  fn generate_chunks(&mut self) -> ChunkGraph {
    let mut chunk_graph = ChunkGraph::default();
    let mut circular_dependencies = FxIndexSet::default();

    for entry in &self.entry_points {
      let sorted_modules = self.sort_modules(entry.idx, &mut circular_dependencies);
      let chunk = self.include_statements(entry, &sorted_modules);
      tracing::debug!(
        entry = %entry.name,
        modules = chunk.modules.len(),
        "tree shaken",
      );
      chunk_graph.add_chunk(chunk);
    }

    for cycle in circular_dependencies {
      let paths = cycle
        .iter()
        .copied()
        .filter_map(|id| self.module_table[id].as_normal())
        .map(|module| module.stable_id.as_str())
        .collect::<Vec<_>>();

      self.warnings.push(
        Diagnostic::new(
          DiagnosticKind::CircularDependency,
          format!("Circular dependency: {}.", paths.join(" -> ")),
        )
        .into(),
      );
    }

    chunk_graph
  }

  /// `await` at the top level can't be expressed in CommonJS output, `import.meta` has no
  /// equivalent there and degrades to an empty object.
  fn check_module_syntax(&mut self) {
    let is_cjs_format = matches!(self.options.format, OutputFormat::Cjs);
    for module in self.module_table.iter().filter_map(Module::as_normal) {
      if let Some(span) = module.top_level_await {
        let message = if self.metadata[module.idx].wrapped {
          Some("Top-level await is not available in a CommonJS module")
        } else if is_cjs_format {
          Some("Top-level await is not available with the \"cjs\" output format")
        } else {
          None
        };
        if let Some(message) = message {
          self.errors.push(
            Diagnostic::new(DiagnosticKind::TopLevelAwait, message)
              .at(&module.stable_id, &module.source, span.start)
              .into(),
          );
        }
      }

      if let Some(span) = module.import_meta {
        if is_cjs_format {
          self.warnings.push(
            Diagnostic::new(
              DiagnosticKind::ImportMetaInCjs,
              "\"import.meta\" is not available with the \"cjs\" output format and will be empty",
            )
            .at(&module.stable_id, &module.source, span.start)
            .into(),
          );
        }
      }
    }
  }
}
