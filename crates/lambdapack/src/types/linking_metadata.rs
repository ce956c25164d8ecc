use arcstr::ArcStr;
use lambdapack_common::{ImportRecordIdx, SymbolRef};
use lambdapack_utils::indexmap::FxIndexMap;

/// Metadata generated for a module during the linking phase.
#[derive(Debug, Default)]
pub struct LinkingMetadata {
  /// The module is emitted inside a `__commonJS` wrapper.
  pub wrapped: bool,

  // Maps export names, including those reached through `export *`, to the symbol they resolve to.
  // Sorted by name for stable namespace objects.
  pub resolved_exports: FxIndexMap<ArcStr, SymbolRef>,

  // `export * from` records whose target is external, CommonJS or has dynamic exports itself.
  // Their names are only known at runtime and are copied with `__reExport`.
  pub dynamic_star_exports: Vec<ImportRecordIdx>,

  /// Symbols the chunk of this entry needs besides its statements, e.g. the namespace object
  /// behind `module.exports = __toCommonJS(ping_exports)`.
  pub referenced_symbols_by_entry_point_chunk: Vec<SymbolRef>,

  /// `esm` format only. Exports that are property accesses, e.g. re-exports of a CommonJS module,
  /// need a local binding before they can appear in `export { .. }`.
  pub export_alias_bindings: FxIndexMap<ArcStr, SymbolRef>,
}

impl LinkingMetadata {
  pub fn has_dynamic_exports(&self) -> bool {
    !self.dynamic_star_exports.is_empty()
  }
}
