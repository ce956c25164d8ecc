use arcstr::ArcStr;
use bitflags::bitflags;
use lambdapack_utils::indexmap::FxIndexMap;
use oxc::span::Span;
use oxc_index::IndexVec;
use rustc_hash::FxHashSet;

use crate::{
  ExportsKind, ImportRecordIdx, LocalExport, NamedImport, ResolvedImportRecord, StmtInfos,
  SymbolRef, side_effects::DeterminedSideEffects,
};

bitflags! {
    #[derive(Debug, Default, Clone, Copy)]
    pub struct EcmaViewMeta: u8 {
        const HAS_STAR_EXPORT = 1;
        /// `import`/`export` syntax
        const HAS_ESM_SYNTAX = 1 << 1;
        /// Unresolved `module` or `exports`
        const USES_COMMONJS_EXPORTS = 1 << 2;
        const USES_IMPORT_META = 1 << 3;
        /// Unresolved `require` left as is, e.g. `require.resolve`.
        const USES_FREE_REQUIRE = 1 << 4;
    }
}

impl EcmaViewMeta {
  #[inline]
  pub fn has_star_export(self) -> bool {
    self.contains(Self::HAS_STAR_EXPORT)
  }
}

#[derive(Debug)]
pub struct EcmaView {
  pub source: ArcStr,
  /// Represents [Module Namespace Object](https://tc39.es/ecma262/#sec-module-namespace-exotic-objects)
  pub namespace_object_ref: SymbolRef,
  /// `foo_default`, bound by `export default <expr>` and JSON modules.
  pub default_export_ref: SymbolRef,
  /// `require_foo`, the `__commonJS` wrapper of a CommonJS module.
  pub wrapper_ref: SymbolRef,
  /// Stands in for `import.meta` in the `cjs` format.
  pub import_meta_ref: SymbolRef,
  pub named_imports: FxIndexMap<SymbolRef, NamedImport>,
  pub named_exports: FxIndexMap<ArcStr, LocalExport>,
  /// `stmt_infos[0]` represents the namespace binding statement
  pub stmt_infos: StmtInfos,
  pub import_records: IndexVec<ImportRecordIdx, ResolvedImportRecord>,
  pub exports_kind: ExportsKind,
  /// The first top level `await`, if any.
  pub top_level_await: Option<Span>,
  pub import_meta: Option<Span>,
  pub hashbang: Option<Span>,
  /// Directive prologues like `"use strict"`. The bundle carries its own.
  pub directives: Vec<Span>,
  /// Names referenced but never declared, e.g. `process` or `console`.
  pub global_names: FxHashSet<ArcStr>,
  pub side_effects: DeterminedSideEffects,
  pub meta: EcmaViewMeta,
}

impl EcmaView {
  pub fn star_export_records(&self) -> impl Iterator<Item = ImportRecordIdx> + '_ {
    self.import_records.iter_enumerated().filter(|(_, rec)| rec.is_export_star()).map(|(idx, _)| idx)
  }
}
