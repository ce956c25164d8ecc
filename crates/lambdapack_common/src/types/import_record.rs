use std::fmt::Debug;

use arcstr::ArcStr;
use oxc::span::Span;

use crate::{ImportKind, ModuleIdx, StmtInfoIdx, SymbolRef};

pub type RawImportRecord = ImportRecord<Span>;
/// `None` for type-only imports, which are never loaded.
pub type ResolvedImportRecord = ImportRecord<Option<ModuleIdx>>;

bitflags::bitflags! {
  #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
  pub struct ImportRecordMeta: u8 {
    /// If it is `import {} from '...'` or `import '...'`
    const IS_PLAIN_IMPORT = 1;
    /// `export * from 'mod'` only
    const IS_EXPORT_STAR = 1 << 1;
    /// `import { type A } from 'mod'`, or an import whose bindings are only used as types.
    const IS_TYPE_ELIDED = 1 << 2;
    /// `import foo from 'mod'` or `export { default } from 'mod'`
    const CONTAINS_IMPORT_DEFAULT = 1 << 3;
    /// `import * as ns from 'mod'` or `export * as ns from 'mod'`
    const CONTAINS_IMPORT_STAR = 1 << 4;
    /// `export { a } from 'mod'` or `export * as ns from 'mod'`
    const IS_RE_EXPORT = 1 << 5;
  }
}

#[derive(Debug)]
pub struct ImportRecord<State: Debug> {
  pub state: State,
  /// `./lib.js` in `import { foo } from './lib.js';`
  pub specifier: ArcStr,
  pub kind: ImportKind,
  /// We will turn `import { foo } from './cjs.js'; console.log(foo);` to `var import_cjs = __toESM(require_cjs()); console.log(import_cjs.foo)`;
  /// `namespace_ref` represent the potential `import_cjs` in above example. It's useless if we imported an esm module.
  pub namespace_ref: SymbolRef,
  pub meta: ImportRecordMeta,
  pub related_stmt_info_idx: Option<StmtInfoIdx>,
}

impl<State: Debug> ImportRecord<State> {
  pub fn is_type_elided(&self) -> bool {
    self.meta.contains(ImportRecordMeta::IS_TYPE_ELIDED)
  }

  pub fn is_export_star(&self) -> bool {
    self.meta.contains(ImportRecordMeta::IS_EXPORT_STAR)
  }
}

impl RawImportRecord {
  pub fn new(
    specifier: ArcStr,
    kind: ImportKind,
    namespace_ref: SymbolRef,
    span: Span,
    related_stmt_info_idx: Option<StmtInfoIdx>,
  ) -> Self {
    Self {
      specifier,
      kind,
      namespace_ref,
      meta: ImportRecordMeta::empty(),
      state: span,
      related_stmt_info_idx,
    }
  }

  pub fn with_meta(mut self, meta: ImportRecordMeta) -> Self {
    self.meta = meta;
    self
  }

  pub fn span(&self) -> Span {
    self.state
  }

  pub fn into_resolved(self, resolved_module: Option<ModuleIdx>) -> ResolvedImportRecord {
    ResolvedImportRecord {
      state: resolved_module,
      specifier: self.specifier,
      kind: self.kind,
      namespace_ref: self.namespace_ref,
      meta: self.meta,
      related_stmt_info_idx: self.related_stmt_info_idx,
    }
  }
}

impl ResolvedImportRecord {
  #[inline]
  pub fn resolved_module(&self) -> Option<ModuleIdx> {
    self.state
  }
}
