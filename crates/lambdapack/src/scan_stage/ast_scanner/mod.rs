mod impl_visit;
mod side_effect_detector;
mod typescript;

use std::path::Path;

use arcstr::ArcStr;
use lambdapack_common::{
  EcmaViewMeta, ImportKind, ImportRecordIdx, ImportRecordMeta, LocalExport, ModuleIdx, ModuleType,
  NamedImport, OccurrenceKind, RawImportRecord, SourceEdit, Specifier, StmtInfo, StmtInfoIdx,
  StmtInfos, StmtKind, SymbolOccurrence, SymbolRef, SymbolRefDbForModule,
};
use lambdapack_error::{Diagnostic, DiagnosticKind};
use lambdapack_utils::{concat_string, ecmascript::legitimize_identifier_name, indexmap::FxIndexMap};
use oxc::{
  ast::ast::Program,
  semantic::{ReferenceId, ScopeId, ScopeTree, SymbolFlags, SymbolId, SymbolTable},
  span::Span,
};
use oxc_index::IndexVec;
use rustc_hash::{FxHashMap, FxHashSet};

pub use side_effect_detector::SideEffectDetector;

#[derive(Debug)]
pub struct AstScanResult {
  pub symbols: SymbolRefDbForModule,
  pub namespace_object_ref: SymbolRef,
  pub default_export_ref: SymbolRef,
  pub wrapper_ref: SymbolRef,
  pub import_meta_ref: SymbolRef,
  pub named_imports: FxIndexMap<SymbolRef, NamedImport>,
  pub named_exports: FxIndexMap<ArcStr, LocalExport>,
  pub stmt_infos: StmtInfos,
  pub import_records: IndexVec<ImportRecordIdx, RawImportRecord>,
  pub top_level_await: Option<Span>,
  pub import_meta: Option<Span>,
  pub hashbang: Option<Span>,
  pub directives: Vec<Span>,
  pub global_names: FxHashSet<ArcStr>,
  pub meta: EcmaViewMeta,
  pub errors: Vec<anyhow::Error>,
}

/// The facade symbols every module carries, named after the module file.
pub fn create_module_facades(symbols: &mut SymbolRefDbForModule, repr_name: &str) -> [SymbolRef; 4] {
  [
    symbols.create_facade_root_symbol_ref(concat_string!(repr_name, "_exports").into()),
    symbols.create_facade_root_symbol_ref(concat_string!(repr_name, "_default").into()),
    symbols.create_facade_root_symbol_ref(concat_string!("require_", repr_name).into()),
    symbols.create_facade_root_symbol_ref("import_meta".into()),
  ]
}

/// An entry of the enum stack. References to members of the enum being scanned are rewritten to
/// property accesses on the IIFE parameter.
struct EnumScope {
  scope_id: Option<ScopeId>,
  symbol_id: Option<SymbolId>,
  inner_name: ArcStr,
}

pub struct AstScanner<'me> {
  source: &'me str,
  stable_id: &'me str,
  module_type: ModuleType,
  symbols: &'me SymbolTable,
  scopes: &'me ScopeTree,
  result: AstScanResult,
  root_symbols: FxHashMap<SymbolId, SymbolRef>,
  primitive_consts: FxHashSet<SymbolId>,
  current_stmt_info: StmtInfo,
  /// Set for the statement being scanned at the top level, cleared on the first nested statement.
  at_top_level: bool,
  /// Functions and arrow functions enclosing the current node.
  function_depth: u32,
  /// Functions and class bodies, which rebind `this`.
  this_scope_depth: u32,
  callee_spans: FxHashSet<Span>,
  shorthand_spans: FxHashSet<Span>,
  enum_stack: Vec<EnumScope>,
  enum_names: FxHashSet<ArcStr>,
  value_reference_counts: FxHashMap<SymbolRef, u32>,
  write_references: Vec<(SymbolRef, Span)>,
  pending_local_exports: Vec<(ArcStr, Span, SymbolRef)>,
}

impl<'me> AstScanner<'me> {
  pub fn new(
    idx: ModuleIdx,
    symbols: &'me SymbolTable,
    scopes: &'me ScopeTree,
    repr_name: &str,
    module_type: ModuleType,
    stable_id: &'me str,
    source: &'me str,
  ) -> Self {
    let mut local_db = SymbolRefDbForModule::new(idx);
    let [namespace_object_ref, default_export_ref, wrapper_ref, import_meta_ref] =
      create_module_facades(&mut local_db, repr_name);

    let mut stmt_infos = StmtInfos::new();
    // The first `StmtInfo` is used to represent the statement that declares and constructs Module Namespace Object
    stmt_infos.add_stmt_info(StmtInfo {
      kind: StmtKind::Namespace,
      declared_symbols: vec![namespace_object_ref],
      ..StmtInfo::default()
    });

    let result = AstScanResult {
      symbols: local_db,
      namespace_object_ref,
      default_export_ref,
      wrapper_ref,
      import_meta_ref,
      named_imports: FxIndexMap::default(),
      named_exports: FxIndexMap::default(),
      stmt_infos,
      import_records: IndexVec::new(),
      top_level_await: None,
      import_meta: None,
      hashbang: None,
      directives: Vec::new(),
      global_names: FxHashSet::default(),
      meta: EcmaViewMeta::empty(),
      errors: Vec::new(),
    };

    Self {
      source,
      stable_id,
      module_type,
      symbols,
      scopes,
      result,
      root_symbols: FxHashMap::default(),
      primitive_consts: FxHashSet::default(),
      current_stmt_info: StmtInfo::default(),
      at_top_level: false,
      function_depth: 0,
      this_scope_depth: 0,
      callee_spans: FxHashSet::default(),
      shorthand_spans: FxHashSet::default(),
      enum_stack: Vec::new(),
      enum_names: FxHashSet::default(),
      value_reference_counts: FxHashMap::default(),
      write_references: Vec::new(),
      pending_local_exports: Vec::new(),
    }
  }

  pub fn scan(mut self, program: &Program) -> AstScanResult {
    use oxc::ast::Visit;

    if program.body.iter().any(|stmt| stmt.is_module_declaration()) {
      self.result.meta.insert(EcmaViewMeta::HAS_ESM_SYNTAX);
    }
    self.visit_program(program);
    self.finalize()
  }

  fn finalize(mut self) -> AstScanResult {
    let declared = self
      .result
      .stmt_infos
      .iter()
      .flat_map(|stmt_info| stmt_info.declared_symbols.iter().copied())
      .collect::<FxHashSet<_>>();

    // `export { A }` of an interface or type alias has no runtime binding to export.
    for (exported, span, symbol) in std::mem::take(&mut self.pending_local_exports) {
      if declared.contains(&symbol) || self.result.named_imports.contains_key(&symbol) {
        self.result.named_exports.insert(exported, LocalExport { span, referenced: symbol });
      }
    }

    for (symbol, span) in std::mem::take(&mut self.write_references) {
      if let Some(named_import) = self.result.named_imports.get(&symbol) {
        let message = format!("Cannot assign to import \"{}\"", named_import.imported);
        self.result.errors.push(
          Diagnostic::new(DiagnosticKind::UnsupportedSyntax, message)
            .at(self.stable_id, self.source, span.start)
            .into(),
        );
      }
    }

    if self.module_type.is_typescript() {
      self.elide_type_only_imports();
    }

    let root_scope_id = self.scopes.root_scope_id();
    let nested_names = self
      .symbols
      .symbol_ids()
      .filter(|symbol_id| self.symbols.get_scope_id(*symbol_id) != root_scope_id)
      .filter(|symbol_id| {
        !self.symbols.get_flags(*symbol_id).intersects(
          SymbolFlags::TypeAlias
            | SymbolFlags::Interface
            | SymbolFlags::TypeParameter
            | SymbolFlags::EnumMember,
        )
      })
      .map(|symbol_id| ArcStr::from(self.symbols.get_name(symbol_id)))
      .chain(self.enum_names.drain())
      .collect::<FxHashSet<_>>();
    self.result.symbols.nested_names = nested_names;

    self.result
  }

  /// TypeScript drops imports whose bindings are only used in type positions. When every binding
  /// of a declaration is dropped, the module isn't loaded at all.
  fn elide_type_only_imports(&mut self) {
    let unused = self
      .result
      .named_imports
      .iter()
      .filter(|(symbol, named_import)| {
        !named_import.is_re_export && !self.value_reference_counts.contains_key(*symbol)
      })
      .map(|(symbol, _)| *symbol)
      .collect::<Vec<_>>();
    for symbol in &unused {
      self.result.named_imports.shift_remove(symbol);
    }

    for (record_id, record) in self.result.import_records.iter_mut_enumerated() {
      let keeps_module_load = ImportRecordMeta::IS_PLAIN_IMPORT
        | ImportRecordMeta::IS_RE_EXPORT
        | ImportRecordMeta::IS_EXPORT_STAR;
      if record.kind != ImportKind::Import || record.meta.intersects(keeps_module_load) {
        continue;
      }
      if self.result.named_imports.values().any(|named_import| named_import.record_id == record_id) {
        continue;
      }
      record.meta.insert(ImportRecordMeta::IS_TYPE_ELIDED);
      if let Some(stmt_idx) = record.related_stmt_info_idx {
        self.result.stmt_infos[stmt_idx].kind = StmtKind::Erased;
        self.result.stmt_infos[stmt_idx].side_effect = false;
      }
      tracing::trace!(module = self.stable_id, specifier = %record.specifier, "elided type-only import");
    }
  }

  fn current_stmt_idx(&self) -> StmtInfoIdx {
    StmtInfoIdx::from_usize(self.result.stmt_infos.len())
  }

  fn add_import_record(
    &mut self,
    specifier: &str,
    kind: ImportKind,
    span: Span,
    meta: ImportRecordMeta,
  ) -> ImportRecordIdx {
    let namespace_ref = self
      .result
      .symbols
      .create_facade_root_symbol_ref(concat_string!("import_", import_name_of(specifier)).into());
    let record =
      RawImportRecord::new(specifier.into(), kind, namespace_ref, span, Some(self.current_stmt_idx()))
        .with_meta(meta);
    self.result.import_records.push(record)
  }

  fn add_named_import(
    &mut self,
    local: SymbolRef,
    imported: Specifier,
    record_id: ImportRecordIdx,
    span: Span,
    is_re_export: bool,
  ) {
    self
      .result
      .named_imports
      .insert(local, NamedImport { imported, imported_as: local, record_id, span, is_re_export });
  }

  /// The module level symbol for `symbol_id`, `None` for bindings in nested scopes.
  fn root_symbol_ref(&mut self, symbol_id: SymbolId) -> Option<SymbolRef> {
    if self.symbols.get_scope_id(symbol_id) != self.scopes.root_scope_id() {
      return None;
    }
    if let Some(symbol_ref) = self.root_symbols.get(&symbol_id) {
      return Some(*symbol_ref);
    }
    let symbol_ref = self.result.symbols.create_symbol_ref(self.symbols.get_name(symbol_id).into());
    self.root_symbols.insert(symbol_id, symbol_ref);
    Some(symbol_ref)
  }

  fn resolve_reference(&self, reference_id: Option<ReferenceId>) -> Option<SymbolId> {
    reference_id.and_then(|reference_id| self.symbols.get_reference(reference_id).symbol_id())
  }

  fn add_declared_symbol(&mut self, symbol_ref: SymbolRef) {
    if !self.current_stmt_info.declared_symbols.contains(&symbol_ref) {
      self.current_stmt_info.declared_symbols.push(symbol_ref);
    }
  }

  fn add_referenced_symbol(&mut self, symbol_ref: SymbolRef) {
    if !self.current_stmt_info.referenced_symbols.contains(&symbol_ref) {
      self.current_stmt_info.referenced_symbols.push(symbol_ref);
    }
    *self.value_reference_counts.entry(symbol_ref).or_default() += 1;
  }

  fn add_occurrence(&mut self, span: Span, symbol: SymbolRef, kind: OccurrenceKind) {
    match kind {
      OccurrenceKind::Binding => self.add_declared_symbol(symbol),
      _ => self.add_referenced_symbol(symbol),
    }
    self.current_stmt_info.occurrences.push(SymbolOccurrence { span, symbol, kind });
  }

  fn add_edit(&mut self, edit: SourceEdit) {
    tracing::trace!(module = self.stable_id, ?edit, "edit");
    self.current_stmt_info.edits.push(edit);
  }

  fn remove(&mut self, start: u32, end: u32) {
    if start < end {
      self.add_edit(SourceEdit::Remove(Span::new(start, end)));
    }
  }

  fn error(&mut self, kind: DiagnosticKind, message: impl Into<String>, offset: u32) {
    self
      .result
      .errors
      .push(Diagnostic::new(kind, message).at(self.stable_id, self.source, offset).into());
  }

  fn unsupported(&mut self, what: &str, offset: u32) {
    self.error(
      DiagnosticKind::UnsupportedSyntax,
      format!("{what} are not supported, the bundler only strips types"),
      offset,
    );
  }
}

/// `./services/user.js` -> `user`, `node:fs` -> `fs`, `@aws-sdk/client-s3` -> `client_s3`.
fn import_name_of(specifier: &str) -> String {
  let specifier = specifier.strip_prefix("node:").unwrap_or(specifier);
  let last_segment = specifier.trim_end_matches('/').rsplit('/').next().unwrap_or(specifier);
  let stem = Path::new(last_segment)
    .file_stem()
    .map_or_else(|| last_segment.into(), |stem| stem.to_string_lossy());
  legitimize_identifier_name(&stem).into_owned()
}

#[cfg(test)]
mod tests;
