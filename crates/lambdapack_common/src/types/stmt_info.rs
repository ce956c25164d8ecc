use arcstr::ArcStr;
use oxc::span::Span;
use oxc_index::IndexVec;
use rustc_hash::FxHashMap;

use crate::{ImportRecordIdx, StmtInfoIdx, SymbolRef};

#[derive(Debug, Default)]
pub struct StmtInfos {
  /// The first `StmtInfo` is used to represent the statement that declares and constructs Module
  /// Namespace Object
  infos: IndexVec<StmtInfoIdx, StmtInfo>,
  symbol_ref_to_declared_stmt_idx: FxHashMap<SymbolRef, Vec<StmtInfoIdx>>,
}

impl StmtInfos {
  pub const NAMESPACE_STMT_IDX: StmtInfoIdx = StmtInfoIdx::from_raw_unchecked(0);

  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_stmt_info(&mut self, info: StmtInfo) -> StmtInfoIdx {
    let id = self.infos.push(info);
    for symbol_ref in &self.infos[id].declared_symbols {
      self.symbol_ref_to_declared_stmt_idx.entry(*symbol_ref).or_default().push(id);
    }
    id
  }

  /// Records a symbol declared after the statement was added, e.g. a re-export facade.
  pub fn declare_symbol_for_stmt(&mut self, id: StmtInfoIdx, symbol_ref: SymbolRef) {
    self.infos[id].declared_symbols.push(symbol_ref);
    self.symbol_ref_to_declared_stmt_idx.entry(symbol_ref).or_default().push(id);
  }

  pub fn declared_stmts_by_symbol(&self, symbol_ref: &SymbolRef) -> &[StmtInfoIdx] {
    self.symbol_ref_to_declared_stmt_idx.get(symbol_ref).map_or(&[], Vec::as_slice)
  }

  pub fn namespace_stmt_mut(&mut self) -> &mut StmtInfo {
    &mut self.infos[Self::NAMESPACE_STMT_IDX]
  }

  pub fn len(&self) -> usize {
    self.infos.len()
  }

  pub fn is_empty(&self) -> bool {
    self.infos.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &StmtInfo> {
    self.infos.iter()
  }

  pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StmtInfo> {
    self.infos.iter_mut()
  }

  pub fn iter_enumerated(&self) -> impl Iterator<Item = (StmtInfoIdx, &StmtInfo)> {
    self.infos.iter_enumerated()
  }
}

impl std::ops::Index<StmtInfoIdx> for StmtInfos {
  type Output = StmtInfo;

  fn index(&self, index: StmtInfoIdx) -> &Self::Output {
    &self.infos[index]
  }
}

impl std::ops::IndexMut<StmtInfoIdx> for StmtInfos {
  fn index_mut(&mut self, index: StmtInfoIdx) -> &mut Self::Output {
    &mut self.infos[index]
  }
}

#[derive(Debug, Default)]
pub struct StmtInfo {
  /// The span of the top level statement in the module source. Empty for synthetic statements.
  pub span: Span,
  pub kind: StmtKind,
  /// Top level symbols declared by this statement.
  pub declared_symbols: Vec<SymbolRef>,
  /// Top level symbols referenced by this statement.
  pub referenced_symbols: Vec<SymbolRef>,
  pub side_effect: bool,
  /// `require('x')` and `import('x')` calls that are rewritten during rendering.
  pub call_sites: Vec<CallSite>,
  /// Every occurrence of a top level identifier, in source order.
  pub occurrences: Vec<SymbolOccurrence>,
  /// Type stripping and other rewrites, in source order.
  pub edits: Vec<SourceEdit>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StmtKind {
  #[default]
  Normal,
  /// Declares the Module Namespace Object, rendered only when something needs it.
  Namespace,
  /// Produces no code: types, interfaces, `export { a }` without a source.
  Erased,
  /// `import ... from 'x'`
  Import(ImportRecordIdx),
  /// `export ... from 'x'`
  ReExport(ImportRecordIdx),
  /// `export const a = 1`, the declaration starts at `decl_start`.
  ExportDecl { decl_start: u32 },
  /// `export default 1 + 1`
  ExportDefaultExpr { expr_start: u32 },
  /// `export default function () {}`. For an anonymous declaration, `name_insert_at` is where the
  /// generated name goes.
  ExportDefaultDecl { decl_start: u32, name_insert_at: Option<u32> },
  /// The single statement of a JSON module.
  JsonData,
}

#[derive(Debug, Clone, Copy)]
pub struct CallSite {
  pub span: Span,
  pub record_id: ImportRecordIdx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceKind {
  Binding,
  Reference,
  /// `{ a }`, rendered as `{ a: a$1 }` when renamed.
  ShorthandProperty,
  /// `a()`, rendered as `(0, ns.a)()` when `a` becomes a property access.
  Callee,
  /// `import.meta`
  ImportMeta,
}

#[derive(Debug, Clone, Copy)]
pub struct SymbolOccurrence {
  pub span: Span,
  pub symbol: SymbolRef,
  pub kind: OccurrenceKind,
}

#[derive(Debug, Clone)]
pub enum SourceEdit {
  Remove(Span),
  Replace(Span, ArcStr),
  Insert(u32, ArcStr),
  Enum(Box<EnumEdit>),
}

impl SourceEdit {
  pub fn start(&self) -> u32 {
    match self {
      Self::Remove(span) | Self::Replace(span, _) => span.start,
      Self::Insert(pos, _) => *pos,
      Self::Enum(edit) => edit.span.start,
    }
  }
}

/// `enum E { A, B = A * 2 }` becomes an IIFE that fills a plain object. Member initializers stay
/// in place so their mappings survive.
#[derive(Debug, Clone)]
pub struct EnumEdit {
  /// From the `enum` or `const` keyword to the closing brace.
  pub span: Span,
  /// `None` for enums nested in functions, which keep their own name.
  pub symbol: Option<SymbolRef>,
  pub name: ArcStr,
  pub members: Vec<EnumMemberEdit>,
}

#[derive(Debug, Clone)]
pub struct EnumMemberEdit {
  pub span: Span,
  pub name: ArcStr,
  pub value: EnumMemberValue,
}

#[derive(Debug, Clone, Copy)]
pub enum EnumMemberValue {
  /// No initializer, the previous numeric value plus one.
  Auto(f64),
  /// A string initializer gets no reverse mapping.
  Initializer { span: Span, is_string: bool },
}
