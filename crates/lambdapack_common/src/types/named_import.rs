use arcstr::ArcStr;
use oxc::span::Span;

use crate::{ImportRecordIdx, SymbolRef};

#[derive(Debug, Clone)]
pub struct NamedImport {
  pub imported: Specifier,
  /// `foo` in `import { bar as foo } from '...'`, or the facade symbol of a re-export.
  pub imported_as: SymbolRef,
  pub record_id: ImportRecordIdx,
  pub span: Span,
  /// `export { a } from '...'` and `export * as ns from '...'` bind a facade symbol that only
  /// exists to be exported.
  pub is_re_export: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Specifier {
  Star,
  Literal(ArcStr),
}

impl Specifier {
  pub fn is_default(&self) -> bool {
    matches!(self, Self::Literal(name) if name.as_str() == "default")
  }
}

impl std::fmt::Display for Specifier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Star => f.write_str("*"),
      Self::Literal(name) => f.write_str(name),
    }
  }
}

impl From<ArcStr> for Specifier {
  fn from(value: ArcStr) -> Self {
    Self::Literal(value)
  }
}
