use arcstr::ArcStr;

use crate::SymbolRef;

/// For `import { a } from './foo.cjs'; console.log(a)`, the symbol `a` stands for
/// `module.exports.a` of `foo.cjs`, so it is rendered as `import_foo.a`.
#[derive(Debug, Clone)]
pub struct NamespaceAlias {
  pub property_name: ArcStr,
  pub namespace_ref: SymbolRef,
}
