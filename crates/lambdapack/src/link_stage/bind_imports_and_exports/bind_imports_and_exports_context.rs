use arcstr::ArcStr;
use lambdapack_common::{
  ImportRecordIdx, IndexModules, Module, ModuleIdx, ModuleType, NormalModule, Specifier, SymbolRef,
};
use oxc::span::Span;

use crate::types::LinkingMetadataVec;

#[derive(Clone, Debug)]
pub struct ImportTracker {
  pub importer: ModuleIdx,
  pub record_id: ImportRecordIdx,
  pub imported: Specifier,
  pub imported_as: SymbolRef,
  /// The import specifier in the importer, for diagnostics.
  pub span: Span,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MatchImportKind {
  Cycle,
  /// The import record was elided, nothing is bound.
  Dropped,
  NoMatch(ImportTracker),
  Namespace(SymbolRef),
  Normal(SymbolRef),
  NormalAndNamespace { namespace_ref: SymbolRef, alias: ArcStr },
}

impl PartialEq for ImportTracker {
  fn eq(&self, other: &Self) -> bool {
    self.importer == other.importer && self.imported_as == other.imported_as
  }
}

impl Eq for ImportTracker {}

#[derive(Debug)]
enum ImportStatus {
  NoMatch,
  Dropped,
  Matched(SymbolRef),
  /// The importee's exports are only known at runtime, the import reads a property of `0`.
  PropertyAccess(SymbolRef),
}

/// What an export finally refers to once every re-export in between is followed.
#[derive(Debug, PartialEq, Eq)]
pub enum ExportTarget {
  Symbol(SymbolRef),
  Property(SymbolRef, ArcStr),
}

pub(super) struct BindImportsAndExportsContext<'a> {
  pub module_table: &'a IndexModules,
  pub metadata: &'a LinkingMetadataVec,
}

impl BindImportsAndExportsContext<'_> {
  pub fn tracker_for(module: &NormalModule, imported_as: SymbolRef) -> Option<ImportTracker> {
    let named_import = module.named_imports.get(&imported_as)?;
    Some(ImportTracker {
      importer: module.idx,
      record_id: named_import.record_id,
      imported: named_import.imported.clone(),
      imported_as,
      span: named_import.span,
    })
  }

  pub fn match_import_with_export(&self, mut tracker: ImportTracker) -> MatchImportKind {
    let mut tracker_stack: Vec<ImportTracker> = vec![];
    loop {
      if tracker_stack.contains(&tracker) {
        return MatchImportKind::Cycle;
      }
      tracker_stack.push(tracker.clone());

      break match self.advance_import_tracker(&tracker) {
        ImportStatus::NoMatch => MatchImportKind::NoMatch(tracker),
        ImportStatus::Dropped => MatchImportKind::Dropped,
        ImportStatus::PropertyAccess(namespace_ref) => match tracker.imported {
          Specifier::Star => MatchImportKind::Namespace(namespace_ref),
          Specifier::Literal(alias) => MatchImportKind::NormalAndNamespace { namespace_ref, alias },
        },
        ImportStatus::Matched(symbol) => {
          // If this is a re-export of another import, continue for another
          // iteration of the loop to resolve that import as well
          let next = self.module_table[symbol.owner]
            .as_normal()
            .and_then(|owner| Self::tracker_for(owner, symbol));
          match next {
            Some(next) => {
              tracker = next;
              continue;
            }
            None => MatchImportKind::Normal(symbol),
          }
        }
      };
    }
  }

  /// Follows `symbol` through the imports of its module, if it is one.
  pub fn resolve_export_target(&self, symbol: SymbolRef) -> Option<ExportTarget> {
    let tracker =
      self.module_table[symbol.owner].as_normal().and_then(|owner| Self::tracker_for(owner, symbol));
    let Some(tracker) = tracker else {
      return Some(ExportTarget::Symbol(symbol));
    };
    match self.match_import_with_export(tracker) {
      MatchImportKind::Normal(symbol) | MatchImportKind::Namespace(symbol) => {
        Some(ExportTarget::Symbol(symbol))
      }
      MatchImportKind::NormalAndNamespace { namespace_ref, alias } => {
        Some(ExportTarget::Property(namespace_ref, alias))
      }
      MatchImportKind::Cycle | MatchImportKind::Dropped | MatchImportKind::NoMatch(_) => None,
    }
  }

  fn advance_import_tracker(&self, tracker: &ImportTracker) -> ImportStatus {
    let Some(importer) = self.module_table[tracker.importer].as_normal() else {
      return ImportStatus::NoMatch;
    };
    let record = &importer.import_records[tracker.record_id];
    let Some(importee_idx) = record.resolved_module() else {
      return ImportStatus::Dropped;
    };

    let importee = match &self.module_table[importee_idx] {
      Module::Normal(importee) => importee,
      Module::External(_) => return ImportStatus::PropertyAccess(record.namespace_ref),
    };

    if self.metadata[importee_idx].wrapped {
      // `import { a } from './legacy.cjs'` reads `a` off `__toESM(require_legacy())`.
      return ImportStatus::PropertyAccess(record.namespace_ref);
    }

    if importee.module_type == ModuleType::Json {
      return match &tracker.imported {
        Specifier::Star => ImportStatus::Matched(importee.namespace_object_ref),
        specifier if specifier.is_default() => ImportStatus::Matched(importee.default_export_ref),
        Specifier::Literal(_) => ImportStatus::PropertyAccess(importee.default_export_ref),
      };
    }

    match &tracker.imported {
      Specifier::Star => ImportStatus::Matched(importee.namespace_object_ref),
      Specifier::Literal(name) => {
        let meta = &self.metadata[importee_idx];
        match meta.resolved_exports.get(name) {
          Some(symbol_ref) => ImportStatus::Matched(*symbol_ref),
          None if meta.has_dynamic_exports() => {
            ImportStatus::PropertyAccess(importee.namespace_object_ref)
          }
          None => ImportStatus::NoMatch,
        }
      }
    }
  }
}
