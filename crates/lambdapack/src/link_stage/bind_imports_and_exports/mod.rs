mod bind_imports_and_exports_context;

use arcstr::ArcStr;
use lambdapack_common::{
  IndexModules, Module, ModuleIdx, ModuleType, NamespaceAlias, Specifier, SymbolRef,
};
use lambdapack_error::{Diagnostic, DiagnosticKind};
use lambdapack_utils::{
  indexmap::FxIndexMap,
  rayon::{IntoParallelRefIterator, ParallelIterator},
};
use rustc_hash::{FxHashMap, FxHashSet};

use self::bind_imports_and_exports_context::{
  BindImportsAndExportsContext, ImportTracker, MatchImportKind,
};

type StarExportCandidates = FxHashMap<ArcStr, Vec<SymbolRef>>;

enum Binding {
  Link(SymbolRef, SymbolRef),
  Alias(SymbolRef, NamespaceAlias),
}

impl super::LinkStage<'_> {
  /// Fills `resolved_exports` of every module, then points every named import at the symbol it
  /// finally refers to.
  ///
  /// An import that reads from an external or CommonJS module has no declaration to point at. It
  /// becomes a property access on the namespace of its import record instead:
  /// ```js
  /// import { S3Client } from '@aws-sdk/client-s3';
  /// new S3Client();
  /// // becomes
  /// var import_client_s3 = require("@aws-sdk/client-s3");
  /// new import_client_s3.S3Client();
  /// ```
  pub(super) fn bind_imports_and_exports(&mut self) {
    let mut ambiguous_candidates: Vec<(ModuleIdx, StarExportCandidates)> = vec![];
    for (module_idx, meta) in self.metadata.iter_mut_enumerated() {
      let Module::Normal(module) = &self.module_table[module_idx] else {
        continue;
      };

      let mut resolved_exports = module
        .named_exports
        .iter()
        .map(|(name, local)| (name.clone(), local.referenced))
        .collect::<FxIndexMap<_, _>>();

      if module.meta.has_star_export() {
        let mut candidates = StarExportCandidates::default();
        Self::add_exports_for_export_star(
          module_idx,
          &self.module_table,
          &mut vec![],
          &mut resolved_exports,
          &mut candidates,
        );
        if !candidates.is_empty() {
          ambiguous_candidates.push((module_idx, candidates));
        }
      }

      resolved_exports.sort_unstable_keys();
      meta.resolved_exports = resolved_exports;
    }

    let ambiguous_exports = self.remove_ambiguous_exports(ambiguous_candidates);

    let ctx =
      BindImportsAndExportsContext { module_table: &self.module_table, metadata: &self.metadata };

    let results = self
      .module_table
      .par_iter()
      .filter_map(Module::as_normal)
      .flat_map_iter(|module| {
        module.named_imports.keys().filter_map(|imported_as| {
          let tracker = BindImportsAndExportsContext::tracker_for(module, *imported_as)?;
          Some((*imported_as, ctx.match_import_with_export(tracker)))
        })
      })
      .collect::<Vec<_>>();

    let mut bindings = Vec::with_capacity(results.len());
    for (imported_as, kind) in results {
      match kind {
        MatchImportKind::Normal(symbol) | MatchImportKind::Namespace(symbol) => {
          bindings.push(Binding::Link(imported_as, symbol));
        }
        MatchImportKind::NormalAndNamespace { namespace_ref, alias } => {
          bindings
            .push(Binding::Alias(imported_as, NamespaceAlias { property_name: alias, namespace_ref }));
        }
        MatchImportKind::Dropped => {}
        MatchImportKind::Cycle => {
          let importer = &self.module_table[imported_as.owner];
          let name = imported_as.name(&self.symbols);
          self.errors.push(
            Diagnostic::new(
              DiagnosticKind::CircularDependency,
              format!(
                "Detected cycle while resolving import \"{name}\" in \"{}\"",
                importer.stable_id()
              ),
            )
            .into(),
          );
        }
        MatchImportKind::NoMatch(tracker) => self.report_missing_export(&tracker, &ambiguous_exports),
      }
    }

    for binding in bindings {
      match binding {
        Binding::Link(imported_as, symbol) => self.symbols.link(imported_as, symbol),
        Binding::Alias(imported_as, alias) => {
          self.symbols.get_mut(imported_as).namespace_alias = Some(alias);
        }
      }
    }

    // Re-exports of dropped type-only imports have nothing to point at.
    let symbols = &self.symbols;
    let module_table = &self.module_table;
    for meta in self.metadata.iter_mut() {
      meta.resolved_exports.retain(|_, symbol| {
        let canonical = symbols.canonical_ref_for(*symbol);
        symbols.get(canonical).namespace_alias.is_some()
          || !module_table[canonical.owner]
            .as_normal()
            .is_some_and(|owner| owner.named_imports.contains_key(&canonical))
      });
    }
  }

  fn add_exports_for_export_star(
    module_idx: ModuleIdx,
    module_table: &IndexModules,
    module_stack: &mut Vec<ModuleIdx>,
    resolved_exports: &mut FxIndexMap<ArcStr, SymbolRef>,
    candidates: &mut StarExportCandidates,
  ) {
    if module_stack.contains(&module_idx) {
      return;
    }

    module_stack.push(module_idx);

    let Module::Normal(module) = &module_table[module_idx] else {
      return;
    };

    for module_idx in module.star_export_module_ids() {
      let Module::Normal(dep_module) = &module_table[module_idx] else {
        continue;
      };

      for (exported_name, named_export) in &dep_module.named_exports {
        // ES6 export star statements ignore exports named "default"
        if exported_name.as_str() == "default" {
          continue;
        }

        // This export star is shadowed if any file in the stack has a matching real named export
        if module_stack
          .iter()
          .filter_map(|id| module_table[*id].as_normal())
          .any(|module| module.named_exports.contains_key(exported_name))
        {
          continue;
        }

        match resolved_exports.get(exported_name) {
          None => {
            resolved_exports.insert(exported_name.clone(), named_export.referenced);
          }
          Some(existing) if *existing != named_export.referenced => {
            let existing = *existing;
            let list = candidates.entry(exported_name.clone()).or_insert_with(|| vec![existing]);
            if !list.contains(&named_export.referenced) {
              list.push(named_export.referenced);
            }
          }
          Some(_) => {}
        }
      }

      Self::add_exports_for_export_star(
        module_idx,
        module_table,
        module_stack,
        resolved_exports,
        candidates,
      );
    }

    module_stack.pop();
  }

  /// Two `export *` that provide the same name from different declarations cancel each other out.
  /// The same declaration reached through two paths is fine.
  fn remove_ambiguous_exports(
    &mut self,
    ambiguous_candidates: Vec<(ModuleIdx, StarExportCandidates)>,
  ) -> FxHashSet<(ModuleIdx, ArcStr)> {
    let ctx =
      BindImportsAndExportsContext { module_table: &self.module_table, metadata: &self.metadata };

    let mut ambiguous = FxHashSet::default();
    for (module_idx, candidates) in ambiguous_candidates {
      for (name, symbols) in candidates {
        let mut targets = symbols.into_iter().map(|symbol| ctx.resolve_export_target(symbol));
        let first = targets.next().flatten();
        if targets.any(|target| target.is_none() || target.as_ref() != first.as_ref()) {
          ambiguous.insert((module_idx, name));
        }
      }
    }

    for (module_idx, name) in &ambiguous {
      tracing::debug!(module = self.module_table[*module_idx].stable_id(), %name, "ambiguous star export");
      self.metadata[*module_idx].resolved_exports.shift_remove(name);
    }
    ambiguous
  }

  fn report_missing_export(
    &mut self,
    tracker: &ImportTracker,
    ambiguous_exports: &FxHashSet<(ModuleIdx, ArcStr)>,
  ) {
    let Some(importer) = self.module_table[tracker.importer].as_normal() else {
      return;
    };
    let Some(importee_idx) = importer.import_records[tracker.record_id].resolved_module() else {
      return;
    };
    let importee = &self.module_table[importee_idx];
    let name = match &tracker.imported {
      Specifier::Literal(name) => name.clone(),
      Specifier::Star => ArcStr::from("*"),
    };

    if ambiguous_exports.contains(&(importee_idx, name.clone())) {
      self.errors.push(
        Diagnostic::new(
          DiagnosticKind::AmbiguousExport,
          format!(
            "Ambiguous import \"{name}\" has multiple matching exports in \"{}\"",
            importee.stable_id()
          ),
        )
        .at(&importer.stable_id, &importer.source, tracker.span.start)
        .into(),
      );
      return;
    }

    // Re-exported interfaces and type aliases don't exist at runtime. The scanner can't tell them
    // apart from values across files, so TypeScript importers simply drop them.
    if matches!(importer.module_type, ModuleType::Ts | ModuleType::Tsx) {
      tracing::debug!(importer = %importer.stable_id, %name, "dropping import of a type-only export");
      return;
    }

    self.errors.push(
      Diagnostic::new(
        DiagnosticKind::MissingExport,
        format!(
          "\"{name}\" is not exported by \"{}\", imported by \"{}\".",
          importee.stable_id(),
          importer.stable_id
        ),
      )
      .at(&importer.stable_id, &importer.source, tracker.span.start)
      .into(),
    );
  }
}
