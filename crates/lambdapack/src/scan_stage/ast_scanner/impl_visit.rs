use arcstr::ArcStr;
use lambdapack_common::{
  CallSite, EcmaViewMeta, ImportKind, ImportRecordMeta, LocalExport, OccurrenceKind, SourceEdit,
  Specifier, StmtInfo, StmtKind, SymbolOccurrence,
};
use lambdapack_utils::ecmascript::{legitimize_identifier_name, property_access_str};
use oxc::{
  ast::{
    ast::{self, BindingPatternKind, Declaration, ExportDefaultDeclarationKind, Expression, Statement},
    visit::walk,
    Visit,
  },
  semantic::ScopeFlags,
  span::{GetSpan, Span},
};

use super::{side_effect_detector::SideEffectDetector, AstScanner};

impl<'me, 'ast> Visit<'ast> for AstScanner<'me> {
  fn visit_program(&mut self, program: &ast::Program<'ast>) {
    self.result.hashbang = program.hashbang.as_ref().map(|hashbang| hashbang.span);
    self.result.directives = program.directives.iter().map(|directive| directive.span).collect();

    for stmt in &program.body {
      let detector = SideEffectDetector::new(self.symbols, &self.primitive_consts);
      let side_effect = detector.detect_side_effect_of_stmt(stmt);
      let primitive_consts = detector.primitive_const_symbols(stmt);
      self.primitive_consts.extend(primitive_consts);
      self.current_stmt_info = StmtInfo { span: stmt.span(), side_effect, ..StmtInfo::default() };
      self.at_top_level = true;
      self.visit_statement(stmt);

      let mut stmt_info = std::mem::take(&mut self.current_stmt_info);
      if matches!(stmt_info.kind, StmtKind::Erased) {
        stmt_info.side_effect = false;
      }
      self.result.stmt_infos.add_stmt_info(stmt_info);
    }
  }

  fn visit_statement(&mut self, stmt: &Statement<'ast>) {
    let is_top_level = std::mem::take(&mut self.at_top_level);
    if is_top_level {
      match stmt {
        Statement::ImportDeclaration(decl) => return self.scan_import_decl(decl),
        Statement::ExportAllDeclaration(decl) => return self.scan_export_all_decl(decl),
        Statement::ExportNamedDeclaration(decl) => return self.scan_export_named_decl(decl),
        Statement::ExportDefaultDeclaration(decl) => return self.scan_export_default_decl(decl),
        Statement::TSExportAssignment(decl) => {
          self.unsupported("`export =` assignments", decl.span.start);
          self.current_stmt_info.kind = StmtKind::Erased;
          return;
        }
        Statement::TSNamespaceExportDeclaration(_) => {
          self.current_stmt_info.kind = StmtKind::Erased;
          return;
        }
        _ => {}
      }
    }

    if let Some(decl) = stmt.as_declaration() {
      if self.is_type_only_declaration(decl) {
        if is_top_level {
          self.current_stmt_info.kind = StmtKind::Erased;
        } else {
          self.remove(stmt.span().start, stmt.span().end);
        }
        return;
      }
    }

    walk::walk_statement(self, stmt);
  }

  fn visit_binding_identifier(&mut self, ident: &ast::BindingIdentifier<'ast>) {
    let Some(symbol_ref) = ident.symbol_id.get().and_then(|symbol_id| self.root_symbol_ref(symbol_id))
    else {
      return;
    };
    let kind = if self.shorthand_spans.remove(&ident.span) {
      OccurrenceKind::ShorthandProperty
    } else {
      OccurrenceKind::Binding
    };
    // A typed binding's span runs to the end of its annotation, the occurrence is the name alone.
    let span = Span::new(ident.span.start, ident.span.start + ident.name.len() as u32);
    if kind == OccurrenceKind::ShorthandProperty {
      // `const { a } = obj` still declares `a`.
      self.add_declared_symbol(symbol_ref);
      self.current_stmt_info.occurrences.push(SymbolOccurrence { span, symbol: symbol_ref, kind });
    } else {
      self.add_occurrence(span, symbol_ref, kind);
    }
  }

  fn visit_identifier_reference(&mut self, ident: &ast::IdentifierReference<'ast>) {
    let is_callee = self.callee_spans.remove(&ident.span);
    let is_shorthand = self.shorthand_spans.remove(&ident.span);

    let Some(symbol_id) = self.resolve_reference(ident.reference_id.get()) else {
      self.scan_global_reference(ident);
      return;
    };

    let symbol_scope_id = self.symbols.get_scope_id(symbol_id);
    let enclosing_enum = self
      .enum_stack
      .iter()
      .rev()
      .find(|enum_scope| {
        enum_scope.symbol_id == Some(symbol_id) || enum_scope.scope_id == Some(symbol_scope_id)
      })
      .map(|enum_scope| (enum_scope.symbol_id == Some(symbol_id), enum_scope.inner_name.clone()));
    if let Some((is_enum_itself, inner_name)) = enclosing_enum {
      // The enum itself is the IIFE parameter in here, which keeps its original name.
      if !is_enum_itself {
        // A sibling member, read off the object being filled.
        let access = property_access_str(&inner_name, &ident.name);
        self.add_edit(SourceEdit::Replace(ident.span, access.into()));
      }
      return;
    }

    let Some(symbol_ref) = self.root_symbol_ref(symbol_id) else {
      return;
    };

    let is_write = ident
      .reference_id
      .get()
      .is_some_and(|reference_id| self.symbols.get_reference(reference_id).flags().is_write());
    if is_write {
      self.write_references.push((symbol_ref, ident.span));
    }

    let kind = if is_shorthand {
      OccurrenceKind::ShorthandProperty
    } else if is_callee {
      OccurrenceKind::Callee
    } else {
      OccurrenceKind::Reference
    };
    self.add_occurrence(ident.span, symbol_ref, kind);
  }

  fn visit_function(&mut self, func: &ast::Function<'ast>, flags: ScopeFlags) {
    self.function_depth += 1;
    self.this_scope_depth += 1;
    walk::walk_function(self, func, flags);
    self.this_scope_depth -= 1;
    self.function_depth -= 1;
  }

  fn visit_arrow_function_expression(&mut self, func: &ast::ArrowFunctionExpression<'ast>) {
    self.function_depth += 1;
    walk::walk_arrow_function_expression(self, func);
    self.function_depth -= 1;
  }

  fn visit_class_body(&mut self, body: &ast::ClassBody<'ast>) {
    self.this_scope_depth += 1;
    walk::walk_class_body(self, body);
    self.this_scope_depth -= 1;
  }

  fn visit_this_expression(&mut self, expr: &ast::ThisExpression) {
    // `this` is `undefined` at the top level of an ES module, but the bundle is a CommonJS module.
    if self.this_scope_depth == 0 && self.result.meta.contains(EcmaViewMeta::HAS_ESM_SYNTAX) {
      self.add_edit(SourceEdit::Replace(expr.span, "undefined".into()));
    }
  }

  fn visit_await_expression(&mut self, expr: &ast::AwaitExpression<'ast>) {
    if self.function_depth == 0 {
      self.result.top_level_await.get_or_insert(expr.span);
    }
    walk::walk_await_expression(self, expr);
  }

  fn visit_for_of_statement(&mut self, stmt: &ast::ForOfStatement<'ast>) {
    if stmt.r#await && self.function_depth == 0 {
      self.result.top_level_await.get_or_insert(stmt.span);
    }
    walk::walk_for_of_statement(self, stmt);
  }

  fn visit_meta_property(&mut self, meta: &ast::MetaProperty<'ast>) {
    if meta.meta.name == "import" && meta.property.name == "meta" {
      self.result.meta.insert(EcmaViewMeta::USES_IMPORT_META);
      self.result.import_meta.get_or_insert(meta.span);
      let import_meta_ref = self.result.import_meta_ref;
      self.add_occurrence(meta.span, import_meta_ref, OccurrenceKind::ImportMeta);
    }
  }

  fn visit_object_property(&mut self, prop: &ast::ObjectProperty<'ast>) {
    if prop.shorthand {
      self.shorthand_spans.insert(prop.value.span());
    }
    walk::walk_object_property(self, prop);
  }

  fn visit_binding_property(&mut self, prop: &ast::BindingProperty<'ast>) {
    if prop.shorthand {
      let ident = match &prop.value.kind {
        BindingPatternKind::BindingIdentifier(ident) => Some(ident.span),
        BindingPatternKind::AssignmentPattern(pattern) => match &pattern.left.kind {
          BindingPatternKind::BindingIdentifier(ident) => Some(ident.span),
          _ => None,
        },
        _ => None,
      };
      if let Some(span) = ident {
        self.shorthand_spans.insert(span);
      }
    }
    walk::walk_binding_property(self, prop);
  }

  fn visit_assignment_target_property_identifier(
    &mut self,
    prop: &ast::AssignmentTargetPropertyIdentifier<'ast>,
  ) {
    self.shorthand_spans.insert(prop.binding.span);
    walk::walk_assignment_target_property_identifier(self, prop);
  }

  fn visit_call_expression(&mut self, expr: &ast::CallExpression<'ast>) {
    if let Some(specifier) = self.as_static_require(expr) {
      let record_id =
        self.add_import_record(&specifier, ImportKind::Require, expr.span, ImportRecordMeta::empty());
      self.current_stmt_info.call_sites.push(CallSite { span: expr.span, record_id });
      return;
    }
    if let Expression::Identifier(ident) = &expr.callee {
      self.callee_spans.insert(ident.span);
    }
    walk::walk_call_expression(self, expr);
  }

  fn visit_tagged_template_expression(&mut self, expr: &ast::TaggedTemplateExpression<'ast>) {
    if let Expression::Identifier(ident) = &expr.tag {
      self.callee_spans.insert(ident.span);
    }
    walk::walk_tagged_template_expression(self, expr);
  }

  fn visit_import_expression(&mut self, expr: &ast::ImportExpression<'ast>) {
    if let Expression::StringLiteral(request) = &expr.source {
      let record_id = self.add_import_record(
        &request.value,
        ImportKind::DynamicImport,
        expr.span,
        ImportRecordMeta::empty(),
      );
      self.current_stmt_info.call_sites.push(CallSite { span: expr.span, record_id });
      return;
    }
    // A computed specifier is left to Node's own loader.
    walk::walk_import_expression(self, expr);
  }

  fn visit_variable_declarator(&mut self, declarator: &ast::VariableDeclarator<'ast>) {
    if declarator.definite {
      self.remove_binding_marker(&declarator.id, '!');
    }
    walk::walk_variable_declarator(self, declarator);
  }

  fn visit_ts_enum_declaration(&mut self, decl: &ast::TSEnumDeclaration<'ast>) {
    self.scan_enum(decl);
  }

  fn visit_decorator(&mut self, decorator: &ast::Decorator<'ast>) {
    self.unsupported("Decorators", decorator.span.start);
  }

  fn visit_class(&mut self, class: &ast::Class<'ast>) {
    self.strip_class(class);
    walk::walk_class(self, class);
  }

  fn visit_ts_class_implements(&mut self, _implements: &ast::TSClassImplements<'ast>) {}

  fn visit_property_definition(&mut self, prop: &ast::PropertyDefinition<'ast>) {
    if self.strip_property_definition(prop) {
      walk::walk_property_definition(self, prop);
    }
  }

  fn visit_method_definition(&mut self, method: &ast::MethodDefinition<'ast>) {
    if self.strip_method_definition(method) {
      walk::walk_method_definition(self, method);
    }
  }

  fn visit_accessor_property(&mut self, prop: &ast::AccessorProperty<'ast>) {
    self.unsupported("`accessor` fields", prop.span.start);
  }

  fn visit_ts_index_signature(&mut self, signature: &ast::TSIndexSignature<'ast>) {
    self.remove(signature.span.start, signature.span.end);
  }

  fn visit_formal_parameter(&mut self, param: &ast::FormalParameter<'ast>) {
    self.strip_formal_parameter(param);
    walk::walk_formal_parameter(self, param);
  }

  fn visit_ts_this_parameter(&mut self, param: &ast::TSThisParameter<'ast>) {
    self.remove_this_parameter(param.span);
  }

  fn visit_ts_type_annotation(&mut self, annotation: &ast::TSTypeAnnotation<'ast>) {
    self.remove_type_annotation(annotation.span);
  }

  fn visit_ts_type_parameter_declaration(&mut self, params: &ast::TSTypeParameterDeclaration<'ast>) {
    self.remove(params.span.start, params.span.end);
  }

  fn visit_ts_type_parameter_instantiation(
    &mut self,
    params: &ast::TSTypeParameterInstantiation<'ast>,
  ) {
    self.remove(params.span.start, params.span.end);
  }

  fn visit_ts_as_expression(&mut self, expr: &ast::TSAsExpression<'ast>) {
    self.remove(expr.expression.span().end, expr.span.end);
    self.visit_expression(&expr.expression);
  }

  fn visit_ts_satisfies_expression(&mut self, expr: &ast::TSSatisfiesExpression<'ast>) {
    self.remove(expr.expression.span().end, expr.span.end);
    self.visit_expression(&expr.expression);
  }

  fn visit_ts_non_null_expression(&mut self, expr: &ast::TSNonNullExpression<'ast>) {
    self.remove(expr.expression.span().end, expr.span.end);
    self.visit_expression(&expr.expression);
  }

  fn visit_ts_type_assertion(&mut self, expr: &ast::TSTypeAssertion<'ast>) {
    self.remove(expr.span.start, expr.expression.span().start);
    self.visit_expression(&expr.expression);
  }
}

impl<'me> AstScanner<'me> {
  fn scan_global_reference(&mut self, ident: &ast::IdentifierReference) {
    match ident.name.as_str() {
      "module" | "exports" => self.result.meta.insert(EcmaViewMeta::USES_COMMONJS_EXPORTS),
      "require" => self.result.meta.insert(EcmaViewMeta::USES_FREE_REQUIRE),
      _ => {}
    }
    self.result.global_names.insert(ArcStr::from(ident.name.as_str()));
  }

  /// `require('x')` with a string literal and an unshadowed `require`.
  fn as_static_require(&self, expr: &ast::CallExpression) -> Option<String> {
    let Expression::Identifier(callee) = &expr.callee else {
      return None;
    };
    if callee.name != "require"
      || expr.arguments.len() != 1
      || self.resolve_reference(callee.reference_id.get()).is_some()
    {
      return None;
    }
    match expr.arguments[0].as_expression()? {
      Expression::StringLiteral(request) => Some(request.value.to_string()),
      Expression::TemplateLiteral(template) if template.expressions.is_empty() => {
        template.quasis.first().and_then(|quasi| quasi.value.cooked.as_ref()).map(ToString::to_string)
      }
      _ => None,
    }
  }

  pub(super) fn is_type_only_declaration(&mut self, decl: &Declaration) -> bool {
    match decl {
      Declaration::TSTypeAliasDeclaration(_) | Declaration::TSInterfaceDeclaration(_) => true,
      Declaration::VariableDeclaration(decl) => decl.declare,
      Declaration::FunctionDeclaration(func) => func.declare || func.body.is_none(),
      Declaration::ClassDeclaration(class) => class.declare,
      Declaration::TSEnumDeclaration(decl) => decl.declare,
      Declaration::TSModuleDeclaration(decl) => {
        if !decl.declare {
          self.unsupported("Namespaces", decl.span.start);
        }
        true
      }
      Declaration::TSImportEqualsDeclaration(decl) => {
        if !decl.import_kind.is_type() {
          self.unsupported("`import x = require()` declarations", decl.span.start);
        }
        true
      }
    }
  }

  fn scan_import_decl(&mut self, decl: &ast::ImportDeclaration) {
    self.current_stmt_info.side_effect = false;
    if decl.import_kind.is_type() {
      self.current_stmt_info.kind = StmtKind::Erased;
      return;
    }

    let specifiers = match &decl.specifiers {
      Some(specifiers) => specifiers.as_slice(),
      None => &[],
    };
    let value_specifiers = specifiers
      .iter()
      .filter(|spec| match spec {
        ast::ImportDeclarationSpecifier::ImportSpecifier(spec) => !spec.import_kind.is_type(),
        _ => true,
      })
      .collect::<Vec<_>>();
    if value_specifiers.is_empty() && !specifiers.is_empty() {
      // `import { type A } from './a'` loads nothing.
      self.current_stmt_info.kind = StmtKind::Erased;
      return;
    }

    let mut meta = ImportRecordMeta::empty();
    if value_specifiers.is_empty() {
      meta.insert(ImportRecordMeta::IS_PLAIN_IMPORT);
    }
    let record_id = self.add_import_record(&decl.source.value, ImportKind::Import, decl.source.span, meta);
    self.current_stmt_info.kind = StmtKind::Import(record_id);

    for spec in value_specifiers {
      let (local, imported) = match spec {
        ast::ImportDeclarationSpecifier::ImportSpecifier(spec) => {
          (&spec.local, Specifier::Literal(spec.imported.name().as_str().into()))
        }
        ast::ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => {
          (&spec.local, Specifier::Literal("default".into()))
        }
        ast::ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => (&spec.local, Specifier::Star),
      };
      let Some(local_ref) = local.symbol_id.get().and_then(|symbol_id| self.root_symbol_ref(symbol_id))
      else {
        continue;
      };
      let record = &mut self.result.import_records[record_id];
      match &imported {
        Specifier::Star => record.meta.insert(ImportRecordMeta::CONTAINS_IMPORT_STAR),
        specifier if specifier.is_default() => record.meta.insert(ImportRecordMeta::CONTAINS_IMPORT_DEFAULT),
        Specifier::Literal(_) => {}
      }
      self.add_named_import(local_ref, imported, record_id, spec.span(), false);
    }
  }

  fn scan_export_all_decl(&mut self, decl: &ast::ExportAllDeclaration) {
    self.current_stmt_info.side_effect = false;
    if decl.export_kind.is_type() {
      self.current_stmt_info.kind = StmtKind::Erased;
      return;
    }

    let Some(exported) = &decl.exported else {
      let record_id = self.add_import_record(
        &decl.source.value,
        ImportKind::Import,
        decl.source.span,
        ImportRecordMeta::IS_EXPORT_STAR,
      );
      self.result.meta.insert(EcmaViewMeta::HAS_STAR_EXPORT);
      self.current_stmt_info.kind = StmtKind::ReExport(record_id);
      return;
    };

    // `export * as ns from './a'`
    let record_id = self.add_import_record(
      &decl.source.value,
      ImportKind::Import,
      decl.source.span,
      ImportRecordMeta::IS_RE_EXPORT | ImportRecordMeta::CONTAINS_IMPORT_STAR,
    );
    self.current_stmt_info.kind = StmtKind::ReExport(record_id);
    let exported_name = ArcStr::from(exported.name().as_str());
    let facade = self
      .result
      .symbols
      .create_facade_root_symbol_ref(legitimize_identifier_name(&exported_name).into());
    self.add_named_import(facade, Specifier::Star, record_id, decl.span, true);
    self.add_declared_symbol(facade);
    self
      .result
      .named_exports
      .insert(exported_name, LocalExport { span: decl.span, referenced: facade });
  }

  fn scan_export_named_decl(&mut self, decl: &ast::ExportNamedDeclaration) {
    if decl.export_kind.is_type() {
      self.current_stmt_info.kind = StmtKind::Erased;
      return;
    }

    if let Some(source) = &decl.source {
      self.current_stmt_info.side_effect = false;
      let specifiers =
        decl.specifiers.iter().filter(|spec| !spec.export_kind.is_type()).collect::<Vec<_>>();
      if specifiers.is_empty() && !decl.specifiers.is_empty() {
        self.current_stmt_info.kind = StmtKind::Erased;
        return;
      }
      let mut meta = ImportRecordMeta::IS_RE_EXPORT;
      if specifiers.is_empty() {
        meta.insert(ImportRecordMeta::IS_PLAIN_IMPORT);
      }
      let record_id = self.add_import_record(&source.value, ImportKind::Import, source.span, meta);
      self.current_stmt_info.kind = StmtKind::ReExport(record_id);

      for spec in specifiers {
        let imported = ArcStr::from(spec.local.name().as_str());
        let exported = ArcStr::from(spec.exported.name().as_str());
        if imported == "default" {
          self.result.import_records[record_id].meta.insert(ImportRecordMeta::CONTAINS_IMPORT_DEFAULT);
        }
        let facade = self
          .result
          .symbols
          .create_facade_root_symbol_ref(legitimize_identifier_name(&exported).into());
        self.add_named_import(facade, Specifier::Literal(imported), record_id, spec.span, true);
        self.add_declared_symbol(facade);
        self
          .result
          .named_exports
          .insert(exported, LocalExport { span: spec.span, referenced: facade });
      }
      return;
    }

    if let Some(declaration) = &decl.declaration {
      if self.is_type_only_declaration(declaration) {
        self.current_stmt_info.kind = StmtKind::Erased;
        return;
      }
      self.current_stmt_info.kind = StmtKind::ExportDecl { decl_start: declaration.span().start };
      let declared_before = self.current_stmt_info.declared_symbols.len();
      self.visit_declaration(declaration);
      let declared = self.current_stmt_info.declared_symbols[declared_before..].to_vec();
      for symbol_ref in declared {
        let name = ArcStr::from(self.result.symbols.symbol_name(symbol_ref.symbol));
        self
          .result
          .named_exports
          .insert(name, LocalExport { span: decl.span, referenced: symbol_ref });
      }
      return;
    }

    // `export { a, b as c }` produces no code, the names are collected once every declaration is
    // known.
    self.current_stmt_info.kind = StmtKind::Erased;
    for spec in decl.specifiers.iter().filter(|spec| !spec.export_kind.is_type()) {
      let ast::ModuleExportName::IdentifierReference(local) = &spec.local else {
        continue;
      };
      let Some(symbol_ref) = self
        .resolve_reference(local.reference_id.get())
        .and_then(|symbol_id| self.root_symbol_ref(symbol_id))
      else {
        continue;
      };
      *self.value_reference_counts.entry(symbol_ref).or_default() += 1;
      self.pending_local_exports.push((spec.exported.name().as_str().into(), spec.span, symbol_ref));
    }
  }

  fn scan_export_default_decl(&mut self, decl: &ast::ExportDefaultDeclaration) {
    let default_export_ref = self.result.default_export_ref;
    let exported = match &decl.declaration {
      ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
        if func.body.is_none() {
          self.current_stmt_info.kind = StmtKind::Erased;
          return;
        }
        let name_insert_at = func.id.is_none().then(|| self.anonymous_name_insert_at(func.span, "function"));
        self.current_stmt_info.kind =
          StmtKind::ExportDefaultDecl { decl_start: func.span.start, name_insert_at };
        self.visit_function(func, ScopeFlags::Function);
        func.id.as_ref().and_then(|id| id.symbol_id.get()).and_then(|symbol_id| self.root_symbol_ref(symbol_id))
      }
      ExportDefaultDeclarationKind::ClassDeclaration(class) => {
        let name_insert_at = class.id.is_none().then(|| self.anonymous_name_insert_at(class.span, "class"));
        self.current_stmt_info.kind =
          StmtKind::ExportDefaultDecl { decl_start: class.span.start, name_insert_at };
        self.visit_class(class);
        class.id.as_ref().and_then(|id| id.symbol_id.get()).and_then(|symbol_id| self.root_symbol_ref(symbol_id))
      }
      ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => {
        self.current_stmt_info.kind = StmtKind::Erased;
        return;
      }
      kind => {
        let Some(expr) = kind.as_expression() else {
          return;
        };
        self.current_stmt_info.kind = StmtKind::ExportDefaultExpr { expr_start: expr.span().start };
        self.visit_expression(expr);
        None
      }
    };

    let referenced = exported.unwrap_or(default_export_ref);
    if referenced == default_export_ref {
      self.add_declared_symbol(default_export_ref);
    }
    self
      .result
      .named_exports
      .insert("default".into(), LocalExport { span: decl.span, referenced });
  }

  /// Right after `function`, `function*` or `class`, where `export default function () {}` gets
  /// its generated name.
  fn anonymous_name_insert_at(&self, span: Span, keyword: &str) -> u32 {
    let text = &self.source[span.start as usize..span.end as usize];
    let Some(keyword_at) = text.find(keyword) else {
      return span.start;
    };
    let mut end = keyword_at + keyword.len();
    let rest = &text[end..];
    let trimmed = rest.trim_start();
    if keyword == "function" && trimmed.starts_with('*') {
      end += rest.len() - trimmed.len() + 1;
    }
    span.start + end as u32
  }
}
