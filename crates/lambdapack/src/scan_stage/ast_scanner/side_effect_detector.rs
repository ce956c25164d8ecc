use oxc::ast::ast::{
  self, ArrayExpressionElement, BinaryOperator, BindingPatternKind, ClassElement, Declaration,
  Expression, ObjectPropertyKind, PropertyKey, Statement, UnaryOperator, VariableDeclarationKind,
};
use oxc::semantic::{SymbolId, SymbolTable};
use rustc_hash::FxHashSet;

/// Reading these never throws and never runs user code.
const KNOWN_GLOBALS: &[&str] = &[
  "undefined",
  "NaN",
  "Infinity",
  "Object",
  "Array",
  "String",
  "Number",
  "Boolean",
  "Symbol",
  "BigInt",
  "Math",
  "JSON",
  "Date",
  "RegExp",
  "Error",
  "TypeError",
  "RangeError",
  "Map",
  "Set",
  "WeakMap",
  "WeakSet",
  "Promise",
  "Reflect",
  "Proxy",
  "Intl",
  "URL",
  "URLSearchParams",
  "Buffer",
  "globalThis",
];

/// Conservative side effect analysis for a top level statement. Anything it can't prove pure is
/// treated as having side effects.
pub struct SideEffectDetector<'a> {
  symbols: &'a SymbolTable,
  /// Top level `const`s declared so far whose value is a string, number, boolean, null or undefined.
  primitive_consts: &'a FxHashSet<SymbolId>,
}

impl<'a> SideEffectDetector<'a> {
  pub fn new(symbols: &'a SymbolTable, primitive_consts: &'a FxHashSet<SymbolId>) -> Self {
    Self { symbols, primitive_consts }
  }

  /// The `const` bindings of `stmt` initialized with a primitive value.
  pub fn primitive_const_symbols(&self, stmt: &Statement) -> Vec<SymbolId> {
    let decl = match stmt {
      Statement::VariableDeclaration(decl) => decl,
      Statement::ExportNamedDeclaration(export) => match &export.declaration {
        Some(Declaration::VariableDeclaration(decl)) => decl,
        _ => return vec![],
      },
      _ => return vec![],
    };
    if decl.kind != VariableDeclarationKind::Const || decl.declare {
      return vec![];
    }
    decl
      .declarations
      .iter()
      .filter_map(|declarator| match (&declarator.id.kind, &declarator.init) {
        (BindingPatternKind::BindingIdentifier(ident), Some(init)) if self.is_primitive_value(init) => {
          ident.symbol_id.get()
        }
        _ => None,
      })
      .collect()
  }

  pub fn detect_side_effect_of_stmt(&self, stmt: &Statement) -> bool {
    match stmt {
      Statement::EmptyStatement(_)
      | Statement::FunctionDeclaration(_)
      | Statement::TSTypeAliasDeclaration(_)
      | Statement::TSInterfaceDeclaration(_)
      // Module loading is tracked per import record, the statement itself binds nothing new.
      | Statement::ImportDeclaration(_)
      | Statement::ExportAllDeclaration(_)
      | Statement::TSNamespaceExportDeclaration(_) => false,
      Statement::ClassDeclaration(class) => self.detect_side_effect_of_class(class),
      Statement::VariableDeclaration(decl) => self.detect_side_effect_of_var_decl(decl),
      Statement::TSEnumDeclaration(decl) => self.detect_side_effect_of_enum(decl),
      Statement::TSModuleDeclaration(decl) => !decl.declare,
      Statement::ExpressionStatement(stmt) => self.detect_side_effect_of_expr(&stmt.expression),
      Statement::ExportNamedDeclaration(decl) => {
        decl.declaration.as_ref().is_some_and(|decl| self.detect_side_effect_of_decl(decl))
      }
      Statement::ExportDefaultDeclaration(decl) => match &decl.declaration {
        ast::ExportDefaultDeclarationKind::FunctionDeclaration(_)
        | ast::ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => false,
        ast::ExportDefaultDeclarationKind::ClassDeclaration(class) => {
          self.detect_side_effect_of_class(class)
        }
        kind => kind.as_expression().map_or(true, |expr| self.detect_side_effect_of_expr(expr)),
      },
      _ => true,
    }
  }

  fn detect_side_effect_of_decl(&self, decl: &Declaration) -> bool {
    match decl {
      Declaration::VariableDeclaration(decl) => self.detect_side_effect_of_var_decl(decl),
      Declaration::FunctionDeclaration(_)
      | Declaration::TSTypeAliasDeclaration(_)
      | Declaration::TSInterfaceDeclaration(_) => false,
      Declaration::ClassDeclaration(class) => self.detect_side_effect_of_class(class),
      Declaration::TSEnumDeclaration(decl) => self.detect_side_effect_of_enum(decl),
      Declaration::TSModuleDeclaration(decl) => !decl.declare,
      Declaration::TSImportEqualsDeclaration(_) => true,
    }
  }

  fn detect_side_effect_of_var_decl(&self, decl: &ast::VariableDeclaration) -> bool {
    if decl.declare {
      return false;
    }
    if matches!(decl.kind, VariableDeclarationKind::Using | VariableDeclarationKind::AwaitUsing) {
      return true;
    }
    decl.declarations.iter().any(|declarator| {
      // Destructuring may run getters or throw.
      !matches!(declarator.id.kind, BindingPatternKind::BindingIdentifier(_))
        || declarator.init.as_ref().is_some_and(|init| self.detect_side_effect_of_expr(init))
    })
  }

  fn detect_side_effect_of_enum(&self, decl: &ast::TSEnumDeclaration) -> bool {
    !decl.declare
      && decl
        .members
        .iter()
        .filter_map(|member| member.initializer.as_ref())
        .any(|init| self.detect_side_effect_of_expr(init))
  }

  fn detect_side_effect_of_class(&self, class: &ast::Class) -> bool {
    if class.declare {
      return false;
    }
    if !class.decorators.is_empty() {
      return true;
    }
    if class.super_class.as_ref().is_some_and(|super_class| self.detect_side_effect_of_expr(super_class)) {
      return true;
    }
    class.body.body.iter().any(|element| match element {
      ClassElement::StaticBlock(block) => !block.body.is_empty(),
      ClassElement::MethodDefinition(method) => {
        !method.decorators.is_empty() || self.detect_side_effect_of_computed_key(&method.key, method.computed)
      }
      ClassElement::PropertyDefinition(prop) => {
        !prop.decorators.is_empty()
          || self.detect_side_effect_of_computed_key(&prop.key, prop.computed)
          || (prop.r#static && prop.value.as_ref().is_some_and(|value| self.detect_side_effect_of_expr(value)))
      }
      ClassElement::AccessorProperty(_) => true,
      ClassElement::TSIndexSignature(_) => false,
    })
  }

  fn detect_side_effect_of_computed_key(&self, key: &PropertyKey, computed: bool) -> bool {
    computed && key.as_expression().map_or(true, |expr| !is_primitive_literal(expr))
  }

  pub fn detect_side_effect_of_expr(&self, expr: &Expression) -> bool {
    match expr {
      Expression::BooleanLiteral(_)
      | Expression::NullLiteral(_)
      | Expression::NumericLiteral(_)
      | Expression::BigIntLiteral(_)
      | Expression::RegExpLiteral(_)
      | Expression::StringLiteral(_)
      | Expression::FunctionExpression(_)
      | Expression::ArrowFunctionExpression(_)
      | Expression::MetaProperty(_)
      | Expression::ThisExpression(_) => false,
      Expression::TemplateLiteral(template) => {
        // Interpolating a non-primitive calls `toString`.
        !template.expressions.iter().all(|expr| self.is_primitive_value(expr))
      }
      Expression::Identifier(ident) => self.is_unresolved_unknown_global(ident),
      Expression::ClassExpression(class) => self.detect_side_effect_of_class(class),
      Expression::ParenthesizedExpression(expr) => self.detect_side_effect_of_expr(&expr.expression),
      Expression::TSAsExpression(expr) => self.detect_side_effect_of_expr(&expr.expression),
      Expression::TSSatisfiesExpression(expr) => self.detect_side_effect_of_expr(&expr.expression),
      Expression::TSNonNullExpression(expr) => self.detect_side_effect_of_expr(&expr.expression),
      Expression::TSTypeAssertion(expr) => self.detect_side_effect_of_expr(&expr.expression),
      Expression::SequenceExpression(seq) => {
        seq.expressions.iter().any(|expr| self.detect_side_effect_of_expr(expr))
      }
      Expression::ConditionalExpression(cond) => {
        self.detect_side_effect_of_expr(&cond.test)
          || self.detect_side_effect_of_expr(&cond.consequent)
          || self.detect_side_effect_of_expr(&cond.alternate)
      }
      Expression::LogicalExpression(logical) => {
        self.detect_side_effect_of_expr(&logical.left) || self.detect_side_effect_of_expr(&logical.right)
      }
      Expression::BinaryExpression(binary) => {
        if matches!(binary.operator, BinaryOperator::StrictEquality | BinaryOperator::StrictInequality) {
          self.detect_side_effect_of_expr(&binary.left) || self.detect_side_effect_of_expr(&binary.right)
        } else {
          // Other operators may call `valueOf` or `toString` on objects.
          !self.is_primitive_value(expr)
        }
      }
      Expression::UnaryExpression(unary) => match unary.operator {
        UnaryOperator::Typeof if matches!(unary.argument, Expression::Identifier(_)) => false,
        UnaryOperator::LogicalNot | UnaryOperator::Void | UnaryOperator::Typeof => {
          self.detect_side_effect_of_expr(&unary.argument)
        }
        UnaryOperator::UnaryNegation | UnaryOperator::UnaryPlus | UnaryOperator::BitwiseNot => {
          !self.is_primitive_value(&unary.argument)
        }
        _ => true,
      },
      Expression::ArrayExpression(array) => array.elements.iter().any(|element| match element {
        ArrayExpressionElement::SpreadElement(_) => true,
        ArrayExpressionElement::Elision(_) => false,
        element => element.as_expression().map_or(true, |expr| self.detect_side_effect_of_expr(expr)),
      }),
      Expression::ObjectExpression(object) => object.properties.iter().any(|prop| match prop {
        ObjectPropertyKind::SpreadProperty(_) => true,
        ObjectPropertyKind::ObjectProperty(prop) => {
          self.detect_side_effect_of_computed_key(&prop.key, prop.computed)
            || self.detect_side_effect_of_expr(&prop.value)
        }
      }),
      _ => true,
    }
  }

  /// Whether evaluating `expr` yields a string, number, boolean, null or undefined without running
  /// user code. BigInt is left out, mixing it with numbers throws.
  fn is_primitive_value(&self, expr: &Expression) -> bool {
    match expr {
      Expression::BooleanLiteral(_)
      | Expression::NullLiteral(_)
      | Expression::NumericLiteral(_)
      | Expression::StringLiteral(_) => true,
      Expression::TemplateLiteral(template) => {
        template.expressions.iter().all(|expr| self.is_primitive_value(expr))
      }
      Expression::Identifier(ident) => match self.resolved_symbol(ident) {
        Some(symbol_id) => self.primitive_consts.contains(&symbol_id),
        None => matches!(ident.name.as_str(), "undefined" | "NaN" | "Infinity"),
      },
      Expression::ParenthesizedExpression(expr) => self.is_primitive_value(&expr.expression),
      Expression::UnaryExpression(unary) => match unary.operator {
        UnaryOperator::Delete => false,
        UnaryOperator::Typeof if matches!(unary.argument, Expression::Identifier(_)) => true,
        _ => self.is_primitive_value(&unary.argument),
      },
      Expression::BinaryExpression(binary) => {
        // `in` and `instanceof` throw on primitive operands.
        !matches!(binary.operator, BinaryOperator::In | BinaryOperator::Instanceof)
          && self.is_primitive_value(&binary.left)
          && self.is_primitive_value(&binary.right)
      }
      Expression::LogicalExpression(logical) => {
        self.is_primitive_value(&logical.left) && self.is_primitive_value(&logical.right)
      }
      Expression::ConditionalExpression(cond) => {
        self.is_primitive_value(&cond.test)
          && self.is_primitive_value(&cond.consequent)
          && self.is_primitive_value(&cond.alternate)
      }
      _ => false,
    }
  }

  fn resolved_symbol(&self, ident: &ast::IdentifierReference) -> Option<SymbolId> {
    ident.reference_id.get().and_then(|reference_id| self.symbols.get_reference(reference_id).symbol_id())
  }

  fn is_unresolved_unknown_global(&self, ident: &ast::IdentifierReference) -> bool {
    let is_resolved = self.resolved_symbol(ident).is_some();
    // Reading an undeclared global throws a `ReferenceError`.
    !is_resolved && !KNOWN_GLOBALS.contains(&ident.name.as_str())
  }
}

fn is_primitive_literal(expr: &Expression) -> bool {
  matches!(
    expr,
    Expression::BooleanLiteral(_)
      | Expression::NullLiteral(_)
      | Expression::NumericLiteral(_)
      | Expression::BigIntLiteral(_)
      | Expression::StringLiteral(_)
  )
}
