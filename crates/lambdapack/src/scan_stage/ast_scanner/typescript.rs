//! TypeScript is compiled by deleting types from the original text rather than by printing a new
//! AST, so every mapping of the rendered code still points at the `.ts` source.

use arcstr::ArcStr;
use lambdapack_common::{EnumEdit, EnumMemberEdit, EnumMemberValue, SourceEdit};
use lambdapack_error::DiagnosticKind;
use oxc::{
  ast::{
    ast::{
      self, BinaryOperator, BindingPatternKind, Expression, MethodDefinitionKind, MethodDefinitionType,
      PropertyDefinitionType, PropertyKey, Statement, UnaryOperator,
    },
    Visit,
  },
  span::{GetSpan, Span},
};
use rustc_hash::FxHashMap;

use super::{AstScanner, EnumScope};

/// Modifiers that only exist in TypeScript. `static`, `async`, `get` and `set` stay.
const TS_ONLY_MODIFIERS: [&str; 7] =
  ["public", "private", "protected", "readonly", "override", "declare", "abstract"];

impl<'me> AstScanner<'me> {
  pub(super) fn remove_type_annotation(&mut self, span: Span) {
    let mut start = span.start;
    if !self.source[start as usize..].starts_with(':') {
      let before = self.source[..start as usize].trim_end();
      if before.ends_with(':') {
        start = (before.len() - 1) as u32;
      }
    }
    self.remove(start, span.end);
  }

  /// Removes `marker` if it is the next non-whitespace character after `pos`.
  pub(super) fn remove_marker_after(&mut self, pos: u32, marker: char) {
    let rest = &self.source[pos as usize..];
    let trimmed = rest.trim_start();
    if trimmed.starts_with(marker) {
      let at = pos + (rest.len() - trimmed.len()) as u32;
      self.remove(at, at + 1);
    }
  }

  /// Removes the `?` or `!` that follows a binding name, as in `context?: Context` or `let x!: T`.
  /// The pattern's span may already cover the marker and the type annotation, so the marker is
  /// looked up backwards from where the annotation starts.
  pub(super) fn remove_binding_marker(&mut self, pattern: &ast::BindingPattern, marker: char) {
    let start = pattern.kind.span().start;
    let limit = pattern.type_annotation.as_ref().map_or(pattern.kind.span().end, |ann| ann.span.start);
    let head = self.source[start as usize..limit as usize].trim_end();
    let head = head.strip_suffix(':').unwrap_or(head).trim_end();
    if head.ends_with(marker) {
      let at = start + head.len() as u32 - 1;
      self.remove(at, at + 1);
    } else {
      self.remove_marker_after(limit, marker);
    }
  }

  /// `function f(this: Window, a) {}`, the comma goes with it.
  pub(super) fn remove_this_parameter(&mut self, span: Span) {
    let rest = &self.source[span.end as usize..];
    let trimmed = rest.trim_start();
    let end = match trimmed.strip_prefix(',') {
      Some(after_comma) => {
        let after_whitespace = after_comma.trim_start();
        span.end + (rest.len() - after_whitespace.len()) as u32
      }
      None => span.end,
    };
    self.remove(span.start, end);
  }

  /// Deletes TypeScript-only modifier keywords found in `[start, end)`.
  fn remove_modifiers(&mut self, start: u32, end: u32) {
    let source = self.source;
    let region = &source[start as usize..end as usize];
    let mut words = Vec::new();
    let mut word_start = None;
    for (idx, ch) in region.char_indices().chain(std::iter::once((region.len(), ' '))) {
      let is_word_char = ch.is_ascii_alphanumeric() || ch == '_' || ch == '$';
      match (word_start, is_word_char) {
        (None, true) => word_start = Some(idx),
        (Some(from), false) => {
          words.push((from, idx));
          word_start = None;
        }
        _ => {}
      }
    }

    for (from, to) in words {
      if TS_ONLY_MODIFIERS.contains(&&region[from..to]) {
        let trailing_whitespace = region[to..].len() - region[to..].trim_start().len();
        self.remove(start + from as u32, start + (to + trailing_whitespace) as u32);
      }
    }
  }

  fn property_key_end(&self, key: &PropertyKey, computed: bool) -> u32 {
    let end = key.span().end;
    if !computed {
      return end;
    }
    self.source[end as usize..].find(']').map_or(end, |offset| end + offset as u32 + 1)
  }

  pub(super) fn strip_class(&mut self, class: &ast::Class) {
    if let Some(implements) = &class.implements {
      if let (Some(first), Some(last)) = (implements.first(), implements.last()) {
        let before = &self.source[..first.span.start as usize];
        let keyword_start = before
          .rfind("implements")
          .map_or(first.span.start, |idx| before[..idx].trim_end().len() as u32);
        self.remove(keyword_start, last.span.end);
      }
    }

    if class.r#abstract {
      let head = &self.source[class.span.start as usize..class.body.span.start as usize];
      if let Some(rest) = head.strip_prefix("abstract") {
        let whitespace = rest.len() - rest.trim_start().len();
        self.remove(class.span.start, class.span.start + ("abstract".len() + whitespace) as u32);
      } else {
        let before = self.source[..class.span.start as usize].trim_end();
        if let Some(stripped) = before.strip_suffix("abstract") {
          self.remove(stripped.len() as u32, class.span.start);
        }
      }
    }
  }

  /// Returns `false` when the whole member was removed.
  pub(super) fn strip_property_definition(&mut self, prop: &ast::PropertyDefinition) -> bool {
    if prop.r#type == PropertyDefinitionType::TSAbstractPropertyDefinition || prop.declare {
      self.remove(prop.span.start, prop.span.end);
      return false;
    }
    self.remove_modifiers(prop.span.start, prop.key.span().start);
    let key_end = self.property_key_end(&prop.key, prop.computed);
    if prop.optional {
      self.remove_marker_after(key_end, '?');
    } else if prop.definite {
      self.remove_marker_after(key_end, '!');
    }
    true
  }

  /// Returns `false` when the whole member was removed.
  pub(super) fn strip_method_definition(&mut self, method: &ast::MethodDefinition) -> bool {
    if method.r#type == MethodDefinitionType::TSAbstractMethodDefinition || method.value.body.is_none() {
      self.remove(method.span.start, method.span.end);
      return false;
    }
    self.remove_modifiers(method.span.start, method.key.span().start);
    if method.optional {
      let key_end = self.property_key_end(&method.key, method.computed);
      self.remove_marker_after(key_end, '?');
    }
    if method.kind == MethodDefinitionKind::Constructor {
      self.insert_parameter_properties(&method.value);
    }
    true
  }

  /// `constructor(private readonly repo: Repo) {}` assigns `this.repo = repo` in the body, right
  /// after the `super()` call when there is one.
  fn insert_parameter_properties(&mut self, func: &ast::Function) {
    let Some(body) = &func.body else {
      return;
    };
    let names = func
      .params
      .items
      .iter()
      .filter(|param| param.accessibility.is_some() || param.readonly || param.r#override)
      .filter_map(|param| match &param.pattern.kind {
        BindingPatternKind::BindingIdentifier(ident) => Some(ident.name.as_str()),
        BindingPatternKind::AssignmentPattern(pattern) => match &pattern.left.kind {
          BindingPatternKind::BindingIdentifier(ident) => Some(ident.name.as_str()),
          _ => None,
        },
        _ => None,
      })
      .collect::<Vec<_>>();
    if names.is_empty() {
      return;
    }

    let insert_at = body
      .statements
      .iter()
      .find_map(|stmt| match stmt {
        Statement::ExpressionStatement(stmt) => match &stmt.expression {
          Expression::CallExpression(call) if matches!(call.callee, Expression::Super(_)) => {
            Some(stmt.span.end)
          }
          _ => None,
        },
        _ => None,
      })
      .unwrap_or(body.span.start + 1);
    let assignments = names.iter().map(|name| format!(" this.{name} = {name};")).collect::<String>();
    self.add_edit(SourceEdit::Insert(insert_at, assignments.into()));
  }

  pub(super) fn strip_formal_parameter(&mut self, param: &ast::FormalParameter) {
    if param.accessibility.is_some() || param.readonly || param.r#override {
      self.remove_modifiers(param.span.start, param.pattern.span().start);
    }
    if param.pattern.optional {
      self.remove_binding_marker(&param.pattern, '?');
    }
  }

  pub(super) fn scan_enum(&mut self, decl: &ast::TSEnumDeclaration) {
    let symbol_id = decl.id.symbol_id.get();
    let symbol = symbol_id.and_then(|symbol_id| self.root_symbol_ref(symbol_id));
    if let Some(symbol) = symbol {
      self.add_declared_symbol(symbol);
    }
    let name = ArcStr::from(decl.id.name.as_str());
    self.enum_names.insert(name.clone());
    self.enum_stack.push(EnumScope {
      scope_id: decl.scope_id.get(),
      symbol_id,
      inner_name: name.clone(),
    });

    let mut members = Vec::with_capacity(decl.members.len());
    let mut known_values = FxHashMap::<ArcStr, f64>::default();
    let mut next_value = Some(0.0);
    for member in &decl.members {
      let member_span = member.id.span();
      let Some(member_name) = self.enum_member_name(member_span) else {
        self.error(
          DiagnosticKind::UnsupportedSyntax,
          "Computed enum member names are not supported",
          member_span.start,
        );
        continue;
      };

      let value = match &member.initializer {
        None => {
          let Some(value) = next_value else {
            self.error(
              DiagnosticKind::UnsupportedSyntax,
              format!("Enum member \"{member_name}\" must have an initializer"),
              member.span.start,
            );
            continue;
          };
          known_values.insert(member_name.clone(), value);
          next_value = Some(value + 1.0);
          EnumMemberValue::Auto(value)
        }
        Some(initializer) => {
          let evaluated = evaluate_enum_value(initializer, &known_values);
          if let Some(value) = evaluated {
            known_values.insert(member_name.clone(), value);
          }
          next_value = evaluated.map(|value| value + 1.0);
          let is_string = match initializer {
            Expression::StringLiteral(_) => true,
            Expression::TemplateLiteral(template) => template.expressions.is_empty(),
            _ => false,
          };
          self.visit_expression(initializer);
          EnumMemberValue::Initializer { span: initializer.span(), is_string }
        }
      };
      members.push(EnumMemberEdit { span: member.span, name: member_name, value });
    }

    self.enum_stack.pop();
    self.add_edit(SourceEdit::Enum(Box::new(EnumEdit { span: decl.span, symbol, name, members })));
  }

  /// `A`, `'A'` or `"A"`. Computed names have no static name.
  fn enum_member_name(&self, span: Span) -> Option<ArcStr> {
    let text = span.source_text(self.source);
    match text.chars().next()? {
      '\'' | '"' if text.len() >= 2 => Some(text[1..text.len() - 1].into()),
      '[' | '`' => None,
      _ => Some(text.into()),
    }
  }
}

/// Constant folding for enum initializers, enough to keep auto-increment going after
/// `A = 1 << 2` or `B = A + 1`.
fn evaluate_enum_value(expr: &Expression, known_values: &FxHashMap<ArcStr, f64>) -> Option<f64> {
  let value = match expr {
    Expression::NumericLiteral(lit) => lit.value,
    Expression::ParenthesizedExpression(expr) => evaluate_enum_value(&expr.expression, known_values)?,
    Expression::Identifier(ident) => *known_values.get(ident.name.as_str())?,
    Expression::UnaryExpression(unary) => {
      let argument = evaluate_enum_value(&unary.argument, known_values)?;
      match unary.operator {
        UnaryOperator::UnaryNegation => -argument,
        UnaryOperator::UnaryPlus => argument,
        UnaryOperator::BitwiseNot => f64::from(!to_int32(argument)),
        _ => return None,
      }
    }
    Expression::BinaryExpression(binary) => {
      let left = evaluate_enum_value(&binary.left, known_values)?;
      let right = evaluate_enum_value(&binary.right, known_values)?;
      match binary.operator {
        BinaryOperator::Addition => left + right,
        BinaryOperator::Subtraction => left - right,
        BinaryOperator::Multiplication => left * right,
        BinaryOperator::Division => left / right,
        BinaryOperator::Remainder => left % right,
        BinaryOperator::Exponential => left.powf(right),
        BinaryOperator::ShiftLeft => f64::from(to_int32(left).wrapping_shl(to_uint32(right) & 31)),
        BinaryOperator::ShiftRight => f64::from(to_int32(left).wrapping_shr(to_uint32(right) & 31)),
        BinaryOperator::ShiftRightZeroFill => {
          f64::from(to_uint32(left).wrapping_shr(to_uint32(right) & 31))
        }
        BinaryOperator::BitwiseOR => f64::from(to_int32(left) | to_int32(right)),
        BinaryOperator::BitwiseAnd => f64::from(to_int32(left) & to_int32(right)),
        BinaryOperator::BitwiseXOR => f64::from(to_int32(left) ^ to_int32(right)),
        _ => return None,
      }
    }
    _ => return None,
  };
  Some(value)
}

#[allow(clippy::cast_possible_truncation)]
fn to_int32(value: f64) -> i32 {
  value as i64 as i32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_uint32(value: f64) -> u32 {
  value as i64 as u32
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn folds_shifts_and_member_references() {
    let mut known = FxHashMap::default();
    known.insert(ArcStr::from("A"), 4.0);
    let allocator = oxc::allocator::Allocator::default();
    let source = "(A << 2) | 1";
    let expr = oxc::parser::Parser::new(&allocator, source, oxc::span::SourceType::ts())
      .parse_expression()
      .unwrap();
    assert_eq!(evaluate_enum_value(&expr, &known), Some(17.0));
  }
}
