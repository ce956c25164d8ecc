use lambdapack_common::{
  EcmaViewMeta, EnumMemberValue, ImportKind, ModuleIdx, ModuleType, SourceEdit, StmtInfoIdx,
  StmtInfos, StmtKind,
};
use oxc::{allocator::Allocator, parser::Parser, semantic::SemanticBuilder, span::SourceType};
use pretty_assertions::assert_eq;

use super::{AstScanResult, AstScanner};

fn scan(source: &str, module_type: ModuleType) -> AstScanResult {
  let source_type = if module_type.is_typescript() { SourceType::ts() } else { SourceType::mjs() };
  let allocator = Allocator::default();
  let ret = Parser::new(&allocator, source, source_type).parse();
  assert!(ret.errors.is_empty(), "{:?}", ret.errors);
  let (symbols, scopes) =
    SemanticBuilder::new().build(&ret.program).semantic.into_symbol_table_and_scope_tree();
  AstScanner::new(
    ModuleIdx::from_usize(1),
    &symbols,
    &scopes,
    "mod",
    module_type,
    "src/mod.ts",
    source,
  )
  .scan(&ret.program)
}

/// Applies the plain edits of every statement, dropping erased statements. Enum edits are
/// checked structurally instead.
fn strip(source: &str) -> String {
  let result = scan(source, ModuleType::Ts);
  assert!(result.errors.is_empty(), "{:?}", result.errors);
  render(source, &result.stmt_infos)
}

fn render(source: &str, stmt_infos: &StmtInfos) -> String {
  let mut ops: Vec<(u32, u32, String)> = vec![];
  for (_, stmt_info) in stmt_infos.iter_enumerated().skip(1) {
    if stmt_info.kind == StmtKind::Erased {
      ops.push((stmt_info.span.start, stmt_info.span.end, String::new()));
      continue;
    }
    for edit in &stmt_info.edits {
      match edit {
        SourceEdit::Remove(span) => ops.push((span.start, span.end, String::new())),
        SourceEdit::Replace(span, text) => ops.push((span.start, span.end, text.to_string())),
        SourceEdit::Insert(pos, text) => ops.push((*pos, *pos, text.to_string())),
        SourceEdit::Enum(_) => {}
      }
    }
  }
  ops.sort_by_key(|(start, _, _)| *start);

  let mut out = String::new();
  let mut cursor = 0;
  for (start, end, text) in ops {
    if (start as usize) < cursor {
      continue;
    }
    out.push_str(&source[cursor..start as usize]);
    out.push_str(&text);
    cursor = end as usize;
  }
  out.push_str(&source[cursor..]);
  out
}

fn import_names(result: &AstScanResult) -> Vec<&str> {
  result
    .named_imports
    .keys()
    .map(|symbol_ref| result.symbols.symbol_name(symbol_ref.symbol))
    .collect()
}

#[test]
fn strips_annotations_and_assertions() {
  let source = "const a: number = (b as any)!;\nfunction f<T>(x: T, y?: string): T { return x; }\nlet b = <number>c satisfies number;\n";
  assert_eq!(
    strip(source),
    "const a = (b);\nfunction f(x, y) { return x; }\nlet b = c;\n"
  );
}

#[test]
fn strips_optional_and_definite_markers() {
  let source = "let ready!: boolean;\nconst run = async (event: Event, context?: Context) => event;\nfunction g(a?, b = 1) {}\n";
  assert_eq!(
    strip(source),
    "let ready;\nconst run = async (event, context) => event;\nfunction g(a, b = 1) {}\n"
  );
}

#[test]
fn strips_class_members_and_inserts_parameter_properties() {
  let source = "abstract class Repo implements Store, Closeable {\n  private x!: number;\n  y?: string;\n  abstract z: number;\n  constructor(private readonly db: Db, name: string) {}\n  public find(id: string): void {}\n}\n";
  let result = scan(source, ModuleType::Ts);
  assert!(result.errors.is_empty(), "{:?}", result.errors);
  let stripped = render(source, &result.stmt_infos);
  assert_eq!(
    stripped,
    "class Repo {\n  x;\n  y;\n  \n  constructor(db, name) { this.db = db;}\n  find(id) {}\n}\n"
  );
}

#[test]
fn erases_type_only_declarations() {
  let source = "interface A { x: number }\ntype B = string;\ndeclare const c: number;\nexport type { A };\nexport const d = 1;\nexport { B };\n";
  let result = scan(source, ModuleType::Ts);
  let kinds = result.stmt_infos.iter().map(|stmt_info| stmt_info.kind).collect::<Vec<_>>();
  assert_eq!(
    kinds,
    vec![
      StmtKind::Namespace,
      StmtKind::Erased,
      StmtKind::Erased,
      StmtKind::Erased,
      StmtKind::Erased,
      StmtKind::ExportDecl { decl_start: 94 },
      StmtKind::Erased,
    ]
  );
  // `B` is a type alias, exporting it exports nothing.
  assert_eq!(result.named_exports.keys().map(|name| name.as_str()).collect::<Vec<_>>(), vec!["d"]);
}

#[test]
fn elides_imports_only_used_as_types() {
  let source = "import { User, loadUser } from './user';\nimport type { Config } from './config';\nimport { Logger } from './logger';\nimport './polyfill';\nexport const handler = (id: string): User => loadUser(id);\nlet logger: Logger;\n";
  let result = scan(source, ModuleType::Ts);

  let records = result
    .import_records
    .iter()
    .map(|rec| (rec.specifier.as_str(), rec.is_type_elided()))
    .collect::<Vec<_>>();
  assert_eq!(records, vec![("./user", false), ("./logger", true), ("./polyfill", false)]);
  assert_eq!(import_names(&result), vec!["loadUser"]);
  assert_eq!(result.stmt_infos[StmtInfoIdx::from_usize(3)].kind, StmtKind::Erased);
}

#[test]
fn javascript_keeps_unused_imports() {
  let result = scan("import { unused } from './a.js';\n", ModuleType::Js);
  assert!(!result.import_records.iter().any(|rec| rec.is_type_elided()));
  assert_eq!(import_names(&result), vec!["unused"]);
}

#[test]
fn records_require_and_dynamic_import_call_sites() {
  let source = "const fs = require('node:fs');\nexport async function load() { return import('./lazy.js'); }\nfunction shadowed(require) { return require('x'); }\n";
  let result = scan(source, ModuleType::Js);

  let records = result.import_records.iter().map(|rec| (rec.specifier.as_str(), rec.kind)).collect::<Vec<_>>();
  assert_eq!(records, vec![("node:fs", ImportKind::Require), ("./lazy.js", ImportKind::DynamicImport)]);
  let facades = result
    .import_records
    .iter()
    .map(|rec| result.symbols.symbol_name(rec.namespace_ref.symbol))
    .collect::<Vec<_>>();
  assert_eq!(facades, vec!["import_fs", "import_lazy"]);

  let call_sites = result.stmt_infos.iter().map(|stmt_info| stmt_info.call_sites.len()).collect::<Vec<_>>();
  assert_eq!(call_sites, vec![0, 1, 1, 0]);
}

#[test]
fn collects_every_kind_of_export() {
  let source = "export default function () {}\nexport { a as b };\nconst a = 1;\nexport * from './all';\nexport * as ns from './ns';\nexport { c } from './c';\n";
  let result = scan(source, ModuleType::Ts);

  assert_eq!(
    result.named_exports.keys().map(|name| name.as_str()).collect::<Vec<_>>(),
    vec!["default", "ns", "c", "b"]
  );
  assert!(result.meta.has_star_export());
  assert_eq!(
    result.stmt_infos[StmtInfoIdx::from_usize(1)].kind,
    StmtKind::ExportDefaultDecl { decl_start: 15, name_insert_at: Some(23) }
  );
  let re_exports = result.named_imports.values().filter(|named_import| named_import.is_re_export).count();
  assert_eq!(re_exports, 2);
}

#[test]
fn rewrites_enums() {
  let source = "enum Color { Red, Green = 4, Blue }\nenum Flags { A = 1, B = A << 1, C }\n";
  let result = scan(source, ModuleType::Ts);
  assert!(result.errors.is_empty(), "{:?}", result.errors);

  let enum_edits = result
    .stmt_infos
    .iter()
    .flat_map(|stmt_info| &stmt_info.edits)
    .filter_map(|edit| match edit {
      SourceEdit::Enum(edit) => Some(edit),
      _ => None,
    })
    .collect::<Vec<_>>();
  assert_eq!(enum_edits.len(), 2);

  let color = enum_edits[0];
  assert_eq!(color.name.as_str(), "Color");
  assert!(color.symbol.is_some());
  let values = color
    .members
    .iter()
    .map(|member| match member.value {
      EnumMemberValue::Auto(value) => (member.name.to_string(), Some(value)),
      EnumMemberValue::Initializer { .. } => (member.name.to_string(), None),
    })
    .collect::<Vec<_>>();
  assert_eq!(
    values,
    vec![("Red".to_string(), Some(0.0)), ("Green".to_string(), None), ("Blue".to_string(), Some(5.0))]
  );

  // Members referenced from a sibling initializer are read off the enum object.
  let flags_stmt = &result.stmt_infos[StmtInfoIdx::from_usize(2)];
  assert!(flags_stmt.edits.iter().any(
    |edit| matches!(edit, SourceEdit::Replace(_, text) if text.as_str() == "Flags.A")
  ));
  let c = &enum_edits[1].members[2];
  assert!(matches!(c.value, EnumMemberValue::Auto(value) if (value - 3.0).abs() < f64::EPSILON));
}

#[test]
fn rejects_unsupported_typescript() {
  let result = scan("namespace N { export const a = 1; }\n", ModuleType::Ts);
  assert_eq!(result.errors.len(), 1);
  assert!(result.errors[0].to_string().contains("Namespaces are not supported"));

  let result = scan("function sealed(c: any) {}\n@sealed\nclass A {}\n", ModuleType::Ts);
  assert!(result.errors.iter().any(|err| err.to_string().contains("Decorators are not supported")));

  let result = scan("enum E { A = `${x}`, B }\n", ModuleType::Ts);
  assert!(result.errors.iter().any(|err| err.to_string().contains("\"B\" must have an initializer")));
}

#[test]
fn rejects_assignments_to_imports() {
  let result = scan("import { count } from './counter.js';\ncount = 2;\n", ModuleType::Js);
  assert_eq!(result.errors.len(), 1);
  let message = result.errors[0].to_string();
  assert!(message.contains("Cannot assign to import \"count\""), "{message}");
  assert!(message.contains("src/mod.ts:2:1"), "{message}");
}

#[test]
fn tracks_module_level_facts() {
  let source = "#!/usr/bin/env node\n'use strict';\nexport const self = this;\nawait ready;\nfunction f() { const inner = 1; return inner + import.meta.url.length; }\n";
  let result = scan(source, ModuleType::Js);

  assert!(result.hashbang.is_some());
  assert_eq!(result.directives.len(), 1);
  assert!(result.top_level_await.is_some());
  assert!(result.import_meta.is_some());
  assert!(result.global_names.contains("ready"));
  assert!(result.symbols.nested_names.contains("inner"));
  assert_eq!(render(source, &result.stmt_infos).lines().nth(2), Some("export const self = undefined;"));
}

#[test]
fn marks_commonjs_modules() {
  let result = scan("const path = require('path');\nmodule.exports = { path };\n", ModuleType::Js);
  assert!(result.meta.contains(EcmaViewMeta::USES_COMMONJS_EXPORTS));
  assert!(!result.meta.contains(EcmaViewMeta::HAS_ESM_SYNTAX));
}

#[test]
fn arithmetic_on_primitive_consts_is_pure() {
  let source = "const base = 40;\nconst label = `v${base}`;\nexport const answer = base + 2;\nexport const greeting = 'hi ' + label;\nexport const flags = ~base | -base;\nlet counter = 1;\nexport const next = counter + 1;\nexport const sum = window.x + 1;\nexport const big = 1n + 2n;\nexport const has = 'a' in base;\n";
  let result = scan(source, ModuleType::Ts);
  let side_effects = result.stmt_infos.iter().skip(1).map(|stmt_info| stmt_info.side_effect).collect::<Vec<_>>();
  assert_eq!(side_effects, vec![false, false, false, false, false, false, true, true, true, true]);
}
